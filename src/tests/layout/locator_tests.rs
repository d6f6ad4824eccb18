use super::*;
use crate::literal::parse;

fn tree() -> Vec<LayoutNode> {
    compile_layout(
        "p",
        &parse(
            r#"[["Left" ("a" "A" cmd-a) ("b" "B" cmd-b)]
                ["Right" ("C-x l" "L" cmd-l) ("a" "Dup" cmd-dup)]]
               ["Bottom" ("z" "Z" cmd-z)]"#,
        )
        .unwrap(),
    )
    .unwrap()
}

#[test]
fn command_and_key_locators_use_first_preorder_match() {
    let t = tree();
    assert_eq!(locate(&t, &Locator::command("cmd-b")), Some(vec![0, 0, 1]));
    assert_eq!(locate(&t, &Locator::key("a")), Some(vec![0, 0, 0]));
    assert_eq!(locate(&t, &Locator::key("C-x  l")), Some(vec![0, 1, 0]));
    assert_eq!(locate(&t, &Locator::command("missing")), None);
}

#[test]
fn coordinate_paths_with_negative_indices() {
    let t = tree();
    assert_eq!(locate(&t, &Locator::path([0, -1, -1])), Some(vec![0, 1, 1]));
    assert_eq!(locate(&t, &Locator::path([-1, 0])), Some(vec![1, 0]));
    assert_eq!(locate(&t, &Locator::path([0, 5])), None);
    // Indexing into a suffix is not possible.
    assert_eq!(locate(&t, &Locator::path([1, 0, 0])), None);
}

#[test]
fn coordinate_paths_with_terminators() {
    let t = tree();
    let loc = Locator::parse(r#"[0 1 "a"]"#).unwrap();
    assert_eq!(locate(&t, &loc), Some(vec![0, 1, 1]));
    let loc = Locator::parse("[0 0 cmd-b]").unwrap();
    assert_eq!(locate(&t, &loc), Some(vec![0, 0, 1]));
}

#[test]
fn parse_forms() {
    assert_eq!(Locator::parse("cmd").unwrap(), Locator::command("cmd"));
    assert_eq!(Locator::parse("\"k\"").unwrap(), Locator::key("k"));
    assert!(Locator::parse("[cmd 0]").is_err());
    assert!(Locator::parse("[]").is_err());
    assert_eq!(Locator::parse("[0 -1 x]").unwrap().to_string(), "[0 -1 x]");
}
