use super::*;
use crate::literal::{parse, parse_one};

fn tree() -> Vec<LayoutNode> {
    compile_layout(
        "p",
        &parse(
            r#"["Args" ("-a" "All" "--all") ("-b" "Both" "--both")]
               ["Actions" ("c" "Commit" commit) ("f" "Fixup" fixup)]"#,
        )
        .unwrap(),
    )
    .unwrap()
}

fn suffix(src: &str) -> LayoutNode {
    LayoutNode::Suffix(compile_suffix("p", &parse_one(src).unwrap()).unwrap())
}

fn keys(t: &[LayoutNode]) -> Vec<String> {
    let mut out = Vec::new();
    collect_suffixes(t, &mut out);
    out.into_iter().map(|s| s.key.clone()).collect()
}

#[test]
fn insert_then_locate_finds_new_node() {
    let mut t = tree();
    insert_before("p", &mut t, &Locator::key("f"), suffix(r#"("e" "Extend" extend)"#)).unwrap();
    assert_eq!(keys(&t), vec!["-a", "-b", "c", "e", "f"]);
    let found = get_node(&t, &Locator::key("e")).unwrap();
    assert_eq!(found.as_suffix().unwrap().command, "extend");

    insert_after("p", &mut t, &Locator::command("fixup"), suffix(r#"("w" "Reword" reword)"#))
        .unwrap();
    assert_eq!(keys(&t), vec!["-a", "-b", "c", "e", "f", "w"]);
    let found = get_node(&t, &Locator::command("reword")).unwrap();
    assert_eq!(found.as_suffix().unwrap().key, "w");
}

#[test]
fn inserting_the_same_binding_again_moves_it() {
    let mut t = tree();
    insert_after("p", &mut t, &Locator::key("f"), suffix(r#"("c" "Commit now" commit)"#)).unwrap();
    assert_eq!(keys(&t), vec!["-a", "-b", "f", "c"]);
    let found = get_node(&t, &Locator::key("c")).unwrap();
    assert_eq!(found.as_suffix().unwrap().description_text(), Some("Commit now"));
}

#[test]
fn same_key_for_another_command_keeps_both() {
    let mut t = tree();
    insert_after("p", &mut t, &Locator::key("f"), suffix(r#"("c" "Create" create)"#)).unwrap();
    assert_eq!(keys(&t), vec!["-a", "-b", "c", "f", "c"]);
    let mut specs = Vec::new();
    collect_suffixes(&t, &mut specs);
    let commands = specs.iter().map(|s| s.command.as_str()).collect::<Vec<_>>();
    assert_eq!(commands, vec!["p:--all", "p:--both", "commit", "fixup", "create"]);
}

#[test]
fn replace_and_remove() {
    let mut t = tree();
    let old = replace("p", &mut t, &Locator::key("c"), suffix(r#"("C" "Amend" amend)"#)).unwrap();
    assert_eq!(old.as_suffix().unwrap().command, "commit");
    assert_eq!(keys(&t), vec!["-a", "-b", "C", "f"]);

    let removed = remove(&mut t, &Locator::path([0, 0])).unwrap();
    assert_eq!(removed.as_suffix().unwrap().key, "-a");
    assert_eq!(keys(&t), vec!["-b", "C", "f"]);

    assert!(matches!(
        remove(&mut t, &Locator::command("nope")),
        Err(MenuError::Locator(_))
    ));
}

#[test]
fn groups_and_suffixes_never_become_siblings() {
    let mut t = tree();
    let group = LayoutNode::Group(compile_group("p", &parse_one(r#"["G" ("x" "X" x)]"#).unwrap()).unwrap());

    assert!(matches!(
        insert_before("p", &mut t, &Locator::key("c"), group.clone()),
        Err(MenuError::Definition(_))
    ));
    assert!(matches!(
        insert_before("p", &mut t, &Locator::path([0]), suffix(r#"("x" "X" x)"#)),
        Err(MenuError::Definition(_))
    ));

    // Groups are fine next to groups.
    insert_after("p", &mut t, &Locator::path([-1]), group).unwrap();
    assert_eq!(t.len(), 3);
    assert_eq!(keys(&t), vec!["-a", "-b", "c", "f", "x"]);
}

#[test]
fn set_property_updates_suffixes_and_groups() {
    let mut t = tree();
    set_property(&mut t, &Locator::key("c"), "level", &Lit::Int(6)).unwrap();
    assert_eq!(get_node(&t, &Locator::key("c")).unwrap().level(), Some(6));

    set_property(&mut t, &Locator::path([1]), "description", &Lit::str("Do it")).unwrap();
    let g = t[1].as_group().unwrap();
    assert_eq!(g.description, Some(Description::Text("Do it".into())));

    assert!(set_property(&mut t, &Locator::key("c"), "bogus", &Lit::Int(1)).is_err());
}
