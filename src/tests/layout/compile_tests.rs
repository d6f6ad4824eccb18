use super::*;
use crate::literal::parse;

fn layout(src: &str) -> Vec<LayoutNode> {
    compile_layout("p", &parse(src).unwrap()).unwrap()
}

#[test]
fn flat_vector_is_a_column() {
    let tree = layout(r#"["Actions" ("a" "Alpha" cmd-a) ("b" "Beta" cmd-b)]"#);
    let g = tree[0].as_group().unwrap();
    assert_eq!(g.class, GroupClass::Column);
    assert_eq!(g.description, Some(Description::Text("Actions".into())));
    let keys = g
        .children
        .iter()
        .map(|c| c.as_suffix().unwrap().key.as_str())
        .collect::<Vec<_>>();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn nested_vectors_are_columns() {
    let tree = layout(r#"[["Left" ("a" "A" a)] ["Right" ("b" "B" b)]]"#);
    let g = tree[0].as_group().unwrap();
    assert_eq!(g.class, GroupClass::Columns);
    assert_eq!(g.children.len(), 2);
}

#[test]
fn argument_suffix_classes() {
    let tree = layout(
        r#"["Args"
            ("-a" "All" "--all")
            ("-m" "Message" "--message=")
            ("-s" "Sign" ("-S" "--gpg-sign="))
            ("-c" "Color" :argument-format "--color=%s" :choices ("always" "never"))
            ("--" "Files" "--")]"#,
    );
    let specs = tree[0].suffixes();
    assert_eq!(specs[0].class, SuffixClass::Switch);
    assert_eq!(specs[1].class, SuffixClass::Option);
    assert_eq!(specs[2].class, SuffixClass::Option);
    assert_eq!(specs[2].shortarg.as_deref(), Some("-S"));
    assert_eq!(specs[3].class, SuffixClass::Switches);
    assert_eq!(specs[4].class, SuffixClass::Files);
}

#[test]
fn anonymous_infix_commands_are_flagged() {
    let tree = layout(r#"["Args" ("-a" "All" "--all") ("c" "Commit" commit)]"#);
    let specs = tree[0].suffixes();
    assert!(specs[0].anonymous);
    assert_eq!(specs[0].command, "p:--all");
    assert!(!specs[1].anonymous);
    assert_eq!(specs[1].command, "commit");
}

#[test]
fn levels_and_keywords() {
    let tree = layout(r#"[2 "G" :if has-remote (5 "x" "X" x :transient t :level 6)]"#);
    let g = tree[0].as_group().unwrap();
    assert_eq!(g.level, Some(2));
    assert_eq!(g.predicates.if_.as_deref(), Some("has-remote"));
    let s = g.children[0].as_suffix().unwrap();
    // The keyword wins over the positional level.
    assert_eq!(s.level, Some(6));
    assert_eq!(s.transient, Some(TransientOverride::Bool(true)));
}

#[test]
fn same_literal_compiles_to_equal_trees() {
    let src = r#"["A" ("a" "A" a) ("-b" "B" "--b=")] [["L" ("c" "C" c)]]"#;
    assert_eq!(layout(src), layout(src));
}

#[test]
fn definition_errors() {
    let bad = [
        r#"("a" "A" a)"#,
        r#"["G" ("a" "A" a) ["Nested" ("b" "B" b)]]"#,
        r#"["G" ("a" "A" a :nonsense 1)]"#,
        r#"["G" ("a" "A" a :transient 3)]"#,
        r#"["G" (9 "a" "A" a)]"#,
        r#"["G" ("a" "Only description")]"#,
        r#"["G" ("c" "C" :argument-format "--c=%s")]"#,
    ];
    for src in bad {
        let res = compile_layout("p", &parse(src).unwrap());
        assert!(
            matches!(res, Err(MenuError::Definition(_))),
            "expected definition error for {}",
            src
        );
    }
}
