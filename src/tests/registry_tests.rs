use super::*;
use crate::layout::Locator;

const MENU: &str = r#"
(define-prefix commit "Commit"
  :man-page "git-commit"
  :level 5
  :incompatible (("--all" "--patch"))
  :init-value ("--verbose")
  :transient-suffix t
  ["Arguments"
   ("-a" "All" "--all")
   ("-p" "Patch" "--patch")
   ("-v" "Verbose" "--verbose")]
  ["Create"
   ("c" "Commit" git-commit)
   ("e" "Extend" git-extend)])
"#;

fn registry() -> Registry {
    let mut r = Registry::new();
    r.load_menus(MENU).unwrap();
    r
}

fn keys(r: &Registry, prefix: &str) -> Vec<String> {
    let tree = r.layout(prefix).unwrap();
    let mut specs = Vec::new();
    collect_suffixes(&tree, &mut specs);
    specs.into_iter().map(|s| s.key.clone()).collect()
}

#[test]
fn load_menus_reads_prefix_slots() {
    let r = registry();
    let def = r.prefix("commit").unwrap();
    assert_eq!(def.description.as_deref(), Some("Commit"));
    assert_eq!(def.man_page.as_deref(), Some("git-commit"));
    assert_eq!(def.default_level, Some(5));
    assert_eq!(
        def.incompatible,
        vec![vec!["--all".to_string(), "--patch".to_string()]]
    );
    assert_eq!(def.init_value, Some(vec![Arg::str("--verbose")]));
    assert_eq!(def.suffix_behavior, Some(Behavior::Stay));
    assert_eq!(def.history_key(), "commit");
    assert_eq!(keys(&r, "commit"), vec!["-a", "-p", "-v", "c", "e"]);
}

#[test]
fn load_menus_returns_defined_prefixes() {
    let mut r = Registry::new();
    let defined = r
        .load_menus(r#"(define-prefix a ["A" ("x" "X" x)]) (define-prefix b ["B" ("y" "Y" y)])"#)
        .unwrap();
    assert_eq!(defined, vec!["a", "b"]);
}

#[test]
fn unedited_layout_is_the_same_rc() {
    let r = registry();
    let first = r.layout("commit").unwrap();
    let second = r.layout("commit").unwrap();
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn edits_install_a_new_tree() {
    let mut r = registry();
    let before = r.layout("commit").unwrap();
    r.insert_after(
        "commit",
        &Locator::key("c"),
        compile_node("commit", &literal::parse_one(r#"("F" "Fixup" git-fixup)"#).unwrap())
            .unwrap(),
    )
    .unwrap();
    let after = r.layout("commit").unwrap();
    assert!(!Rc::ptr_eq(&before, &after));
    assert_eq!(keys(&r, "commit"), vec!["-a", "-p", "-v", "c", "F", "e"]);
    // A live instance holding the old tree keeps seeing it.
    let mut old = Vec::new();
    collect_suffixes(&before, &mut old);
    assert_eq!(old.len(), 5);
}

#[test]
fn failed_edit_keeps_the_old_tree() {
    let mut r = registry();
    let before = r.layout("commit").unwrap();
    let err = r.remove("commit", &Locator::key("zz")).unwrap_err();
    assert!(matches!(err, MenuError::Locator(_)));
    assert!(Rc::ptr_eq(&before, &r.layout("commit").unwrap()));
}

#[test]
fn edit_forms_in_menu_files() {
    let mut r = registry();
    r.load_menus(
        r#"
        (insert-before commit "c" ("w" "Reword" git-reword))
        (remove commit "e")
        (replace commit "-v" ("-s" "Signoff" "--signoff"))
        (set-property commit "c" :description "Commit now")
        "#,
    )
    .unwrap();
    assert_eq!(keys(&r, "commit"), vec!["-a", "-p", "-s", "w", "c"]);
    let node = r.get("commit", &Locator::key("c")).unwrap();
    assert_eq!(node.as_suffix().unwrap().description_text(), Some("Commit now"));
}

#[test]
fn unknown_forms_and_prefixes() {
    let mut r = registry();
    assert!(matches!(
        r.load_menus("(frobnicate commit)"),
        Err(MenuError::Definition(_))
    ));
    assert!(matches!(
        r.load_menus(r#"(remove nope "c")"#),
        Err(MenuError::UnknownPrefix(_))
    ));
    assert!(matches!(
        r.load_menus(r#"(define-prefix bad :nonsense 1 ["G" ("a" "A" a)])"#),
        Err(MenuError::Definition(_))
    ));
}

#[test]
fn defined_suffixes_merge_into_layouts() {
    let mut r = Registry::new();
    r.load_menus(
        r#"
        (define-infix log-author :argument "--author=" :prompt "Author: ")
        (define-prefix log ["Filter" ("=a" "Author" log-author)])
        "#,
    )
    .unwrap();
    let spec = r.suffix_spec("log-author").unwrap();
    assert_eq!(spec.class, SuffixClass::Option);
    assert_eq!(spec.prompt.as_deref(), Some("Author: "));
    assert!(matches!(
        r.command_kind("log-author"),
        Some(CommandKind::Infix)
    ));
}

#[test]
fn command_kinds() {
    let mut r = registry();
    r.define_command("git-commit", |_| Ok(()));
    assert!(matches!(r.command_kind("commit"), Some(CommandKind::Prefix)));
    assert!(matches!(
        r.command_kind("git-commit"),
        Some(CommandKind::User(_))
    ));
    assert!(matches!(
        r.command_kind("commit:--all"),
        Some(CommandKind::Infix)
    ));
    assert!(matches!(
        r.command_kind("quit-one"),
        Some(CommandKind::Builtin(Builtin::QuitOne))
    ));
    assert!(r.command_kind("git-extend").is_none());
}

#[test]
fn anonymous_infixes_are_not_completable() {
    let mut r = registry();
    r.define_command("git-commit", |_| Ok(()));
    assert!(r.is_anonymous("commit:--all"));
    let names = r.completable_commands();
    assert!(names.contains(&"commit".to_string()));
    assert!(names.contains(&"git-commit".to_string()));
    assert!(names.contains(&"help".to_string()));
    assert!(!names.iter().any(|n| n.starts_with("commit:")));
}

#[test]
fn predicates_and_descriptions() {
    let mut r = registry();
    r.define_predicate("has-remote", |ctx| ctx.variables.contains_key("remote"));
    r.define_description("count", |args| format!("{} args", args.len()));

    let mut vars = BTreeMap::new();
    let ctx = PredicateContext {
        prefix: "commit",
        value: &[],
        scope: None,
        variables: &vars,
    };
    assert!(!r.eval_predicate("has-remote", &ctx));
    assert!(!r.eval_predicate("never-defined", &ctx));

    vars.insert("remote".to_string(), "origin".to_string());
    let ctx = PredicateContext {
        prefix: "commit",
        value: &[],
        scope: None,
        variables: &vars,
    };
    assert!(r.eval_predicate("has-remote", &ctx));
    assert_eq!(
        r.describe("count", &[Arg::str("-a"), Arg::str("-b")]).as_deref(),
        Some("2 args")
    );
    assert!(r.describe("missing", &[]).is_none());
}

#[test]
fn prototypes_can_be_replaced() {
    let mut r = Registry::new();
    assert_eq!(r.prototype(SuffixClass::Switch).format, " %k %d (%v)");
    let mut proto = Prototype::for_class(SuffixClass::Switch);
    proto.format = " %k %v".to_string();
    r.set_prototype(proto);
    assert_eq!(r.prototype(SuffixClass::Switch).format, " %k %v");
    assert_eq!(r.prototype(SuffixClass::Option).format, " %k %d (%v)");
}
