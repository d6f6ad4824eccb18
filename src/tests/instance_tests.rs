use super::*;
use crate::render::row_text;

const MENU: &str = r#"
(define-prefix p "Pick"
  :incompatible (("--all" "--none"))
  ["Arguments"
   ("-a" "All" "--all")
   ("-n" "None" "--none")
   ("=a" "Author" "--author=")
   (5 "-x" "Extra" "--extra")
   ("-k" "Key" "--key=" :unsavable t)]
  ["Actions"
   ("a" "Alpha" cmd-a)
   ("b" "Beta" cmd-b)
   (0 "z" "Disabled" cmd-z)]
  [6 "Expert" ("E" "Expert" cmd-e)]
  ["Remote" :if has-remote ("r" "Push" cmd-push)]
  ["Busy" ("w" "Wait" cmd-wait :inapt-if busy) ("s" "Stash" cmd-stash :if-not busy)])
"#;

fn registry() -> Registry {
    let mut r = Registry::new();
    r.load_menus(MENU).unwrap();
    r.define_predicate("has-remote", |ctx| ctx.variables.contains_key("remote"));
    r.define_predicate("busy", |ctx| ctx.variables.contains_key("busy"));
    r
}

fn build(
    r: &Registry,
    levels: &LevelStore,
    vars: &BTreeMap<String, String>,
    edit_mode: bool,
    value: Option<&[Arg]>,
) -> PrefixInstance {
    let ctx = InstanceContext {
        registry: r,
        levels,
        variables: vars,
        default_level: 4,
        edit_mode,
    };
    PrefixInstance::instantiate(&ctx, "p", value).unwrap()
}

fn keys(inst: &PrefixInstance) -> Vec<&str> {
    inst.suffixes.iter().map(|s| s.key.as_str()).collect()
}

#[test]
fn default_level_keeps_declared_order() {
    let r = registry();
    let inst = build(&r, &LevelStore::default(), &BTreeMap::new(), false, None);
    assert_eq!(inst.level, 4);
    assert_eq!(keys(&inst), vec!["-a", "-n", "=a", "-k", "a", "b", "w", "s"]);
}

#[test]
fn raising_the_prefix_level_reveals_more() {
    let r = registry();
    let mut levels = LevelStore::default();
    levels.set_prefix_level("p", 5).unwrap();
    let inst = build(&r, &levels, &BTreeMap::new(), false, None);
    assert_eq!(inst.level, 5);
    assert!(inst.suffix("p:--extra").is_some());
    assert!(inst.suffix("cmd-e").is_none());

    levels.set_prefix_level("p", 7).unwrap();
    let inst = build(&r, &levels, &BTreeMap::new(), false, None);
    assert!(inst.suffix("cmd-e").is_some());
    // Level 0 stays hidden at any level.
    assert!(inst.suffix("cmd-z").is_none());
}

#[test]
fn suffix_level_override() {
    let r = registry();
    let mut levels = LevelStore::default();
    levels.set_suffix_level("p", "cmd-b", 6).unwrap();
    levels.set_suffix_level("p", "p:--extra", 3).unwrap();
    let inst = build(&r, &levels, &BTreeMap::new(), false, None);
    assert!(inst.suffix("cmd-b").is_none());
    assert_eq!(inst.suffix("p:--extra").map(|s| s.level), Some(3));
}

#[test]
fn edit_mode_shows_every_level() {
    let r = registry();
    let inst = build(&r, &LevelStore::default(), &BTreeMap::new(), true, None);
    assert!(inst.suffix("cmd-z").is_some());
    assert!(inst.suffix("cmd-e").is_some());
    assert_eq!(inst.suffix("cmd-e").map(|s| s.level), Some(6));
    assert!(inst.edit_mode);
}

#[test]
fn predicates_prune_groups_and_mark_inapt() {
    let r = registry();
    let mut vars = BTreeMap::new();
    let inst = build(&r, &LevelStore::default(), &vars, false, None);
    assert!(inst.suffix("cmd-push").is_none());
    assert!(!inst.suffix("cmd-wait").unwrap().inapt);

    vars.insert("remote".to_string(), "origin".to_string());
    vars.insert("busy".to_string(), "yes".to_string());
    let inst = build(&r, &LevelStore::default(), &vars, false, None);
    assert!(inst.suffix("cmd-push").is_some());
    assert!(inst.suffix("cmd-wait").unwrap().inapt);
    assert!(inst.suffix("cmd-stash").is_none());
}

#[test]
fn empty_groups_are_dropped() {
    let r = registry();
    let inst = build(&r, &LevelStore::default(), &BTreeMap::new(), false, None);
    let headings = inst
        .tree
        .iter()
        .filter_map(LayoutNode::as_group)
        .map(|g| g.description.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        headings,
        vec![
            Some(Description::Text("Arguments".into())),
            Some(Description::Text("Actions".into())),
            Some(Description::Text("Busy".into())),
        ]
    );
}

#[test]
fn value_seeds_infixes() {
    let r = registry();
    let value = vec![Arg::str("--all"), Arg::str("--author=me")];
    let inst = build(&r, &LevelStore::default(), &BTreeMap::new(), false, Some(&value));
    assert_eq!(inst.value(), value);
    assert_eq!(
        inst.suffix("p:--author=").unwrap().value(),
        InfixValue::One("me".into())
    );
    assert!(!inst.suffix("p:--none").unwrap().value().is_set());
}

#[test]
fn unsavable_infixes_stay_out_of_savable_value() {
    let r = registry();
    let value = vec![Arg::str("--all"), Arg::str("--key=abc")];
    let inst = build(&r, &LevelStore::default(), &BTreeMap::new(), false, Some(&value));
    assert_eq!(inst.value(), value);
    assert_eq!(inst.savable_value(), vec![Arg::str("--all")]);
}

#[test]
fn setting_one_side_unsets_the_other() {
    let r = registry();
    let value = vec![Arg::str("--all")];
    let mut inst = build(&r, &LevelStore::default(), &BTreeMap::new(), false, Some(&value));
    let none = inst.position("p:--none").unwrap();
    let all = inst.position("p:--all").unwrap();
    let forced = inst
        .set_infix_value(none, InfixValue::One("--none".into()))
        .unwrap();
    assert_eq!(forced, vec![all]);
    assert_eq!(inst.value(), vec![Arg::str("--none")]);

    let plain = inst.position("cmd-a").unwrap();
    assert!(inst.set_infix_value(plain, InfixValue::Unset).is_err());
}

#[test]
fn resume_reuses_the_pruned_tree() {
    let r = registry();
    let mut vars = BTreeMap::new();
    vars.insert("remote".to_string(), "origin".to_string());
    let value = vec![Arg::str("--all")];
    let inst = build(&r, &LevelStore::default(), &vars, false, Some(&value));
    let entry = StackEntry::capture(&inst);

    // The predicate no longer holds, but a resumed menu is not pruned again.
    let levels = LevelStore::default();
    let empty = BTreeMap::new();
    let ctx = InstanceContext {
        registry: &r,
        levels: &levels,
        variables: &empty,
        default_level: 4,
        edit_mode: false,
    };
    let resumed = PrefixInstance::resume(&ctx, &entry).unwrap();
    assert!(Rc::ptr_eq(&resumed.tree, &inst.tree));
    assert_eq!(resumed.suffixes, inst.suffixes);
    assert_eq!(resumed.value(), value);
}

#[test]
fn unknown_prefix() {
    let r = registry();
    let ctx = InstanceContext {
        registry: &r,
        levels: &LevelStore::default(),
        variables: &BTreeMap::new(),
        default_level: 4,
        edit_mode: false,
    };
    assert!(matches!(
        PrefixInstance::instantiate(&ctx, "nope", None),
        Err(MenuError::UnknownPrefix(_))
    ));
}

#[test]
fn view_lists_rows_and_value() {
    let r = registry();
    let value = vec![Arg::str("--all")];
    let inst = build(&r, &LevelStore::default(), &BTreeMap::new(), false, Some(&value));
    let view = inst.view(&r, None, None, Vec::new());
    assert_eq!(view.title, "Pick");
    assert_eq!(view.level, 4);
    assert_eq!(view.value_line, "--all");
    let lines = view.lines();
    assert_eq!(lines[0], "Arguments");
    assert_eq!(lines[1], " -a All (--all)");
    assert!(lines.contains(&" a Alpha".to_string()));

    let edit = build(&r, &LevelStore::default(), &BTreeMap::new(), true, None);
    let view = edit.view(&r, Some(ModeBanner::Edit), None, Vec::new());
    let actions = &view.groups[1];
    assert_eq!(row_text(&actions.rows[0]), "1  a Alpha");
    assert_eq!(row_text(&actions.rows[2]), "0  z Disabled");
}

#[test]
fn pad_keys_aligns_descriptions() {
    let mut r = Registry::new();
    r.load_menus(r#"(define-prefix q ["G" :pad-keys t ("a" "One" one) ("bcd" "Two" two)])"#)
        .unwrap();
    let ctx = InstanceContext {
        registry: &r,
        levels: &LevelStore::default(),
        variables: &BTreeMap::new(),
        default_level: 4,
        edit_mode: false,
    };
    let inst = PrefixInstance::instantiate(&ctx, "q", None).unwrap();
    let lines = inst.view(&r, None, None, Vec::new()).lines();
    assert_eq!(lines, vec!["G", " a   One", " bcd Two"]);
}
