use super::*;

fn table() -> PredicateTable {
    let mut configured = BTreeMap::new();
    configured.insert("git-stage".to_string(), "call".to_string());
    configured.insert("odd".to_string(), "my-rule".to_string());
    PredicateTable::new(&configured)
}

#[test]
fn names_round_trip() {
    for name in [
        "stay", "call", "exit", "return", "replace", "suspend", "quit-one", "quit-all",
    ] {
        assert_eq!(Behavior::parse(name).name(), name);
    }
    assert_eq!(Behavior::parse("mine"), Behavior::Custom("mine".into()));
}

#[test]
fn literal_forms() {
    assert_eq!(Behavior::from_lit(&Lit::Bool(true)).unwrap(), Behavior::Stay);
    assert_eq!(Behavior::from_lit(&Lit::Bool(false)).unwrap(), Behavior::Exit);
    assert_eq!(Behavior::from_lit(&Lit::sym("call")).unwrap(), Behavior::Call);
    assert!(Behavior::from_lit(&Lit::Int(1)).is_err());
}

#[test]
fn behavior_properties() {
    assert!(Behavior::Stay.stays() && !Behavior::Stay.exports());
    assert!(Behavior::Call.stays() && Behavior::Call.exports());
    assert!(Behavior::Replace.pushes() && Behavior::Replace.exports());
    assert!(Behavior::Suspend.pushes() && !Behavior::Suspend.exports());
    assert!(!Behavior::QuitOne.exports() && !Behavior::QuitAll.pushes());
}

#[test]
fn explicit_override_wins() {
    let t = table();
    let yes = TransientOverride::Bool(true);
    let no = TransientOverride::Bool(false);
    assert_eq!(resolve(Some(&yes), &t, "git-stage", None, false), Behavior::Stay);
    assert_eq!(resolve(Some(&yes), &t, "sub", None, true), Behavior::Replace);
    assert_eq!(resolve(Some(&no), &t, "git-stage", None, false), Behavior::Exit);
    let named = TransientOverride::Named("suspend".into());
    assert_eq!(resolve(Some(&named), &t, "x", None, false), Behavior::Suspend);
}

#[test]
fn table_then_prefix_then_fallback() {
    let t = table();
    assert_eq!(resolve(None, &t, "git-stage", Some(&Behavior::Stay), false), Behavior::Call);
    assert_eq!(resolve(None, &t, "quit-all", None, false), Behavior::QuitAll);
    assert_eq!(resolve(None, &t, "odd", None, false), Behavior::Custom("my-rule".into()));
    assert_eq!(resolve(None, &t, "sub", Some(&Behavior::Stay), true), Behavior::Replace);
    assert_eq!(resolve(None, &t, "plain", Some(&Behavior::Stay), false), Behavior::Stay);
    assert_eq!(resolve(None, &t, "plain", None, false), Behavior::Exit);
}

#[test]
fn builtins_are_in_the_table() {
    let t = PredicateTable::new(&BTreeMap::new());
    assert_eq!(t.get("quit-one"), Some(&Behavior::QuitOne));
    assert_eq!(t.get("suspend"), Some(&Behavior::Suspend));
    assert_eq!(t.get("help"), Some(&Behavior::Stay));
    assert!(t.get("git-commit").is_none());
}
