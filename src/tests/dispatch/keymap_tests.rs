use super::*;
use crate::layout::compile_suffix;
use crate::literal::parse_one;
use crate::object::Prototype;

fn suffixes(srcs: &[&str]) -> Vec<Suffix> {
    srcs.iter()
        .map(|src| {
            let spec = compile_suffix("p", &parse_one(src).unwrap()).unwrap();
            Suffix::from_spec(&spec, &Prototype::for_class(spec.class), 1).unwrap()
        })
        .collect()
}

fn keys(desc: &str) -> Vec<KeyStroke> {
    KeySeq::parse(desc).unwrap().0
}

fn builtins() -> Vec<(Builtin, KeySeq)> {
    builtin_bindings(&BTreeMap::new()).unwrap()
}

#[test]
fn binds_suffixes_then_builtins() {
    let list = suffixes(&[r#"("-a" "All" "--all")"#, r#"("c" "Commit" commit)"#]);
    let km = Keymap::build("p", &list, &builtins(), true).unwrap();
    assert_eq!(km.prefix(), "p");
    assert_eq!(km.bindings().len(), 2 + Builtin::ALL.len());

    match km.lookup(&keys("c")) {
        Lookup::Command(b) => {
            assert_eq!(b.command, "commit");
            assert_eq!(b.target, Target::Suffix(1));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(km.lookup(&keys("-")), Lookup::Prefix);
    assert!(matches!(km.lookup(&keys("- a")), Lookup::Command(_)));
    assert_eq!(km.lookup(&keys("x")), Lookup::None);
    match km.lookup(&keys("C-g")) {
        Lookup::Command(b) => assert_eq!(b.target, Target::Builtin(Builtin::QuitOne)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn duplicate_key_is_a_conflict() {
    let list = suffixes(&[r#"("a" "One" one)"#, r#"("a" "Two" two)"#]);
    match Keymap::build("p", &list, &builtins(), true) {
        Err(MenuError::Conflict {
            prefix,
            key,
            first,
            second,
        }) => {
            assert_eq!(prefix, "p");
            assert_eq!(key, "a");
            assert_eq!(first, "one");
            assert_eq!(second, "two");
        }
        other => panic!("expected conflict, got {:?}", other.map(|k| k.bindings().len())),
    }
}

#[test]
fn prefix_overlap_is_a_conflict() {
    let list = suffixes(&[r#"("a" "One" one)"#, r#"("a b" "Two" two)"#]);
    assert!(matches!(
        Keymap::build("p", &list, &builtins(), true),
        Err(MenuError::Conflict { .. })
    ));
}

#[test]
fn same_command_on_same_key_is_fine() {
    let list = suffixes(&[r#"("a" "One" one)"#, r#"("a" "One again" one)"#]);
    let km = Keymap::build("p", &list, &builtins(), true).unwrap();
    assert_eq!(km.key_for("one").map(|k| k.to_string()).as_deref(), Some("a"));
}

#[test]
fn without_detection_the_first_binding_wins() {
    let list = suffixes(&[r#"("a" "One" one)"#, r#"("a" "Two" two)"#]);
    let km = Keymap::build("p", &list, &builtins(), false).unwrap();
    match km.lookup(&keys("a")) {
        Lookup::Command(b) => assert_eq!(b.command, "one"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn suffix_keys_shadow_builtins() {
    let list = suffixes(&[r#"("C-g" "Go" go)"#]);
    let km = Keymap::build("p", &list, &builtins(), true).unwrap();
    match km.lookup(&keys("C-g")) {
        Lookup::Command(b) => assert_eq!(b.command, "go"),
        other => panic!("unexpected {:?}", other),
    }
    assert!(km.key_for("quit-one").is_none());
}

#[test]
fn reachable_keys_under_a_prefix() {
    let list = suffixes(&[r#"("-a" "All" "--all")"#, r#"("-b" "B" "--b")"#, r#"("c" "C" c)"#]);
    let km = Keymap::build("p", &list, &builtins(), true).unwrap();
    assert_eq!(km.reachable(&keys("-")), vec!["- a", "- b"]);
    let under_cx = km.reachable(&keys("C-x"));
    assert!(under_cx.contains(&"C-x l".to_string()));
    assert!(under_cx.contains(&"C-x C-s".to_string()));
}

#[test]
fn builtin_key_overrides() {
    let mut overrides = BTreeMap::new();
    overrides.insert("quit-one".to_string(), "ESC".to_string());
    let b = builtin_bindings(&overrides).unwrap();
    let quit = b.iter().find(|(b, _)| *b == Builtin::QuitOne).unwrap();
    assert_eq!(quit.1.to_string(), "ESC");

    overrides.insert("frobnicate".to_string(), "x".to_string());
    assert!(matches!(
        builtin_bindings(&overrides),
        Err(MenuError::Definition(_))
    ));
}
