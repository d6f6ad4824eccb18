use super::*;
use crate::config::EngineConfig;
use crate::registry::Registry;
use crate::store::Store;
use crossterm::event::KeyCode as TermKey;
use ratatui::backend::TestBackend;

const MENU: &str = r#"
(define-prefix demo "Demo"
  ["Switches" ("-v" "Verbose" "--verbose")]
  ["Run" ("b" "Build" build) ("t" "Test" test :transient t)])
"#;

fn setup() -> (TerminalHost<TestBackend>, Session, DemoOptions) {
    let mut r = Registry::new();
    r.load_menus(MENU).unwrap();
    for name in ["build", "test"] {
        r.define_command(name, move |inv| {
            inv.message(format!("ran {}", inv.command));
            Ok(())
        });
    }
    let session = Session::new(r, EngineConfig::default(), Store::in_memory(10)).unwrap();
    let host = TerminalHost::new(Terminal::new(TestBackend::new(60, 24)).unwrap());
    let opts = DemoOptions {
        prefix: "demo".into(),
    };
    (host, session, opts)
}

fn press(
    host: &mut TerminalHost<TestBackend>,
    session: &mut Session,
    opts: &DemoOptions,
    code: TermKey,
) {
    handle_key(host, session, opts, KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
}

#[test]
fn exit_logs_the_export() {
    let (mut host, mut session, opts) = setup();
    open(&mut host, &mut session, &opts);
    press(&mut host, &mut session, &opts, TermKey::Char('-'));
    press(&mut host, &mut session, &opts, TermKey::Char('v'));
    press(&mut host, &mut session, &opts, TermKey::Char('b'));
    assert!(!session.is_active());
    assert_eq!(host.screen.log, vec!["ran build", "demo exported: --verbose"]);
    assert!(host.screen.view.is_none());
}

#[test]
fn idle_keys_reopen_and_quit() {
    let (mut host, mut session, opts) = setup();
    press(&mut host, &mut session, &opts, TermKey::Enter);
    assert!(session.is_active());
    press(&mut host, &mut session, &opts, TermKey::Char('t'));
    assert!(session.is_active());
    assert_eq!(host.screen.log, vec!["ran test"]);

    let ctrl_z = KeyEvent::new(TermKey::Char('z'), KeyModifiers::CONTROL);
    handle_key(&mut host, &mut session, &opts, ctrl_z).unwrap();
    assert!(!session.is_active());
    press(&mut host, &mut session, &opts, TermKey::Char('r'));
    assert!(session.is_active());

    let ctrl_g = KeyEvent::new(TermKey::Char('g'), KeyModifiers::CONTROL);
    handle_key(&mut host, &mut session, &opts, ctrl_g).unwrap();
    press(&mut host, &mut session, &opts, TermKey::Char('x'));
    assert_eq!(host.screen.log.last().map(String::as_str), Some("x is not bound"));
    press(&mut host, &mut session, &opts, TermKey::Char('q'));
    assert!(host.quit);
}

#[test]
fn unknown_prefix_is_reported() {
    let (mut host, mut session, _) = setup();
    let opts = DemoOptions {
        prefix: "missing".into(),
    };
    open(&mut host, &mut session, &opts);
    assert_eq!(host.screen.log, vec!["unknown prefix: missing"]);
}
