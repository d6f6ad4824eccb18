use super::*;
use crossterm::event::KeyCode as TermKey;
use ratatui::backend::TestBackend;

fn host() -> TerminalHost<TestBackend> {
    TerminalHost::new(Terminal::new(TestBackend::new(60, 24)).unwrap())
}

fn key(code: TermKey) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn screen_text(host: &mut TerminalHost<TestBackend>) -> String {
    host.terminal_mut()
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect()
}

#[test]
fn prompt_editing_and_submit() {
    let mut prompt = Prompt {
        label: "Author: ".into(),
        input: Input::new(None, vec!["me".into()]),
        choices: Vec::new(),
    };
    assert_eq!(edit_prompt(&mut prompt, key(TermKey::Char('x'))), None);
    assert_eq!(edit_prompt(&mut prompt, key(TermKey::Backspace)), None);
    assert_eq!(edit_prompt(&mut prompt, key(TermKey::Up)), None);
    assert_eq!(prompt.input.buf, "me");
    assert_eq!(
        edit_prompt(&mut prompt, key(TermKey::Enter)),
        Some(Some("me".to_string()))
    );
}

#[test]
fn prompt_cancel() {
    let mut prompt = Prompt::default();
    assert_eq!(edit_prompt(&mut prompt, key(TermKey::Esc)), Some(None));
    let ctrl_g = KeyEvent::new(TermKey::Char('g'), KeyModifiers::CONTROL);
    assert_eq!(edit_prompt(&mut prompt, ctrl_g), Some(None));
}

#[test]
fn show_timer_fires_once() {
    let mut h = host();
    assert!(!h.show_due());
    h.schedule_show(Duration::ZERO);
    assert!(h.show_pending());
    assert!(h.show_due());
    assert!(!h.show_due());

    h.schedule_show(Duration::from_secs(60));
    h.cancel_show();
    assert!(!h.show_pending());
}

#[test]
fn log_is_capped() {
    let mut h = host();
    for i in 0..(LOG_LIMIT + 5) {
        h.notify(&format!("line {}", i));
    }
    assert_eq!(h.screen.log.len(), LOG_LIMIT);
    assert_eq!(h.screen.log[0], "line 5");
}

#[test]
fn help_lands_in_the_log() {
    let mut h = host();
    h.show_help(&HelpRequest {
        prefix: "commit".into(),
        man_page: Some("git-commit".into()),
        command: Some("do-commit".into()),
        key: Some("c".into()),
        summary: Some("Record changes".into()),
        ..HelpRequest::default()
    });
    assert_eq!(
        h.screen.log,
        vec!["c runs do-commit: Record changes (see man git-commit)"]
    );
    h.remove_display();
    assert!(h.screen.help.is_none());
}

#[test]
fn redraw_shows_the_menu() {
    let mut r = crate::registry::Registry::new();
    r.load_menus(r#"(define-prefix demo "Demo" ["Switches" ("-v" "Verbose" "--verbose")])"#)
        .unwrap();
    let mut session = Session::new(
        r,
        crate::config::EngineConfig::default(),
        crate::store::Store::in_memory(10),
    )
    .unwrap();
    let mut h = host();
    session.enter(&mut h, "demo").unwrap();
    assert_eq!(h.screen.keymap.as_deref(), Some("demo"));
    h.redraw().unwrap();
    let text = screen_text(&mut h);
    assert!(text.contains("Demo"));
    assert!(text.contains("Switches"));
    assert!(text.contains("-v Verbose"));
}
