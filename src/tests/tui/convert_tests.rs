use super::*;

fn ev(code: TermKey, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

#[test]
fn plain_and_modified_chars() {
    assert_eq!(
        stroke_from_event(ev(TermKey::Char('a'), KeyModifiers::NONE)),
        Some(KeyStroke::char('a'))
    );
    assert_eq!(
        stroke_from_event(ev(TermKey::Char('g'), KeyModifiers::CONTROL)),
        Some(KeyStroke::ctrl('g'))
    );
    assert_eq!(
        stroke_from_event(ev(TermKey::Char('p'), KeyModifiers::ALT)),
        Some(KeyStroke::meta('p'))
    );
    // Shift is already folded into the character.
    assert_eq!(
        stroke_from_event(ev(TermKey::Char('A'), KeyModifiers::SHIFT)),
        Some(KeyStroke::char('A'))
    );
}

#[test]
fn named_keys() {
    assert_eq!(
        stroke_from_event(ev(TermKey::Char(' '), KeyModifiers::NONE)),
        Some(KeyStroke::plain(KeyCode::Space))
    );
    assert_eq!(
        stroke_from_event(ev(TermKey::Enter, KeyModifiers::NONE)),
        Some(KeyStroke::plain(KeyCode::Enter))
    );
    assert_eq!(
        stroke_from_event(ev(TermKey::F(5), KeyModifiers::NONE))
            .map(|s| s.to_string())
            .as_deref(),
        Some("<f5>")
    );
    assert_eq!(stroke_from_event(ev(TermKey::Insert, KeyModifiers::NONE)), None);
}
