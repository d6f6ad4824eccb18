use super::*;

use crossterm::event::KeyCode as TermKey;

/// Translate a terminal key event into an engine stroke. Keys the engine has
/// no name for come back as `None`.
pub fn stroke_from_event(key: KeyEvent) -> Option<KeyStroke> {
    let code = match key.code {
        TermKey::Char(' ') => KeyCode::Space,
        TermKey::Char(c) => KeyCode::Char(c),
        TermKey::Enter => KeyCode::Enter,
        TermKey::Tab => KeyCode::Tab,
        TermKey::Esc => KeyCode::Esc,
        TermKey::Backspace => KeyCode::Backspace,
        TermKey::Delete => KeyCode::Delete,
        TermKey::Up => KeyCode::Up,
        TermKey::Down => KeyCode::Down,
        TermKey::Left => KeyCode::Left,
        TermKey::Right => KeyCode::Right,
        TermKey::PageUp => KeyCode::PageUp,
        TermKey::PageDown => KeyCode::PageDown,
        TermKey::F(n) => KeyCode::F(n),
        _ => return None,
    };
    Some(KeyStroke {
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        meta: key.modifiers.contains(KeyModifiers::ALT),
        code,
    })
}

#[cfg(test)]
#[path = "../tests/tui/convert_tests.rs"]
mod tests;
