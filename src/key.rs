//! Key descriptions.
//!
//! A description is a whitespace separated list of words. A word that starts
//! with a modifier (`C-`, `M-`) or names a special key (`RET`, `<up>`, ...)
//! is one stroke; any other word is one stroke per character, so `"-a"` is
//! the two strokes `-` then `a`.

use std::fmt;

use crate::error::{MenuError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Esc,
    Backspace,
    Delete,
    Space,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    F(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyStroke {
    pub ctrl: bool,
    pub meta: bool,
    pub code: KeyCode,
}

impl KeyStroke {
    pub fn plain(code: KeyCode) -> Self {
        Self {
            ctrl: false,
            meta: false,
            code,
        }
    }

    pub fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub fn ctrl(c: char) -> Self {
        Self {
            ctrl: true,
            meta: false,
            code: KeyCode::Char(c),
        }
    }

    pub fn meta(c: char) -> Self {
        Self {
            ctrl: false,
            meta: true,
            code: KeyCode::Char(c),
        }
    }

    fn parse_word(word: &str) -> Option<Self> {
        let mut ctrl = false;
        let mut meta = false;
        let mut rest = word;
        loop {
            if let Some(r) = rest.strip_prefix("C-").filter(|r| !r.is_empty()) {
                ctrl = true;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("M-").filter(|r| !r.is_empty()) {
                meta = true;
                rest = r;
            } else {
                break;
            }
        }

        let code = named_key(rest).or_else(|| {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        })?;
        Some(Self { ctrl, meta, code })
    }
}

fn named_key(s: &str) -> Option<KeyCode> {
    Some(match s {
        "RET" | "<return>" => KeyCode::Enter,
        "TAB" | "<tab>" => KeyCode::Tab,
        "ESC" | "<escape>" => KeyCode::Esc,
        "DEL" | "<backspace>" => KeyCode::Backspace,
        "<delete>" => KeyCode::Delete,
        "SPC" => KeyCode::Space,
        "<up>" => KeyCode::Up,
        "<down>" => KeyCode::Down,
        "<left>" => KeyCode::Left,
        "<right>" => KeyCode::Right,
        "<prior>" => KeyCode::PageUp,
        "<next>" => KeyCode::PageDown,
        _ => {
            let n = s.strip_prefix("<f")?.strip_suffix('>')?.parse::<u8>().ok()?;
            KeyCode::F(n)
        }
    })
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "C-")?;
        }
        if self.meta {
            write!(f, "M-")?;
        }
        match self.code {
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::Enter => write!(f, "RET"),
            KeyCode::Tab => write!(f, "TAB"),
            KeyCode::Esc => write!(f, "ESC"),
            KeyCode::Backspace => write!(f, "DEL"),
            KeyCode::Delete => write!(f, "<delete>"),
            KeyCode::Space => write!(f, "SPC"),
            KeyCode::Up => write!(f, "<up>"),
            KeyCode::Down => write!(f, "<down>"),
            KeyCode::Left => write!(f, "<left>"),
            KeyCode::Right => write!(f, "<right>"),
            KeyCode::PageUp => write!(f, "<prior>"),
            KeyCode::PageDown => write!(f, "<next>"),
            KeyCode::F(n) => write!(f, "<f{}>", n),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeySeq(pub Vec<KeyStroke>);

impl KeySeq {
    pub fn parse(desc: &str) -> Result<Self> {
        let mut strokes = Vec::new();
        for word in desc.split_whitespace() {
            let single = word.starts_with("C-")
                || word.starts_with("M-")
                || named_key(word).is_some();
            if single {
                let stroke = KeyStroke::parse_word(word)
                    .ok_or_else(|| MenuError::definition(format!("invalid key `{}`", word)))?;
                strokes.push(stroke);
            } else {
                strokes.extend(word.chars().map(KeyStroke::char));
            }
        }
        if strokes.is_empty() {
            return Err(MenuError::definition(format!("empty key `{}`", desc)));
        }
        Ok(Self(strokes))
    }

    pub fn strokes(&self) -> &[KeyStroke] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &[KeyStroke]) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for KeySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

/// Render a pending stroke prefix, e.g. `C-x`.
pub fn describe(strokes: &[KeyStroke]) -> String {
    KeySeq(strokes.to_vec()).to_string()
}

#[cfg(test)]
#[path = "tests/key_tests.rs"]
mod tests;
