/// A one-line editor for infix prompts.
#[derive(Debug, Default)]
pub struct Input {
    pub buf: String,
    /// Byte offset, always on a char boundary.
    pub cursor: usize,
    /// Most recent first.
    pub history: Vec<String>,
    pub history_pos: Option<usize>,
}

impl Input {
    pub fn new(initial: Option<&str>, history: Vec<String>) -> Self {
        let mut input = Self {
            history,
            ..Self::default()
        };
        if let Some(s) = initial {
            input.set(s.to_string());
        }
        input
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.cursor = 0;
        self.history_pos = None;
    }

    pub fn insert_char(&mut self, c: char) {
        self.buf.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        let Some(prev) = self.prev_boundary() else {
            return;
        };
        self.buf.remove(prev);
        self.cursor = prev;
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.buf.len() {
            return;
        }
        self.buf.remove(self.cursor);
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.buf[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn set(&mut self, s: String) {
        self.buf = s;
        self.cursor = self.buf.len();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.buf[..self.cursor].char_indices().last().map(|(i, _)| i)
    }

    /// Step to an older entry.
    pub fn history_up(&mut self) {
        let next = match self.history_pos {
            None => 0,
            Some(i) => i + 1,
        };
        if let Some(entry) = self.history.get(next) {
            self.history_pos = Some(next);
            self.set(entry.clone());
        }
    }

    /// Step to a newer entry; past the newest the line is cleared.
    pub fn history_down(&mut self) {
        match self.history_pos {
            None => {}
            Some(0) => self.clear(),
            Some(i) => {
                self.history_pos = Some(i - 1);
                self.set(self.history[i - 1].clone());
            }
        }
    }

    /// Replace the line with the next choice it is a prefix of, cycling.
    pub fn complete(&mut self, choices: &[String]) {
        if choices.is_empty() {
            return;
        }
        let exact = choices.iter().position(|c| *c == self.buf);
        let start = exact.map(|i| i + 1).unwrap_or(0);
        let found = (0..choices.len())
            .map(|k| &choices[(start + k) % choices.len()])
            .find(|c| exact.is_some() || c.starts_with(self.buf.as_str()))
            .cloned();
        if let Some(choice) = found {
            self.set(choice);
        }
    }
}

#[cfg(test)]
#[path = "../tests/tui/input_tests.rs"]
mod tests;
