use super::*;

const LOG_LIMIT: usize = 200;

#[derive(Debug, Default)]
pub struct Prompt {
    pub label: String,
    pub input: Input,
    pub choices: Vec<String>,
}

/// What the demo draws, kept apart from the terminal so it can be drawn
/// into any backend.
#[derive(Debug, Default)]
pub struct Screen {
    pub view: Option<MenuView>,
    /// Prefix whose keymap is installed.
    pub keymap: Option<String>,
    pub prompt: Option<Prompt>,
    pub help: Option<HelpRequest>,
    pub log: Vec<String>,
}

impl Screen {
    pub fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
        if self.log.len() > LOG_LIMIT {
            let excess = self.log.len() - LOG_LIMIT;
            self.log.drain(..excess);
        }
    }
}

pub struct TerminalHost<B: Backend> {
    terminal: Terminal<B>,
    pub screen: Screen,
    show_at: Option<Instant>,
    pub quit: bool,
}

impl<B: Backend> TerminalHost<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            screen: Screen::default(),
            show_at: None,
            quit: false,
        }
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }

    pub fn redraw(&mut self) -> Result<()> {
        let screen = &self.screen;
        self.terminal
            .draw(|f| draw::draw(f, screen))
            .context("draw")?;
        Ok(())
    }

    /// True once, when an armed show timer has run out.
    pub fn show_due(&mut self) -> bool {
        match self.show_at {
            Some(at) if Instant::now() >= at => {
                self.show_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn show_pending(&self) -> bool {
        self.show_at.is_some()
    }

    fn read_prompt(&mut self) -> Result<Option<String>> {
        loop {
            self.redraw()?;
            let Event::Key(key) = event::read().context("read event")? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let Some(prompt) = self.screen.prompt.as_mut() else {
                return Ok(None);
            };
            if let Some(done) = edit_prompt(prompt, key) {
                return Ok(done);
            }
        }
    }
}

/// Apply one key to the prompt; `Some` once the read is over.
pub(super) fn edit_prompt(prompt: &mut Prompt, key: KeyEvent) -> Option<Option<String>> {
    let Some(stroke) = stroke_from_event(key) else {
        return None;
    };
    let input = &mut prompt.input;
    match (stroke.ctrl, stroke.meta, stroke.code) {
        (_, _, KeyCode::Enter) => return Some(Some(input.buf.clone())),
        (false, false, KeyCode::Esc) | (true, _, KeyCode::Char('g')) => return Some(None),
        (_, _, KeyCode::Up) | (false, true, KeyCode::Char('p')) => input.history_up(),
        (_, _, KeyCode::Down) | (false, true, KeyCode::Char('n')) => input.history_down(),
        (_, _, KeyCode::Tab) => input.complete(&prompt.choices),
        (_, _, KeyCode::Backspace) => input.backspace(),
        (_, _, KeyCode::Delete) => input.delete(),
        (_, _, KeyCode::Left) => input.move_left(),
        (_, _, KeyCode::Right) => input.move_right(),
        (true, _, KeyCode::Char('u')) => input.clear(),
        (false, false, KeyCode::Space) => input.insert_char(' '),
        (false, false, KeyCode::Char(c)) => input.insert_char(c),
        _ => {}
    }
    None
}

impl<B: Backend> Host for TerminalHost<B> {
    fn render(&mut self, view: &MenuView) {
        self.screen.view = Some(view.clone());
    }

    fn remove_display(&mut self) {
        self.screen.view = None;
        self.screen.help = None;
    }

    fn install_keymap(&mut self, keymap: &Keymap) {
        self.screen.keymap = Some(keymap.prefix().to_string());
    }

    fn uninstall_keymap(&mut self) {
        self.screen.keymap = None;
    }

    fn schedule_show(&mut self, delay: Duration) {
        self.show_at = Some(Instant::now() + delay);
    }

    fn cancel_show(&mut self) {
        self.show_at = None;
    }

    fn read_line(&mut self, req: &ReadRequest) -> crate::error::Result<Option<String>> {
        self.screen.prompt = Some(Prompt {
            label: req.prompt.clone(),
            input: Input::new(req.initial.as_deref(), req.history.clone()),
            choices: req.choices.clone(),
        });
        let res = self.read_prompt();
        self.screen.prompt = None;
        res.map_err(|e| MenuError::Read(format!("{:#}", e)))
    }

    fn notify(&mut self, msg: &str) {
        tracing::info!(msg, "notice");
        self.screen.push_log(msg);
    }

    fn show_help(&mut self, help: &HelpRequest) {
        let mut line = match (&help.command, &help.key) {
            (Some(cmd), Some(key)) => format!("{} runs {}", key, cmd),
            _ => format!("menu {}", help.prefix),
        };
        if let Some(summary) = help.summary.as_deref().or(help.description.as_deref()) {
            line = format!("{}: {}", line, summary);
        }
        if let Some(man) = &help.man_page {
            line = format!("{} (see man {})", line, man);
        }
        self.screen.push_log(line);
        self.screen.help = Some(help.clone());
    }
}

#[cfg(test)]
#[path = "../tests/tui/host_tests.rs"]
mod tests;
