//! Terminal demo host: drives a [`Session`] from crossterm key events and
//! draws its views with ratatui.

use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::dispatch::{Keymap, Session};
use crate::error::MenuError;
use crate::host::{Action, HelpRequest, Host, ReadRequest};
use crate::key::{KeyCode, KeyStroke};
use crate::render::{Face, GroupView, MenuView, ModeBanner, Segment};

mod convert;
mod draw;
mod event_loop;
mod host;
mod input;

pub use convert::stroke_from_event;
pub use host::{Prompt, Screen, TerminalHost};
pub use input::Input;

#[derive(Clone, Debug)]
pub struct DemoOptions {
    /// The menu opened at start and by `RET` while no menu is active.
    pub prefix: String,
}

pub fn run(session: &mut Session, opts: &DemoOptions) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("demo requires an interactive terminal (TTY)");
    }

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut host = TerminalHost::new(terminal);
    let res = event_loop::run_loop(&mut host, session, opts);

    let terminal = host.terminal_mut();
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}
