//! The boundary between the engine and the application embedding it.

use std::time::Duration;

use crate::dispatch::Keymap;
use crate::error::Result;
use crate::model::CommandId;
use crate::render::MenuView;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadRequest {
    pub prompt: String,
    pub initial: Option<String>,
    pub history_key: String,
    /// Most recent first.
    pub history: Vec<String>,
    pub choices: Vec<String>,
    /// Name of a registered reader that replaces the host's line reader.
    pub reader: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HelpRequest {
    pub prefix: CommandId,
    pub man_page: Option<String>,
    pub info_manual: Option<String>,
    /// `None` when help was requested for the menu itself.
    pub command: Option<CommandId>,
    pub key: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
}

/// What the host should do after a keypress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// No menu is active; the host dispatches the key itself.
    Inactive,
    /// Part of a multi-stroke key was typed.
    Pending,
    /// The menu stayed active.
    Stay,
    /// The menu was torn down.
    Exit,
    /// A nested menu replaced the current one.
    Replace,
    /// The menu was suspended onto the stack.
    Suspend,
    /// A suspended parent menu is active again.
    Resume,
    /// The key is not bound in the menu.
    Undefined,
    /// The key is not bound in the menu, the host should run its own binding.
    Passthrough { stay: bool },
    /// An error forced an emergency teardown.
    Abort,
}

pub trait Host {
    fn render(&mut self, view: &MenuView);
    fn remove_display(&mut self);

    fn install_keymap(&mut self, keymap: &Keymap);
    fn uninstall_keymap(&mut self);

    /// Arm the one-shot timer that ends in `Session::on_timer`.
    fn schedule_show(&mut self, delay: Duration);
    fn cancel_show(&mut self);

    /// `Ok(None)` when the user cancelled the read.
    fn read_line(&mut self, req: &ReadRequest) -> Result<Option<String>>;

    fn notify(&mut self, msg: &str);

    fn show_help(&mut self, help: &HelpRequest) {
        let mut msg = help.prefix.clone();
        if let Some(cmd) = &help.command {
            msg = format!("{} {}", msg, cmd);
        }
        if let Some(summary) = &help.summary {
            msg = format!("{}: {}", msg, summary);
        }
        self.notify(&msg);
    }
}
