#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};

use keymenu::dispatch::Keymap;
use keymenu::host::HelpRequest;
use keymenu::key::KeySeq;
use keymenu::render::MenuView;
use keymenu::store::FsBackend;
use keymenu::{Action, Arg, EngineConfig, Host, ReadRequest, Registry, Session, Store};

/// Commands run, with the args they were given.
pub type Calls = Rc<RefCell<Vec<(String, Vec<Arg>)>>>;

/// A host that does nothing but remember what it was asked to do.
#[derive(Default)]
pub struct RecordingHost {
    pub events: Vec<String>,
    pub views: Vec<MenuView>,
    pub inputs: VecDeque<Option<String>>,
    pub reads: Vec<ReadRequest>,
    pub notes: Vec<String>,
    pub helps: Vec<HelpRequest>,
    pub keymap: Option<String>,
    pub displayed: bool,
}

impl RecordingHost {
    pub fn answering(inputs: &[Option<&str>]) -> Self {
        Self {
            inputs: inputs.iter().map(|i| i.map(str::to_string)).collect(),
            ..Self::default()
        }
    }
}

impl Host for RecordingHost {
    fn render(&mut self, view: &MenuView) {
        self.displayed = true;
        self.events.push("render".into());
        self.views.push(view.clone());
    }

    fn remove_display(&mut self) {
        self.displayed = false;
        self.events.push("remove".into());
    }

    fn install_keymap(&mut self, keymap: &Keymap) {
        self.keymap = Some(keymap.prefix().to_string());
        self.events.push(format!("install {}", keymap.prefix()));
    }

    fn uninstall_keymap(&mut self) {
        self.keymap = None;
        self.events.push("uninstall".into());
    }

    fn schedule_show(&mut self, delay: Duration) {
        self.events.push(format!("schedule {}", delay.as_millis()));
    }

    fn cancel_show(&mut self) {
        self.events.push("cancel".into());
    }

    fn read_line(&mut self, req: &ReadRequest) -> keymenu::Result<Option<String>> {
        self.reads.push(req.clone());
        Ok(self.inputs.pop_front().flatten())
    }

    fn notify(&mut self, msg: &str) {
        self.notes.push(msg.to_string());
    }

    fn show_help(&mut self, help: &HelpRequest) {
        self.helps.push(help.clone());
    }
}

/// A registry from `menu` where every listed command records its calls.
pub fn registry(menu: &str, commands: &[&str]) -> Result<(Registry, Calls)> {
    let calls: Calls = Rc::default();
    let mut r = Registry::new();
    r.load_menus(menu).context("load menus")?;
    for name in commands {
        let calls = Rc::clone(&calls);
        r.define_command(*name, move |inv| {
            calls
                .borrow_mut()
                .push((inv.command.to_string(), inv.args.to_vec()));
            Ok(())
        });
    }
    Ok((r, calls))
}

pub fn memory_session(menu: &str, commands: &[&str]) -> Result<(Session, Calls)> {
    let (r, calls) = registry(menu, commands)?;
    let config = EngineConfig::default();
    let store = Store::in_memory(config.history_limit);
    Ok((Session::new(r, config, store)?, calls))
}

pub fn fs_session(
    dir: &Path,
    menu: &str,
    commands: &[&str],
    config: EngineConfig,
) -> Result<(Session, Calls)> {
    let (r, calls) = registry(menu, commands)?;
    let store = Store::load(Box::new(FsBackend::new(dir)), config.history_limit);
    Ok((Session::new(r, config, store)?, calls))
}

/// Type a key description, returning the action of the last stroke.
pub fn press(session: &mut Session, host: &mut RecordingHost, keys: &str) -> Result<Action> {
    let seq = KeySeq::parse(keys).with_context(|| format!("parse keys {}", keys))?;
    let mut last = Action::Inactive;
    for stroke in seq.0 {
        last = session.on_key(host, stroke)?;
    }
    Ok(last)
}

pub fn args(items: &[&str]) -> Vec<Arg> {
    items.iter().map(|s| Arg::str(*s)).collect()
}
