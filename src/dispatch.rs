//! The session: one active menu at a time, a stack of menus waiting behind
//! it, and the key loop that moves between them.
//!
//! States and the host calls made on each transition:
//!
//! - `Inactive -> Active` (`enter`, `resume`): install keymap, then draw or
//!   arm the show timer.
//! - `Active -> Inactive | Suspended` (exit, quit, suspend): cancel timer,
//!   remove display, uninstall keymap.
//! - `Active -> ReadingInput -> Active`: while an infix reads a value.
//! - `Active <-> HelpMode | EditMode`: keymap stays, the view gets a banner.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::config::EngineConfig;
use crate::error::{MenuError, Result};
use crate::host::{Action, HelpRequest, Host, ReadRequest};
use crate::instance::{InstanceContext, PrefixInstance};
use crate::key::{KeySeq, KeyStroke, describe};
use crate::model::{Arg, CommandId, MAX_LEVEL, MIN_LEVEL};
use crate::object::{InfixValue, ReadOutcome, Suffix};
use crate::registry::{CommandKind, Invocation, Registry};
use crate::render::{MenuView, ModeBanner};
use crate::stack::{Stack, StackEntry};
use crate::store::{HistoryItem, Store};

mod behavior;
mod builtins;
mod keymap;

pub use behavior::{Behavior, BehaviorContext, BehaviorFn, PredicateTable, resolve};
pub use builtins::Builtin;
pub use keymap::{Binding, Keymap, Lookup, Target, builtin_bindings};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Inactive,
    Active,
    ReadingInput,
    HelpMode,
    EditMode,
    Suspended,
}

/// The value a menu handed out when it exported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub prefix: CommandId,
    pub args: Vec<Arg>,
}

/// Called once the last menu is gone, with whatever was exported.
pub type ExitHook = Rc<dyn Fn(Option<&Export>)>;

/// `(command, key) -> replacement key`, applied before keys are bound.
pub type KeySubstitution = Rc<dyn Fn(&str, &str) -> Option<String>>;

struct Active {
    instance: PrefixInstance,
    keymap: Keymap,
    /// Strokes typed so far of a multi-stroke key.
    pending: Vec<KeyStroke>,
    shown: bool,
    /// Entered on top of the menu now at the top of the stack.
    nested: bool,
}

impl Active {
    fn capture(&self) -> StackEntry {
        StackEntry {
            nested: self.nested,
            ..StackEntry::capture(&self.instance)
        }
    }
}

pub struct Session {
    registry: Registry,
    config: EngineConfig,
    store: Store,
    table: PredicateTable,
    builtin_keys: Vec<(Builtin, KeySeq)>,
    state: State,
    active: Option<Active>,
    stack: Stack,
    /// Values kept by `set` for the rest of the session.
    set_values: BTreeMap<CommandId, Vec<Arg>>,
    variables: BTreeMap<String, String>,
    export: Option<Export>,
    last_export: Option<Export>,
    exit_hook: Option<ExitHook>,
    key_substitution: Option<KeySubstitution>,
}

impl Session {
    pub fn new(registry: Registry, config: EngineConfig, store: Store) -> Result<Self> {
        let builtin_keys = builtin_bindings(&config.builtin_keys)?;
        let table = PredicateTable::new(&config.behaviors);
        Ok(Self {
            registry,
            config,
            store,
            table,
            builtin_keys,
            state: State::Inactive,
            active: None,
            stack: Stack::default(),
            set_values: BTreeMap::new(),
            variables: BTreeMap::new(),
            export: None,
            last_export: None,
            exit_hook: None,
            key_substitution: None,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_prefix(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.instance.command.as_str())
    }

    pub fn instance(&self) -> Option<&PrefixInstance> {
        self.active.as_ref().map(|a| &a.instance)
    }

    pub fn keymap(&self) -> Option<&Keymap> {
        self.active.as_ref().map(|a| &a.keymap)
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Definitions edited here reach the next instance, not the live one.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// The value exported by the running command, while it runs.
    pub fn export(&self) -> Option<&Export> {
        self.export.as_ref()
    }

    /// The most recent export, kept after the session ends.
    pub fn last_export(&self) -> Option<&Export> {
        self.last_export.as_ref()
    }

    pub fn set_exit_hook(&mut self, hook: impl Fn(Option<&Export>) + 'static) {
        self.exit_hook = Some(Rc::new(hook));
    }

    pub fn set_key_substitution(&mut self, f: impl Fn(&str, &str) -> Option<String> + 'static) {
        self.key_substitution = Some(Rc::new(f));
    }

    /// Map a command to a behavior for every menu of this session.
    pub fn set_behavior(&mut self, command: impl Into<CommandId>, behavior: Behavior) {
        self.table.insert(command, behavior);
    }

    pub fn view(&self) -> Option<MenuView> {
        let active = self.active.as_ref()?;
        let banner = match self.state {
            State::HelpMode => Some(ModeBanner::Help),
            State::EditMode => Some(ModeBanner::Edit),
            _ if active.instance.edit_mode => Some(ModeBanner::Edit),
            _ => None,
        };
        let (pending, reachable) = if active.pending.is_empty() {
            (None, Vec::new())
        } else {
            (
                Some(describe(&active.pending)),
                active.keymap.reachable(&active.pending),
            )
        };
        Some(
            active
                .instance
                .view(&self.registry, banner, pending, reachable),
        )
    }

    /// Open `prefix`. A menu already open goes onto the stack first.
    ///
    /// The instance and its keymap are built before the host is touched, so
    /// a key conflict leaves nothing installed.
    pub fn enter(&mut self, host: &mut dyn Host, prefix: &str) -> Result<()> {
        let nested = self.active.is_some();
        self.enter_with(host, prefix, nested)
    }

    fn enter_with(&mut self, host: &mut dyn Host, prefix: &str, nested: bool) -> Result<()> {
        let seed = self.seed_value(prefix)?;
        let inst = self.instantiate(prefix, false, seed.as_deref())?;
        let keymap = self.keymap_for(&inst)?;

        if let Some(active) = self.active.as_ref() {
            self.stack.push(active.capture());
            self.teardown(host);
        }
        self.active = Some(Active {
            instance: inst,
            keymap,
            pending: Vec::new(),
            shown: false,
            nested,
        });
        self.state = State::Active;
        self.install(host);
        tracing::debug!(prefix, depth = self.stack.len(), "enter");
        Ok(())
    }

    /// Bring back the most recently suspended menu.
    pub fn resume(&mut self, host: &mut dyn Host) -> Result<Action> {
        if self.active.is_some() {
            return Ok(Action::Stay);
        }
        if self.stack.is_empty() {
            host.notify("No suspended menu");
            return Ok(Action::Inactive);
        }
        self.pop_resume(host)
    }

    /// The show timer fired.
    pub fn on_timer(&mut self, host: &mut dyn Host) {
        if let Some(active) = self.active.as_mut()
            && !active.shown
        {
            active.shown = true;
            self.render(host);
        }
    }

    /// Leave every menu without exporting.
    pub fn quit_all(&mut self, host: &mut dyn Host) -> Result<Action> {
        if self.active.is_none() {
            self.stack.clear();
            self.state = State::Inactive;
            return Ok(Action::Inactive);
        }
        self.leave(host, &Behavior::QuitAll);
        self.finish(host, &Behavior::QuitAll)
    }

    /// Feed one keypress. Errors other than definition errors and key
    /// conflicts tear every menu down and come back as `Action::Abort`.
    pub fn on_key(&mut self, host: &mut dyn Host, stroke: KeyStroke) -> Result<Action> {
        match self.handle_key(host, stroke) {
            Err(e) if !e.is_hard() => {
                self.emergency(host, &e);
                Ok(Action::Abort)
            }
            other => other,
        }
    }

    /// The exported value of `prefix`: live if it is the open menu,
    /// otherwise what a fresh instance would start with.
    pub fn current_value(&self, prefix: &str) -> Result<Vec<Arg>> {
        if let Some(active) = self.active.as_ref()
            && active.instance.command == prefix
        {
            return Ok(active.instance.value());
        }
        let seed = self.seed_value(prefix)?;
        Ok(self.instantiate(prefix, false, seed.as_deref())?.value())
    }

    fn handle_key(&mut self, host: &mut dyn Host, stroke: KeyStroke) -> Result<Action> {
        let Some(active) = self.active.as_mut() else {
            return Ok(Action::Inactive);
        };
        active.pending.push(stroke);
        match active.keymap.lookup(&active.pending) {
            Lookup::Command(binding) => {
                active.pending.clear();
                self.dispatch(host, binding)
            }
            Lookup::Prefix => {
                if !active.shown {
                    host.cancel_show();
                    active.shown = true;
                }
                self.render(host);
                Ok(Action::Pending)
            }
            Lookup::None => {
                let keys = describe(&std::mem::take(&mut active.pending));
                self.unbound(host, &keys)
            }
        }
    }

    fn unbound(&mut self, host: &mut dyn Host, keys: &str) -> Result<Action> {
        if self.state == State::HelpMode {
            self.state = State::Active;
        }
        let prefix = self.active_prefix().unwrap_or_default().to_string();
        let fallback = self.registry.prefix(&prefix)?.non_suffix_behavior.clone();
        let Some(behavior) = fallback else {
            host.notify(&MenuError::UndefinedKey(keys.to_string()).to_string());
            self.render(host);
            return Ok(Action::Undefined);
        };

        let behavior = self.concrete(&prefix, "", behavior, false);
        tracing::debug!(prefix = %prefix, keys, behavior = behavior.name(), "pass through");
        if behavior.stays() {
            return Ok(Action::Passthrough { stay: true });
        }
        self.leave(host, &behavior);
        self.finish(host, &behavior)?;
        Ok(Action::Passthrough { stay: false })
    }

    fn dispatch(&mut self, host: &mut dyn Host, binding: Binding) -> Result<Action> {
        match (self.state, binding.target) {
            (State::HelpMode, _) => self.help_for(host, &binding),
            (State::EditMode, Target::Builtin(b)) if b.works_in_edit_mode() => {
                self.run_builtin(host, b)
            }
            (State::EditMode, _) => self.edit_level(host, &binding),
            (_, Target::Builtin(b)) => self.run_builtin(host, b),
            (_, Target::Suffix(idx)) => self.run_suffix(host, idx),
        }
    }

    fn run_suffix(&mut self, host: &mut dyn Host, idx: usize) -> Result<Action> {
        let (prefix, command, transient, inapt, is_infix) = {
            let active = self.active.as_ref().ok_or(MenuError::Inactive)?;
            let s: &Suffix = active
                .instance
                .suffixes
                .get(idx)
                .ok_or_else(|| MenuError::UnknownCommand(format!("suffix {}", idx)))?;
            (
                active.instance.command.clone(),
                s.command.clone(),
                s.transient.clone(),
                s.inapt,
                s.is_infix(),
            )
        };
        if inapt {
            host.notify(&format!("{} is not available here", command));
            self.render(host);
            return Ok(Action::Stay);
        }
        if let Some(CommandKind::Builtin(b)) = self.registry.command_kind(&command) {
            return self.run_builtin(host, b);
        }

        let target_is_prefix = self.registry.is_prefix(&command);
        let fallback = self.registry.prefix(&prefix)?.suffix_behavior.clone();
        let behavior = resolve(
            transient.as_ref(),
            &self.table,
            &command,
            fallback.as_ref(),
            target_is_prefix,
        );
        let behavior = self.concrete(&prefix, &command, behavior, target_is_prefix);
        tracing::debug!(prefix = %prefix, command = %command, behavior = behavior.name(), "suffix");

        if is_infix {
            self.activate_infix(host, idx)?;
            if behavior.stays() {
                return self.after_command(host, &command);
            }
            self.leave(host, &behavior);
            return self.finish(host, &behavior);
        }
        self.run_command(host, &prefix, &command, behavior)
    }

    /// Resolve a registered behavior function to one of the fixed behaviors.
    fn concrete(
        &self,
        prefix: &str,
        command: &str,
        behavior: Behavior,
        target_is_prefix: bool,
    ) -> Behavior {
        let name = match behavior {
            Behavior::Custom(name) => name,
            fixed => return fixed,
        };
        let Some(f) = self.registry.behavior(&name) else {
            tracing::warn!(behavior = %name, command, "unknown behavior, exiting");
            return Behavior::Exit;
        };
        match f(&BehaviorContext {
            prefix,
            command,
            target_is_prefix,
        }) {
            Behavior::Custom(inner) => {
                tracing::warn!(behavior = %name, returned = %inner, "behavior returned another custom behavior, exiting");
                Behavior::Exit
            }
            resolved => resolved,
        }
    }

    fn activate_infix(&mut self, host: &mut dyn Host, idx: usize) -> Result<()> {
        match self.read_infix(host, idx)? {
            ReadOutcome::Set(value) => self.assign_infix(idx, value),
            ReadOutcome::Cancelled => {
                tracing::debug!(idx, "read cancelled");
                Ok(())
            }
        }
    }

    fn read_infix(&mut self, host: &mut dyn Host, idx: usize) -> Result<ReadOutcome> {
        let Session {
            active,
            registry,
            store,
            state,
            ..
        } = self;
        let active = active.as_ref().ok_or(MenuError::Inactive)?;
        let infix = active
            .instance
            .suffixes
            .get(idx)
            .and_then(Suffix::infix)
            .ok_or_else(|| MenuError::UnknownCommand(format!("infix {}", idx)))?;

        let previous = *state;
        *state = State::ReadingInput;
        let mut read = |mut req: ReadRequest| -> Result<Option<String>> {
            req.history = store.history.texts(&req.history_key);
            match req.reader.as_deref().and_then(|name| registry.reader(name)) {
                Some(reader) => reader(&req),
                None => host.read_line(&req),
            }
        };
        let outcome = infix.read_value(&mut read);
        *state = previous;
        outcome
    }

    fn assign_infix(&mut self, idx: usize, value: InfixValue) -> Result<()> {
        let Session {
            active,
            store,
            variables,
            ..
        } = self;
        let inst = &mut active.as_mut().ok_or(MenuError::Inactive)?.instance;

        let history_key = inst.suffixes[idx]
            .infix()
            .and_then(|i| i.history_key())
            .map(str::to_string);
        if let Some(key) = history_key {
            let text = value.to_strings().join(",");
            if !text.is_empty() {
                store.history.push(key, HistoryItem::Text(text));
            }
        }

        let forced = inst.set_infix_value(idx, value)?;
        if !forced.is_empty() {
            tracing::debug!(idx, ?forced, "incompatible infixes unset");
        }
        if let Some(var) = inst.suffixes[idx].variable() {
            match &var.value {
                InfixValue::One(v) => {
                    variables.insert(var.name.clone(), v.clone());
                }
                _ => {
                    variables.remove(&var.name);
                }
            }
        }
        Ok(())
    }

    fn run_command(
        &mut self,
        host: &mut dyn Host,
        prefix: &str,
        command: &str,
        behavior: Behavior,
    ) -> Result<Action> {
        if behavior.stays() {
            let args = if behavior.exports() {
                self.export_value()
            } else {
                Vec::new()
            };
            self.invoke(host, prefix, command, &behavior, &args)?;
            return self.after_command(host, command);
        }

        self.leave(host, &behavior);
        let args = match (&self.export, behavior.exports()) {
            (Some(export), true) => export.args.clone(),
            _ => Vec::new(),
        };
        self.invoke(host, prefix, command, &behavior, &args)?;
        self.finish(host, &behavior)
    }

    fn invoke(
        &mut self,
        host: &mut dyn Host,
        prefix: &str,
        command: &str,
        behavior: &Behavior,
        args: &[Arg],
    ) -> Result<()> {
        match self.registry.command_kind(command) {
            Some(CommandKind::Prefix) => {
                if self.active_prefix() == Some(command) {
                    return Ok(());
                }
                if let Err(e) = self.enter_with(host, command, behavior.pushes()) {
                    // Put the menu that pushed itself for this one back.
                    if behavior.pushes()
                        && self.active.is_none()
                        && let Err(resume) = self.pop_resume(host)
                    {
                        tracing::warn!(error = %resume, "resume after failed entry");
                    }
                    return Err(e);
                }
                Ok(())
            }
            Some(CommandKind::User(f)) => {
                let scope = self
                    .registry
                    .prefix(prefix)
                    .ok()
                    .and_then(|d| d.scope.clone());
                let mut inv = Invocation {
                    prefix,
                    command,
                    args,
                    scope: scope.as_deref(),
                    variables: &mut self.variables,
                    messages: Vec::new(),
                };
                let result = f(&mut inv);
                for msg in std::mem::take(&mut inv.messages) {
                    host.notify(&msg);
                }
                result.map_err(|e| {
                    if e.is_hard() {
                        e
                    } else {
                        MenuError::Command {
                            command: command.to_string(),
                            message: e.to_string(),
                        }
                    }
                })
            }
            Some(CommandKind::Builtin(b)) => self.run_builtin(host, b).map(drop),
            Some(CommandKind::Infix) => Ok(()),
            None => Err(MenuError::UnknownCommand(command.to_string())),
        }
    }

    fn after_command(&mut self, host: &mut dyn Host, command: &str) -> Result<Action> {
        self.export = None;
        let Some(active) = self.active.as_ref() else {
            return Ok(Action::Exit);
        };
        if active.instance.command != command {
            self.render(host);
        }
        Ok(Action::Stay)
    }

    /// Record the live value as the export and in the prefix history.
    fn export_value(&mut self) -> Vec<Arg> {
        let Some(active) = self.active.as_ref() else {
            return Vec::new();
        };
        let inst = &active.instance;
        let args = inst.value();
        if !args.is_empty() {
            self.store
                .history
                .push(inst.history_key.clone(), HistoryItem::Args(args.clone()));
        }
        let export = Export {
            prefix: inst.command.clone(),
            args: args.clone(),
        };
        self.last_export = Some(export.clone());
        self.export = Some(export);
        args
    }

    /// The first half of every non-staying behavior: export, push and tear
    /// down as the behavior asks.
    fn leave(&mut self, host: &mut dyn Host, behavior: &Behavior) {
        if behavior.exports() {
            self.export_value();
        }
        if let Some(active) = self.active.as_ref() {
            if behavior.pushes() {
                self.stack.push(active.capture());
            } else if *behavior == Behavior::Exit && !active.nested {
                // Only a menu entered on top of the stack hands back to it.
                self.stack.clear();
            }
        }
        if *behavior == Behavior::QuitAll {
            self.stack.clear();
        }
        self.teardown(host);
    }

    /// The second half: hand over to a nested menu, a parent, or nobody.
    fn finish(&mut self, host: &mut dyn Host, behavior: &Behavior) -> Result<Action> {
        let export = self.export.take();
        if self.active.is_some() {
            return Ok(Action::Replace);
        }
        if behavior.pushes() {
            self.state = State::Suspended;
            tracing::debug!(depth = self.stack.len(), "suspended");
            return Ok(Action::Suspend);
        }
        if !self.stack.is_empty() {
            return self.pop_resume(host);
        }

        if let Some(hook) = self.exit_hook.clone() {
            hook(export.as_ref());
        }
        self.flush(host);
        self.state = State::Inactive;
        tracing::debug!(behavior = behavior.name(), "exit");
        Ok(Action::Exit)
    }

    fn pop_resume(&mut self, host: &mut dyn Host) -> Result<Action> {
        let Some(entry) = self.stack.pop() else {
            self.state = State::Inactive;
            return Ok(Action::Exit);
        };
        let ctx = self.context(entry.edit_mode);
        let mut inst = PrefixInstance::resume(&ctx, &entry)?;
        self.decorate(&mut inst);
        let keymap = self.keymap_for(&inst)?;
        self.active = Some(Active {
            instance: inst,
            keymap,
            pending: Vec::new(),
            shown: false,
            nested: entry.nested,
        });
        self.state = if entry.edit_mode {
            State::EditMode
        } else {
            State::Active
        };
        self.install(host);
        tracing::debug!(prefix = %entry.command, depth = self.stack.len(), "resume");
        Ok(Action::Resume)
    }

    fn install(&mut self, host: &mut dyn Host) {
        let delay = self.config.show_delay();
        let Some(active) = self.active.as_mut() else {
            return;
        };
        host.install_keymap(&active.keymap);
        if delay.is_zero() {
            active.shown = true;
        } else {
            host.schedule_show(delay);
        }
        self.render(host);
    }

    /// Undo everything `install` did. Does nothing without an active menu.
    fn teardown(&mut self, host: &mut dyn Host) {
        let Some(active) = self.active.take() else {
            return;
        };
        host.cancel_show();
        host.remove_display();
        host.uninstall_keymap();
        self.state = State::Inactive;
        tracing::debug!(prefix = %active.instance.command, "teardown");
    }

    fn emergency(&mut self, host: &mut dyn Host, err: &MenuError) {
        tracing::error!(error = %err, prefix = ?self.active_prefix(), "emergency teardown");
        self.stack.clear();
        self.teardown(host);
        self.export = None;
        self.state = State::Inactive;
        host.notify(&err.to_string());
    }

    fn render(&self, host: &mut dyn Host) {
        if !self.active.as_ref().is_some_and(|a| a.shown) {
            return;
        }
        if let Some(view) = self.view() {
            host.render(&view);
        }
    }

    fn flush(&mut self, host: &mut dyn Host) {
        if self.config.save_history {
            self.persist(host, Store::save_history);
        }
    }

    /// Set value, else saved value, else the definition's initial value.
    fn seed_value(&self, prefix: &str) -> Result<Option<Vec<Arg>>> {
        if let Some(v) = self.set_values.get(prefix) {
            return Ok(Some(v.clone()));
        }
        if let Some(v) = self.store.values.get(prefix) {
            return Ok(Some(v.to_vec()));
        }
        Ok(self.registry.prefix(prefix)?.init_value.clone())
    }

    fn context(&self, edit_mode: bool) -> InstanceContext<'_> {
        InstanceContext {
            registry: &self.registry,
            levels: &self.store.levels,
            variables: &self.variables,
            default_level: self.config.default_level,
            edit_mode,
        }
    }

    fn instantiate(
        &self,
        prefix: &str,
        edit_mode: bool,
        value: Option<&[Arg]>,
    ) -> Result<PrefixInstance> {
        let mut inst = PrefixInstance::instantiate(&self.context(edit_mode), prefix, value)?;
        self.decorate(&mut inst);
        Ok(inst)
    }

    /// Session-level additions to a fresh instance: value history and key
    /// substitution.
    fn decorate(&self, inst: &mut PrefixInstance) {
        let mut history = vec![inst.value()];
        for v in self.store.history.values(&inst.history_key) {
            if !history.contains(&v) {
                history.push(v);
            }
        }
        inst.history = history;
        inst.history_pos = 0;

        if let Some(sub) = &self.key_substitution {
            for s in &mut inst.suffixes {
                if let Some(key) = sub(&s.command, &s.key) {
                    s.key = key;
                }
            }
        }
    }

    fn keymap_for(&self, inst: &PrefixInstance) -> Result<Keymap> {
        Keymap::build(
            &inst.command,
            &inst.suffixes,
            &self.builtin_keys,
            self.config.detect_conflicts,
        )
    }
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
