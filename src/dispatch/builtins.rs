use super::*;

/// Commands every menu binds unless a suffix takes the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    QuitOne,
    QuitAll,
    Suspend,
    Help,
    EditLevels,
    Set,
    Save,
    Reset,
    HistoryPrev,
    HistoryNext,
}

impl Builtin {
    pub const ALL: [Builtin; 10] = [
        Builtin::QuitOne,
        Builtin::QuitAll,
        Builtin::Suspend,
        Builtin::Help,
        Builtin::EditLevels,
        Builtin::Set,
        Builtin::Save,
        Builtin::Reset,
        Builtin::HistoryPrev,
        Builtin::HistoryNext,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::QuitOne => "quit-one",
            Builtin::QuitAll => "quit-all",
            Builtin::Suspend => "suspend",
            Builtin::Help => "help",
            Builtin::EditLevels => "edit-levels",
            Builtin::Set => "set",
            Builtin::Save => "save",
            Builtin::Reset => "reset",
            Builtin::HistoryPrev => "history-prev",
            Builtin::HistoryNext => "history-next",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Builtin::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn default_key(self) -> &'static str {
        match self {
            Builtin::QuitOne => "C-g",
            Builtin::QuitAll => "C-q",
            Builtin::Suspend => "C-z",
            Builtin::Help => "C-h",
            Builtin::EditLevels => "C-x l",
            Builtin::Set => "C-x s",
            Builtin::Save => "C-x C-s",
            Builtin::Reset => "C-x C-k",
            Builtin::HistoryPrev => "M-p",
            Builtin::HistoryNext => "M-n",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Builtin::QuitOne => "Leave this menu; a parent menu comes back",
            Builtin::QuitAll => "Leave every menu",
            Builtin::Suspend => "Put the menu away until it is resumed",
            Builtin::Help => "Describe the command bound to the next key",
            Builtin::EditLevels => "Change which suffixes this menu shows",
            Builtin::Set => "Use the current value for the rest of the session",
            Builtin::Save => "Use the current value from now on",
            Builtin::Reset => "Forget the set and saved value",
            Builtin::HistoryPrev => "Step back to an older value",
            Builtin::HistoryNext => "Step forward to a newer value",
        }
    }

    pub fn behavior(self) -> Behavior {
        match self {
            Builtin::QuitOne => Behavior::QuitOne,
            Builtin::QuitAll => Behavior::QuitAll,
            Builtin::Suspend => Behavior::Suspend,
            _ => Behavior::Stay,
        }
    }

    /// Still runs as itself while levels are being edited.
    pub fn works_in_edit_mode(self) -> bool {
        matches!(
            self,
            Builtin::QuitOne | Builtin::QuitAll | Builtin::Help | Builtin::EditLevels
        )
    }
}

impl Session {
    pub(super) fn run_builtin(&mut self, host: &mut dyn Host, b: Builtin) -> Result<Action> {
        tracing::debug!(builtin = b.name(), "builtin");
        match b {
            Builtin::QuitOne | Builtin::QuitAll | Builtin::Suspend => {
                let behavior = b.behavior();
                self.leave(host, &behavior);
                self.finish(host, &behavior)
            }
            Builtin::Help => {
                self.state = State::HelpMode;
                self.render(host);
                Ok(Action::Stay)
            }
            Builtin::EditLevels => self.toggle_edit(host),
            Builtin::Set => {
                let (prefix, value) = self.live_value(true)?;
                self.set_values.insert(prefix, value);
                host.notify("Value set for this session");
                self.render(host);
                Ok(Action::Stay)
            }
            Builtin::Save => {
                let (prefix, value) = self.live_value(true)?;
                self.set_values.insert(prefix.clone(), value.clone());
                self.store.values.set(prefix, value);
                self.persist(host, Store::save_values);
                host.notify("Value saved");
                self.render(host);
                Ok(Action::Stay)
            }
            Builtin::Reset => {
                let (prefix, _) = self.live_value(false)?;
                self.set_values.remove(&prefix);
                self.store.values.remove(&prefix);
                self.persist(host, Store::save_values);
                let init = self.registry.prefix(&prefix)?.init_value.clone();
                let Session {
                    active, variables, ..
                } = self;
                if let Some(active) = active.as_mut() {
                    active.instance.apply_value(init.as_deref(), variables);
                }
                host.notify("Value reset");
                self.render(host);
                Ok(Action::Stay)
            }
            Builtin::HistoryPrev => self.step_history(host, 1),
            Builtin::HistoryNext => self.step_history(host, -1),
        }
    }

    fn live_value(&self, savable: bool) -> Result<(CommandId, Vec<Arg>)> {
        let active = self.active.as_ref().ok_or(MenuError::Inactive)?;
        let inst = &active.instance;
        let value = if savable {
            inst.savable_value()
        } else {
            inst.value()
        };
        Ok((inst.command.clone(), value))
    }

    /// Write one store file; a failure is reported, not raised.
    pub(super) fn persist(&mut self, host: &mut dyn Host, save: fn(&mut Store) -> Result<()>) {
        if let Err(e) = save(&mut self.store) {
            tracing::warn!(error = %e, "store write failed");
            host.notify(&e.to_string());
        }
    }

    fn step_history(&mut self, host: &mut dyn Host, delta: isize) -> Result<Action> {
        let Session {
            active, variables, ..
        } = self;
        let inst = &mut active.as_mut().ok_or(MenuError::Inactive)?.instance;
        let next = inst.history_pos.checked_add_signed(delta);
        match next.and_then(|n| inst.history.get(n).cloned().map(|v| (n, v))) {
            Some((n, value)) => {
                inst.history_pos = n;
                inst.apply_value(Some(&value), variables);
            }
            None if delta > 0 => host.notify("No older value"),
            None => host.notify("No newer value"),
        }
        self.render(host);
        Ok(Action::Stay)
    }

    fn toggle_edit(&mut self, host: &mut dyn Host) -> Result<Action> {
        if self.state != State::EditMode {
            return self.rebuild(host, true);
        }

        let (prefix, level) = {
            let active = self.active.as_ref().ok_or(MenuError::Inactive)?;
            (active.instance.command.clone(), active.instance.level)
        };
        let req = ReadRequest {
            prompt: format!("Set level for {}: ", prefix),
            initial: Some(level.to_string()),
            history_key: LEVEL_HISTORY.to_string(),
            ..ReadRequest::default()
        };
        if let Some(level) = self.read_level(host, &req)? {
            self.store.levels.set_prefix_level(&prefix, level.max(MIN_LEVEL))?;
            self.persist(host, Store::save_levels);
        }
        self.rebuild(host, false)
    }

    /// Redirect of any suffix key while levels are being edited.
    pub(super) fn edit_level(&mut self, host: &mut dyn Host, binding: &Binding) -> Result<Action> {
        let Target::Suffix(idx) = binding.target else {
            host.notify("Built-in commands have no level");
            self.render(host);
            return Ok(Action::Stay);
        };
        let (prefix, command, level) = {
            let active = self.active.as_ref().ok_or(MenuError::Inactive)?;
            let s = active
                .instance
                .suffixes
                .get(idx)
                .ok_or_else(|| MenuError::UnknownCommand(binding.command.clone()))?;
            (active.instance.command.clone(), s.command.clone(), s.level)
        };
        let req = ReadRequest {
            prompt: format!("Set level for {}: ", command),
            initial: Some(level.to_string()),
            history_key: LEVEL_HISTORY.to_string(),
            ..ReadRequest::default()
        };
        match self.read_level(host, &req)? {
            Some(level) => {
                self.store.levels.set_suffix_level(&prefix, &command, level)?;
                self.persist(host, Store::save_levels);
                tracing::debug!(prefix = %prefix, command = %command, level, "suffix level");
                self.rebuild(host, true)
            }
            None => {
                self.render(host);
                Ok(Action::Stay)
            }
        }
    }

    /// `None` on cancel, empty input or a level out of range.
    fn read_level(&mut self, host: &mut dyn Host, req: &ReadRequest) -> Result<Option<u8>> {
        let previous = self.state;
        self.state = State::ReadingInput;
        let input = host.read_line(req);
        self.state = previous;
        let Some(input) = input? else {
            return Ok(None);
        };
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        match input.parse::<u8>() {
            Ok(level) if level <= MAX_LEVEL => Ok(Some(level)),
            _ => {
                host.notify(&format!("Level must be between 0 and {}", MAX_LEVEL));
                Ok(None)
            }
        }
    }

    /// Re-instantiate the active menu, keeping its current value.
    fn rebuild(&mut self, host: &mut dyn Host, edit_mode: bool) -> Result<Action> {
        let (prefix, value) = self.live_value(false)?;
        let inst = self.instantiate(&prefix, edit_mode, Some(&value))?;
        let keymap = self.keymap_for(&inst)?;
        host.uninstall_keymap();
        host.install_keymap(&keymap);
        if let Some(active) = self.active.as_mut() {
            active.instance = inst;
            active.keymap = keymap;
            active.pending.clear();
        }
        self.state = if edit_mode {
            State::EditMode
        } else {
            State::Active
        };
        self.render(host);
        Ok(Action::Stay)
    }

    /// Help mode: describe the command the key would have run.
    pub(super) fn help_for(&mut self, host: &mut dyn Host, binding: &Binding) -> Result<Action> {
        self.state = State::Active;
        let active = self.active.as_ref().ok_or(MenuError::Inactive)?;
        let inst = &active.instance;
        let def = self.registry.prefix(&inst.command)?;
        let mut req = HelpRequest {
            prefix: inst.command.clone(),
            man_page: def.man_page.clone(),
            info_manual: def.info_manual.clone(),
            ..HelpRequest::default()
        };

        match binding.target {
            Target::Builtin(b @ (Builtin::QuitOne | Builtin::QuitAll)) => {
                return self.run_builtin(host, b);
            }
            Target::Builtin(Builtin::Help) => {
                req.description = inst.description.clone();
            }
            Target::Builtin(b) => {
                req.command = Some(b.name().to_string());
                req.key = Some(binding.keys.to_string());
                req.summary = Some(b.summary().to_string());
            }
            Target::Suffix(idx) => {
                let s = inst
                    .suffixes
                    .get(idx)
                    .ok_or_else(|| MenuError::UnknownCommand(binding.command.clone()))?;
                req.command = Some(s.command.clone());
                req.key = Some(s.key.clone());
                req.description = Some(inst.describe(&self.registry, s));
                req.summary = self
                    .registry
                    .doc(&s.command)
                    .map(str::to_string)
                    .or_else(|| s.infix().and_then(|i| i.identity()));
            }
        }
        host.show_help(&req);
        self.render(host);
        Ok(Action::Stay)
    }
}

const LEVEL_HISTORY: &str = "level";
