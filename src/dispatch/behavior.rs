use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{MenuError, Result};
use crate::literal::Lit;
use crate::model::{CommandId, TransientOverride};

use super::builtins::Builtin;

/// What happens to the menu around a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Behavior {
    /// Run the command, keep the menu.
    Stay,
    /// Export the value, run the command, keep the menu.
    Call,
    /// Export the value, tear the menu down, run the command.
    Exit,
    /// Like `Exit`, but always hands control back to a suspended parent.
    Return,
    /// Push this menu and let the invoked nested prefix take over.
    Replace,
    /// Push this menu and tear it down without exporting.
    Suspend,
    /// Leave this menu without exporting; a parent resumes.
    QuitOne,
    /// Leave every menu, clearing the stack.
    QuitAll,
    /// A registered behavior function, resolved at dispatch time.
    Custom(String),
}

impl Behavior {
    pub fn parse(name: &str) -> Self {
        match name {
            "stay" => Behavior::Stay,
            "call" => Behavior::Call,
            "exit" => Behavior::Exit,
            "return" => Behavior::Return,
            "replace" => Behavior::Replace,
            "suspend" => Behavior::Suspend,
            "quit-one" => Behavior::QuitOne,
            "quit-all" => Behavior::QuitAll,
            other => Behavior::Custom(other.to_string()),
        }
    }

    /// `t`, `nil` or a behavior name, as written after `:transient-suffix`.
    pub fn from_lit(lit: &Lit) -> Result<Self> {
        match lit {
            Lit::Bool(true) => Ok(Behavior::Stay),
            Lit::Bool(false) => Ok(Behavior::Exit),
            Lit::Sym(s) | Lit::Str(s) => Ok(Behavior::parse(s)),
            other => Err(MenuError::definition(format!(
                "expected t, nil or a behavior name, got `{}`",
                other
            ))),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Behavior::Stay => "stay",
            Behavior::Call => "call",
            Behavior::Exit => "exit",
            Behavior::Return => "return",
            Behavior::Replace => "replace",
            Behavior::Suspend => "suspend",
            Behavior::QuitOne => "quit-one",
            Behavior::QuitAll => "quit-all",
            Behavior::Custom(name) => name,
        }
    }

    /// The menu survives the command.
    pub fn stays(&self) -> bool {
        matches!(self, Behavior::Stay | Behavior::Call)
    }

    pub fn exports(&self) -> bool {
        matches!(
            self,
            Behavior::Call | Behavior::Exit | Behavior::Return | Behavior::Replace
        )
    }

    /// The current menu goes onto the stack rather than away.
    pub fn pushes(&self) -> bool {
        matches!(self, Behavior::Replace | Behavior::Suspend)
    }
}

pub struct BehaviorContext<'a> {
    pub prefix: &'a str,
    pub command: &'a str,
    pub target_is_prefix: bool,
}

pub type BehaviorFn = Rc<dyn Fn(&BehaviorContext<'_>) -> Behavior>;

/// Behaviors keyed by command, consulted when a suffix has no `:transient`.
#[derive(Clone, Debug, Default)]
pub struct PredicateTable {
    entries: BTreeMap<CommandId, Behavior>,
}

impl PredicateTable {
    /// The built-in commands plus configured `command -> behavior` entries.
    pub fn new(configured: &BTreeMap<CommandId, String>) -> Self {
        let mut entries = Builtin::ALL
            .iter()
            .map(|b| (b.name().to_string(), b.behavior()))
            .collect::<BTreeMap<_, _>>();
        for (command, behavior) in configured {
            entries.insert(command.clone(), Behavior::parse(behavior));
        }
        Self { entries }
    }

    pub fn get(&self, command: &str) -> Option<&Behavior> {
        self.entries.get(command)
    }

    pub fn insert(&mut self, command: impl Into<CommandId>, behavior: Behavior) {
        self.entries.insert(command.into(), behavior);
    }
}

/// Pick the behavior for a command about to run from a menu.
///
/// Order: the suffix's own `:transient`, then the predicate table, then the
/// definition's fallback, then `Exit`. A nested prefix with no explicit
/// choice replaces the current menu.
pub fn resolve(
    transient: Option<&TransientOverride>,
    table: &PredicateTable,
    command: &str,
    fallback: Option<&Behavior>,
    target_is_prefix: bool,
) -> Behavior {
    match transient {
        Some(TransientOverride::Bool(true)) if target_is_prefix => return Behavior::Replace,
        Some(TransientOverride::Bool(true)) => return Behavior::Stay,
        Some(TransientOverride::Bool(false)) => return Behavior::Exit,
        Some(TransientOverride::Named(name)) => return Behavior::parse(name),
        None => {}
    }
    if let Some(b) = table.get(command) {
        return b.clone();
    }
    if target_is_prefix {
        return Behavior::Replace;
    }
    fallback.cloned().unwrap_or(Behavior::Exit)
}

#[cfg(test)]
#[path = "../tests/dispatch/behavior_tests.rs"]
mod tests;
