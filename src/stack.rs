//! Menus waiting for a nested menu or a suspension to end.

use std::rc::Rc;

use crate::instance::PrefixInstance;
use crate::layout::LayoutNode;
use crate::model::{Arg, CommandId};

#[derive(Clone, Debug, PartialEq)]
pub struct StackEntry {
    pub command: CommandId,
    /// The already pruned tree; resuming does not prune again.
    pub tree: Rc<Vec<LayoutNode>>,
    pub level: u8,
    pub edit_mode: bool,
    pub scope: Option<String>,
    pub value: Vec<Arg>,
    /// The menu was itself entered on top of the entry below it.
    pub nested: bool,
}

impl StackEntry {
    pub fn capture(inst: &PrefixInstance) -> Self {
        Self {
            command: inst.command.clone(),
            tree: Rc::clone(&inst.tree),
            level: inst.level,
            edit_mode: inst.edit_mode,
            scope: inst.scope.clone(),
            value: inst.value(),
            nested: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Stack {
    entries: Vec<StackEntry>,
}

impl Stack {
    pub fn push(&mut self, entry: StackEntry) {
        tracing::debug!(prefix = %entry.command, depth = self.entries.len() + 1, "push");
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        let entry = self.entries.pop()?;
        tracing::debug!(prefix = %entry.command, depth = self.entries.len(), "pop");
        Some(entry)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn commands(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.command.as_str()).collect()
    }
}

#[cfg(test)]
#[path = "tests/stack_tests.rs"]
mod tests;
