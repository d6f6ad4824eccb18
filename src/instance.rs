//! Turning a definition into the live menu of one invocation.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{MenuError, Result};
use crate::incompat::Resolver;
use crate::layout::{Group, LayoutNode, SuffixSpec, collect_suffixes, merge_command_spec};
use crate::model::{Arg, CommandId, Description, MAX_LEVEL, MIN_LEVEL, Predicates, format_args_line};
use crate::object::{InfixValue, InitContext, Suffix};
use crate::registry::{PredicateContext, Registry};
use crate::render::{Face, GroupView, MenuView, ModeBanner, Row, Segment};
use crate::stack::StackEntry;
use crate::store::LevelStore;

/// What instantiation reads but never changes.
pub struct InstanceContext<'a> {
    pub registry: &'a Registry,
    pub levels: &'a LevelStore,
    pub variables: &'a BTreeMap<String, String>,
    /// Level of prefixes that declare none.
    pub default_level: u8,
    pub edit_mode: bool,
}

#[derive(Clone, Debug)]
pub struct PrefixInstance {
    pub command: CommandId,
    pub description: Option<String>,
    pub level: u8,
    pub scope: Option<String>,
    pub edit_mode: bool,
    pub history_key: String,
    /// Values to step through with history navigation; the first entry is the
    /// value the menu started with.
    pub history: Vec<Vec<Arg>>,
    pub history_pos: usize,
    pub incompatible: Vec<Vec<String>>,
    /// The pruned tree; rendering walks it alongside `suffixes`.
    pub tree: Rc<Vec<LayoutNode>>,
    /// Live suffixes in tree pre-order.
    pub suffixes: Vec<Suffix>,
}

struct Walk<'a, 'c> {
    ctx: &'a InstanceContext<'c>,
    prefix: &'a str,
    level: u8,
    pred: PredicateContext<'a>,
}

impl Walk<'_, '_> {
    fn visible(&self, level: u8) -> bool {
        // Edit mode shows every suffix so its level can be changed.
        self.ctx.edit_mode || (level >= MIN_LEVEL && level <= self.level)
    }

    fn holds(&self, p: &Predicates) -> bool {
        let registry = self.ctx.registry;
        p.if_
            .as_deref()
            .is_none_or(|name| registry.eval_predicate(name, &self.pred))
            && p
                .if_not
                .as_deref()
                .is_none_or(|name| !registry.eval_predicate(name, &self.pred))
    }

    fn prune(&self, nodes: &[LayoutNode], inherited: u8, inapt_if: Option<&str>) -> Vec<LayoutNode> {
        let mut out = Vec::new();
        for node in nodes {
            match node {
                LayoutNode::Group(g) => {
                    if g.level.is_some_and(|l| !self.visible(l)) || !self.holds(&g.predicates) {
                        continue;
                    }
                    let children = self.prune(
                        &g.children,
                        g.level.unwrap_or(inherited),
                        g.predicates.inapt_if.as_deref().or(inapt_if),
                    );
                    if children.is_empty() {
                        continue;
                    }
                    out.push(LayoutNode::Group(Group {
                        children,
                        ..g.clone()
                    }));
                }
                LayoutNode::Suffix(s) => {
                    let mut spec = match self.ctx.registry.suffix_spec(&s.command) {
                        Some(base) if s.argument.is_none() && !s.class.is_infix() => {
                            merge_command_spec(base, s)
                        }
                        _ => s.clone(),
                    };
                    let level = self
                        .ctx
                        .levels
                        .suffix_level(self.prefix, &spec.command)
                        .or(spec.level)
                        .unwrap_or(inherited);
                    if !self.visible(level) || !self.holds(&spec.predicates) {
                        continue;
                    }
                    spec.level = Some(level);
                    if spec.predicates.inapt_if.is_none() {
                        spec.predicates.inapt_if = inapt_if.map(str::to_string);
                    }
                    out.push(LayoutNode::Suffix(spec));
                }
                LayoutNode::Text(t) => {
                    if self.visible(t.level.unwrap_or(inherited)) {
                        out.push(node.clone());
                    }
                }
            }
        }
        out
    }
}

impl PrefixInstance {
    /// A fresh instance of `prefix` seeded with `value`; `None` lets every
    /// infix fall back to its own default.
    pub fn instantiate(
        ctx: &InstanceContext<'_>,
        prefix: &str,
        value: Option<&[Arg]>,
    ) -> Result<Self> {
        let def = ctx.registry.prefix(prefix)?;
        let level = ctx
            .levels
            .prefix_level(prefix)
            .or(def.default_level)
            .unwrap_or(ctx.default_level)
            .clamp(MIN_LEVEL, MAX_LEVEL);

        let layout = def.layout();
        let walk = Walk {
            ctx,
            prefix,
            level,
            pred: PredicateContext {
                prefix,
                value: value.unwrap_or_default(),
                scope: def.scope.as_deref(),
                variables: ctx.variables,
            },
        };
        let tree = Rc::new(walk.prune(&layout, MIN_LEVEL, None));

        let mut inst = Self {
            command: prefix.to_string(),
            description: def.description.clone(),
            level,
            scope: def.scope.clone(),
            edit_mode: ctx.edit_mode,
            history_key: def.history_key().to_string(),
            history: Vec::new(),
            history_pos: 0,
            incompatible: def.incompatible.clone(),
            tree,
            suffixes: Vec::new(),
        };
        inst.build_suffixes(ctx, value)?;
        tracing::debug!(
            prefix,
            level,
            suffixes = inst.suffixes.len(),
            "instantiated"
        );
        Ok(inst)
    }

    /// Rebuild a suspended instance from its saved tree without pruning it
    /// again.
    pub fn resume(ctx: &InstanceContext<'_>, entry: &StackEntry) -> Result<Self> {
        let def = ctx.registry.prefix(&entry.command)?;
        let mut inst = Self {
            command: entry.command.clone(),
            description: def.description.clone(),
            level: entry.level,
            scope: entry.scope.clone(),
            edit_mode: entry.edit_mode,
            history_key: def.history_key().to_string(),
            history: Vec::new(),
            history_pos: 0,
            incompatible: def.incompatible.clone(),
            tree: Rc::clone(&entry.tree),
            suffixes: Vec::new(),
        };
        inst.build_suffixes(ctx, Some(&entry.value))?;
        Ok(inst)
    }

    fn build_suffixes(&mut self, ctx: &InstanceContext<'_>, value: Option<&[Arg]>) -> Result<()> {
        let mut specs: Vec<&SuffixSpec> = Vec::new();
        collect_suffixes(&self.tree, &mut specs);

        let pred = PredicateContext {
            prefix: &self.command,
            value: value.unwrap_or_default(),
            scope: self.scope.as_deref(),
            variables: ctx.variables,
        };
        let mut suffixes = Vec::with_capacity(specs.len());
        for spec in specs {
            let proto = ctx.registry.prototype(spec.class);
            let level = spec.level.unwrap_or(MIN_LEVEL);
            let mut suffix = Suffix::from_spec(spec, &proto, level)?;
            suffix.inapt = spec
                .predicates
                .inapt_if
                .as_deref()
                .is_some_and(|name| ctx.registry.eval_predicate(name, &pred));
            suffixes.push(suffix);
        }
        self.suffixes = suffixes;
        self.apply_value(value, ctx.variables);
        Ok(())
    }

    /// Re-seed every infix from `value`.
    pub fn apply_value(&mut self, value: Option<&[Arg]>, variables: &BTreeMap<String, String>) {
        let init = InitContext { value, variables };
        for s in &mut self.suffixes {
            if let Some(infix) = s.infix_mut() {
                infix.init_value(&init);
            }
        }
    }

    /// The exported value: each live infix's contribution, unset ones dropped.
    pub fn value(&self) -> Vec<Arg> {
        let mut out = Vec::new();
        for s in &self.suffixes {
            if let Some(infix) = s.infix() {
                infix.contribute(&mut out);
            }
        }
        out
    }

    /// Values that may be saved; unsavable infixes are left out.
    pub fn savable_value(&self) -> Vec<Arg> {
        let mut out = Vec::new();
        for s in &self.suffixes {
            if let Some(infix) = s.infix().filter(|i| !i.unsavable()) {
                infix.contribute(&mut out);
            }
        }
        out
    }

    /// Set an infix and unset whatever it is incompatible with. Returns the
    /// indices that were forced off.
    pub fn set_infix_value(&mut self, idx: usize, value: InfixValue) -> Result<Vec<usize>> {
        if self.suffixes.get(idx).is_none_or(|s| !s.is_infix()) {
            return Err(MenuError::UnknownCommand(format!(
                "{}: suffix {} is not an infix",
                self.command, idx
            )));
        }
        let mut resolver = Resolver::new(&self.incompatible);
        Ok(resolver.set(&mut self.suffixes, idx, value))
    }

    pub fn position(&self, command: &str) -> Option<usize> {
        self.suffixes.iter().position(|s| s.command == command)
    }

    pub fn suffix(&self, command: &str) -> Option<&Suffix> {
        self.suffixes.iter().find(|s| s.command == command)
    }

    pub fn commands(&self) -> Vec<&str> {
        self.suffixes.iter().map(|s| s.command.as_str()).collect()
    }

    pub fn describe(&self, registry: &Registry, suffix: &Suffix) -> String {
        match &suffix.description {
            Some(Description::Text(t)) => t.clone(),
            Some(Description::Dynamic(name)) => registry
                .describe(name, &self.value())
                .unwrap_or_else(|| suffix.command.clone()),
            None => suffix.command.clone(),
        }
    }

    pub fn view(
        &self,
        registry: &Registry,
        banner: Option<ModeBanner>,
        pending: Option<String>,
        reachable: Vec<String>,
    ) -> MenuView {
        let value = self.value();
        let mut cursor = 0;
        let groups = self
            .tree
            .iter()
            .filter_map(LayoutNode::as_group)
            .map(|g| self.group_view(registry, g, &value, &mut cursor))
            .collect();
        MenuView {
            title: self
                .description
                .clone()
                .unwrap_or_else(|| self.command.clone()),
            level: self.level,
            groups,
            banner,
            pending,
            reachable,
            value_line: format_args_line(&value),
        }
    }

    fn group_view(
        &self,
        registry: &Registry,
        g: &Group,
        value: &[Arg],
        cursor: &mut usize,
    ) -> GroupView {
        let heading = match (&g.description, g.hide) {
            (_, true) | (None, _) => None,
            (Some(Description::Text(t)), _) => Some(t.clone()),
            (Some(Description::Dynamic(name)), _) => registry.describe(name, value),
        };

        let mut rows: Vec<Row> = Vec::new();
        let mut children = Vec::new();
        for child in &g.children {
            match child {
                LayoutNode::Group(sub) => {
                    children.push(self.group_view(registry, sub, value, cursor))
                }
                LayoutNode::Suffix(_) => {
                    if let Some(s) = self.suffixes.get(*cursor) {
                        rows.push(s.format_row(&self.describe(registry, s), self.edit_mode));
                    }
                    *cursor += 1;
                }
                LayoutNode::Text(t) => rows.push(vec![Segment::plain(t.text.clone())]),
            }
        }

        if g.pad_keys {
            pad_keys(&mut rows);
        }
        GroupView {
            heading,
            class: g.class,
            rows,
            children,
        }
    }
}

fn pad_keys(rows: &mut [Row]) {
    let width = rows
        .iter()
        .filter_map(|r| r.iter().find(|s| s.face == Face::Key))
        .map(|s| s.text.chars().count())
        .max()
        .unwrap_or(0);
    for row in rows {
        if let Some(key) = row.iter_mut().find(|s| s.face == Face::Key) {
            let pad = width - key.text.chars().count();
            key.text.extend(std::iter::repeat_n(' ', pad));
        }
    }
}

#[cfg(test)]
#[path = "tests/instance_tests.rs"]
mod tests;
