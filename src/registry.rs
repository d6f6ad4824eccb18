//! Everything a menu refers to by name: prefix definitions, commands,
//! predicates, readers, behaviors, dynamic descriptions and class
//! prototypes.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use crate::dispatch::{Behavior, BehaviorContext, BehaviorFn, Builtin};
use crate::error::{MenuError, Result};
use crate::host::ReadRequest;
use crate::layout::{
    self, LayoutNode, Locator, SuffixSpec, collect_suffixes, compile_command_spec, compile_group,
    compile_layout, compile_suffix,
};
use crate::literal::{self, Lit};
use crate::model::{Arg, CommandId, SuffixClass};
use crate::object::Prototype;

/// Arguments handed to a user command.
pub struct Invocation<'a> {
    pub prefix: &'a str,
    pub command: &'a str,
    /// The value the menu exported; empty when the behavior does not export.
    pub args: &'a [Arg],
    pub scope: Option<&'a str>,
    pub variables: &'a mut BTreeMap<String, String>,
    pub(crate) messages: Vec<String>,
}

impl Invocation<'_> {
    /// Queue a message for the host.
    pub fn message(&mut self, msg: impl Into<String>) {
        self.messages.push(msg.into());
    }
}

pub struct PredicateContext<'a> {
    pub prefix: &'a str,
    pub value: &'a [Arg],
    pub scope: Option<&'a str>,
    pub variables: &'a BTreeMap<String, String>,
}

pub type CommandFn = Rc<dyn Fn(&mut Invocation<'_>) -> Result<()>>;
pub type PredicateFn = Rc<dyn Fn(&PredicateContext<'_>) -> bool>;
pub type ReaderFn = Rc<dyn Fn(&ReadRequest) -> Result<Option<String>>>;
pub type DescriptionFn = Rc<dyn Fn(&[Arg]) -> String>;

#[derive(Clone)]
pub enum CommandKind {
    Prefix,
    Builtin(Builtin),
    User(CommandFn),
    /// Named by an infix; activating it reads a value instead of running.
    Infix,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrefixDefinition {
    pub command: CommandId,
    pub description: Option<String>,
    pub default_level: Option<u8>,
    pub man_page: Option<String>,
    pub info_manual: Option<String>,
    /// Groups of mutually exclusive arguments.
    pub incompatible: Vec<Vec<String>>,
    /// Used by suffixes that do not pick a behavior themselves.
    pub suffix_behavior: Option<Behavior>,
    /// Applied to keys the menu does not bind; they pass through to the host.
    pub non_suffix_behavior: Option<Behavior>,
    pub init_value: Option<Vec<Arg>>,
    pub scope: Option<String>,
    pub history_key: Option<String>,
    layout: Rc<Vec<LayoutNode>>,
}

impl PrefixDefinition {
    pub fn new(command: impl Into<CommandId>, layout: Vec<LayoutNode>) -> Self {
        Self {
            command: command.into(),
            description: None,
            default_level: None,
            man_page: None,
            info_manual: None,
            incompatible: Vec::new(),
            suffix_behavior: None,
            non_suffix_behavior: None,
            init_value: None,
            scope: None,
            history_key: None,
            layout: Rc::new(layout),
        }
    }

    /// The compiled tree. The same `Rc` comes back until the next edit.
    pub fn layout(&self) -> Rc<Vec<LayoutNode>> {
        Rc::clone(&self.layout)
    }

    pub fn history_key(&self) -> &str {
        self.history_key.as_deref().unwrap_or(&self.command)
    }

    fn set_slot(&mut self, key: &str, value: &Lit) -> Result<()> {
        let command = self.command.clone();
        let name = || {
            value.as_name().map(str::to_string).ok_or_else(|| {
                MenuError::definition(format!(
                    "{}: :{} expects a string or symbol, got `{}`",
                    command, key, value
                ))
            })
        };
        match key {
            "man" | "man-page" => self.man_page = Some(name()?),
            "info" | "info-manual" => self.info_manual = Some(name()?),
            "scope" => self.scope = Some(name()?),
            "history-key" => self.history_key = Some(name()?),
            "description" => self.description = Some(name()?),
            "level" => self.default_level = Some(layout::parse_level(value)?),
            "transient-suffix" => self.suffix_behavior = Some(Behavior::from_lit(value)?),
            "transient-non-suffix" => {
                self.non_suffix_behavior = Some(Behavior::from_lit(value)?)
            }
            "incompatible" => {
                let groups = value.items().ok_or_else(|| {
                    MenuError::definition(format!(
                        "{}: :incompatible expects a list of argument lists",
                        self.command
                    ))
                })?;
                self.incompatible = groups
                    .iter()
                    .map(|g| {
                        g.string_list().filter(|l| l.len() > 1).ok_or_else(|| {
                            MenuError::definition(format!(
                                "{}: incompatible group `{}` needs two or more arguments",
                                command, g
                            ))
                        })
                    })
                    .collect::<Result<_>>()?;
            }
            "init-value" => {
                let args = value.string_list().ok_or_else(|| {
                    MenuError::definition(format!(
                        "{}: :init-value expects a list of arguments",
                        self.command
                    ))
                })?;
                self.init_value = Some(args.into_iter().map(Arg::Str).collect());
            }
            _ => {
                return Err(MenuError::definition(format!(
                    "{}: unknown prefix property :{}",
                    self.command, key
                )));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct Registry {
    prefixes: BTreeMap<CommandId, PrefixDefinition>,
    commands: BTreeMap<CommandId, CommandFn>,
    docs: BTreeMap<CommandId, String>,
    suffix_specs: BTreeMap<CommandId, SuffixSpec>,
    anonymous: BTreeSet<CommandId>,
    predicates: BTreeMap<String, PredicateFn>,
    behaviors: BTreeMap<String, BehaviorFn>,
    readers: BTreeMap<String, ReaderFn>,
    descriptions: BTreeMap<String, DescriptionFn>,
    prototypes: HashMap<SuffixClass, Prototype>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_prefix(&mut self, def: PrefixDefinition) {
        tracing::debug!(prefix = %def.command, groups = def.layout.len(), "define prefix");
        self.prefixes.insert(def.command.clone(), def);
        self.refresh_anonymous();
    }

    pub fn define_command<F>(&mut self, name: impl Into<CommandId>, f: F)
    where
        F: Fn(&mut Invocation<'_>) -> Result<()> + 'static,
    {
        self.commands.insert(name.into(), Rc::new(f));
    }

    /// One-line summary shown by help mode.
    pub fn document(&mut self, command: impl Into<CommandId>, doc: impl Into<String>) {
        self.docs.insert(command.into(), doc.into());
    }

    /// A suffix defined under its own command name; layouts that bind the
    /// command inherit its class and arguments.
    pub fn define_suffix(&mut self, spec: SuffixSpec) {
        self.suffix_specs.insert(spec.command.clone(), spec);
    }

    pub fn define_predicate<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&PredicateContext<'_>) -> bool + 'static,
    {
        self.predicates.insert(name.into(), Rc::new(f));
    }

    pub fn define_behavior<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&BehaviorContext<'_>) -> Behavior + 'static,
    {
        self.behaviors.insert(name.into(), Rc::new(f));
    }

    pub fn define_reader<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&ReadRequest) -> Result<Option<String>> + 'static,
    {
        self.readers.insert(name.into(), Rc::new(f));
    }

    pub fn define_description<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Arg]) -> String + 'static,
    {
        self.descriptions.insert(name.into(), Rc::new(f));
    }

    /// Replace the defaults every instance of `proto.class` starts from.
    pub fn set_prototype(&mut self, proto: Prototype) {
        self.prototypes.insert(proto.class, proto);
    }

    pub fn prototype(&self, class: SuffixClass) -> Prototype {
        self.prototypes
            .get(&class)
            .cloned()
            .unwrap_or_else(|| Prototype::for_class(class))
    }

    pub fn prefix(&self, command: &str) -> Result<&PrefixDefinition> {
        self.prefixes
            .get(command)
            .ok_or_else(|| MenuError::UnknownPrefix(command.to_string()))
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &PrefixDefinition> {
        self.prefixes.values()
    }

    pub fn is_prefix(&self, command: &str) -> bool {
        self.prefixes.contains_key(command)
    }

    pub fn layout(&self, prefix: &str) -> Result<Rc<Vec<LayoutNode>>> {
        Ok(self.prefix(prefix)?.layout())
    }

    pub fn command_kind(&self, command: &str) -> Option<CommandKind> {
        if self.prefixes.contains_key(command) {
            return Some(CommandKind::Prefix);
        }
        if let Some(f) = self.commands.get(command) {
            return Some(CommandKind::User(Rc::clone(f)));
        }
        if self.anonymous.contains(command)
            || self
                .suffix_specs
                .get(command)
                .is_some_and(|s| s.class.is_infix())
        {
            return Some(CommandKind::Infix);
        }
        Builtin::from_name(command).map(CommandKind::Builtin)
    }

    pub fn doc(&self, command: &str) -> Option<&str> {
        self.docs.get(command).map(String::as_str)
    }

    pub fn suffix_spec(&self, command: &str) -> Option<&SuffixSpec> {
        self.suffix_specs.get(command)
    }

    pub fn is_anonymous(&self, command: &str) -> bool {
        self.anonymous.contains(command)
    }

    /// Command names worth offering for completion; anonymous infix
    /// stand-ins are left out.
    pub fn completable_commands(&self) -> Vec<CommandId> {
        let mut out = self
            .prefixes
            .keys()
            .chain(self.commands.keys())
            .chain(self.suffix_specs.keys())
            .cloned()
            .collect::<BTreeSet<_>>();
        out.extend(Builtin::ALL.iter().map(|b| b.name().to_string()));
        out.into_iter().filter(|c| !self.is_anonymous(c)).collect()
    }

    /// Unknown predicates are false.
    pub fn eval_predicate(&self, name: &str, ctx: &PredicateContext<'_>) -> bool {
        match self.predicates.get(name) {
            Some(f) => f(ctx),
            None => {
                tracing::warn!(predicate = name, prefix = ctx.prefix, "unknown predicate");
                false
            }
        }
    }

    pub fn behavior(&self, name: &str) -> Option<BehaviorFn> {
        self.behaviors.get(name).cloned()
    }

    pub fn reader(&self, name: &str) -> Option<ReaderFn> {
        self.readers.get(name).cloned()
    }

    pub fn describe(&self, name: &str, value: &[Arg]) -> Option<String> {
        self.descriptions.get(name).map(|f| f(value))
    }

    pub fn insert_before(&mut self, prefix: &str, loc: &Locator, node: LayoutNode) -> Result<()> {
        self.edit(prefix, |p, tree| layout::insert_before(p, tree, loc, node))
    }

    pub fn insert_after(&mut self, prefix: &str, loc: &Locator, node: LayoutNode) -> Result<()> {
        self.edit(prefix, |p, tree| layout::insert_after(p, tree, loc, node))
    }

    pub fn replace(
        &mut self,
        prefix: &str,
        loc: &Locator,
        node: LayoutNode,
    ) -> Result<LayoutNode> {
        self.edit(prefix, |p, tree| layout::replace(p, tree, loc, node))
    }

    pub fn remove(&mut self, prefix: &str, loc: &Locator) -> Result<LayoutNode> {
        self.edit(prefix, |_, tree| layout::remove(tree, loc))
    }

    pub fn get(&self, prefix: &str, loc: &Locator) -> Result<LayoutNode> {
        let def = self.prefix(prefix)?;
        layout::get_node(&def.layout, loc)
            .cloned()
            .ok_or_else(|| MenuError::Locator(format!("{} in {}", loc, prefix)))
    }

    pub fn set_property(
        &mut self,
        prefix: &str,
        loc: &Locator,
        key: &str,
        value: &Lit,
    ) -> Result<()> {
        self.edit(prefix, |_, tree| layout::set_property(tree, loc, key, value))
    }

    /// Apply an edit to a copy of the tree and install the copy only if the
    /// edit succeeded.
    fn edit<T>(
        &mut self,
        prefix: &str,
        f: impl FnOnce(&str, &mut Vec<LayoutNode>) -> Result<T>,
    ) -> Result<T> {
        let def = self
            .prefixes
            .get_mut(prefix)
            .ok_or_else(|| MenuError::UnknownPrefix(prefix.to_string()))?;
        let mut tree = (*def.layout).clone();
        let out = f(prefix, &mut tree)?;
        def.layout = Rc::new(tree);
        tracing::debug!(prefix, "layout edited");
        self.refresh_anonymous();
        Ok(out)
    }

    fn refresh_anonymous(&mut self) {
        let mut found = BTreeSet::new();
        for def in self.prefixes.values() {
            let mut specs = Vec::new();
            collect_suffixes(&def.layout, &mut specs);
            found.extend(
                specs
                    .into_iter()
                    .filter(|s| s.anonymous)
                    .map(|s| s.command.clone()),
            );
        }
        self.anonymous = found;
    }

    /// Read a menu file and apply its forms in order. Returns the prefixes
    /// it defined.
    ///
    /// Forms: `define-prefix`, `define-suffix` (alias `define-infix`),
    /// `insert-before`, `insert-after`, `replace`, `remove`,
    /// `set-property`.
    pub fn load_menus(&mut self, src: &str) -> Result<Vec<CommandId>> {
        let mut defined = Vec::new();
        for form in literal::parse(src)? {
            let Lit::List(items) = &form else {
                return Err(MenuError::definition(format!(
                    "expected a top-level form, got {} `{}`",
                    form.kind_name(),
                    form
                )));
            };
            let (head, rest) = items
                .split_first()
                .ok_or_else(|| MenuError::definition("empty top-level form"))?;
            let head = head.as_sym().ok_or_else(|| {
                MenuError::definition(format!("form must start with a symbol, got `{}`", head))
            })?;
            match head {
                "define-prefix" => defined.push(self.load_prefix(rest)?),
                "define-suffix" | "define-infix" => {
                    let (name, kws) = split_name(head, rest)?;
                    self.define_suffix(compile_command_spec(name, kws)?);
                }
                "insert-before" | "insert-after" | "replace" => {
                    let [prefix, loc, node] = rest else {
                        return Err(MenuError::definition(format!(
                            "({} PREFIX LOCATOR NODE) takes three arguments",
                            head
                        )));
                    };
                    let prefix = form_name(head, prefix)?;
                    let loc = Locator::from_lit(loc)?;
                    let node = compile_node(prefix, node)?;
                    match head {
                        "insert-before" => self.insert_before(prefix, &loc, node)?,
                        "insert-after" => self.insert_after(prefix, &loc, node)?,
                        _ => {
                            self.replace(prefix, &loc, node)?;
                        }
                    }
                }
                "remove" => {
                    let [prefix, loc] = rest else {
                        return Err(MenuError::definition(
                            "(remove PREFIX LOCATOR) takes two arguments",
                        ));
                    };
                    let prefix = form_name(head, prefix)?;
                    self.remove(prefix, &Locator::from_lit(loc)?)?;
                }
                "set-property" => {
                    let [prefix, loc, Lit::Kw(key), value] = rest else {
                        return Err(MenuError::definition(
                            "(set-property PREFIX LOCATOR :KEY VALUE) takes four arguments",
                        ));
                    };
                    let prefix = form_name(head, prefix)?;
                    self.set_property(prefix, &Locator::from_lit(loc)?, key, value)?;
                }
                other => {
                    return Err(MenuError::definition(format!("unknown form `{}`", other)));
                }
            }
        }
        Ok(defined)
    }

    /// `(define-prefix NAME DESCRIPTION? :KEYWORD VALUE... GROUP...)`
    fn load_prefix(&mut self, rest: &[Lit]) -> Result<CommandId> {
        let (name, mut rest) = split_name("define-prefix", rest)?;
        let mut def = PrefixDefinition::new(name, Vec::new());
        if let Some((Lit::Str(desc), tail)) = rest.split_first() {
            def.description = Some(desc.clone());
            rest = tail;
        }
        while let [Lit::Kw(kw), value, tail @ ..] = rest {
            def.set_slot(kw, value)?;
            rest = tail;
        }
        def.layout = Rc::new(compile_layout(name, rest)?);
        self.define_prefix(def);
        Ok(name.to_string())
    }
}

/// A literal node as used by edit forms: a vector is a group, a list a
/// suffix.
pub fn compile_node(prefix: &str, lit: &Lit) -> Result<LayoutNode> {
    match lit {
        Lit::Vector(_) => Ok(LayoutNode::Group(compile_group(prefix, lit)?)),
        Lit::List(_) => Ok(LayoutNode::Suffix(compile_suffix(prefix, lit)?)),
        Lit::Str(s) => Ok(LayoutNode::Text(layout::TextNode {
            level: None,
            text: s.clone(),
        })),
        other => Err(MenuError::definition(format!(
            "{}: cannot use {} `{}` as a layout node",
            prefix,
            other.kind_name(),
            other
        ))),
    }
}

fn form_name<'a>(form: &str, lit: &'a Lit) -> Result<&'a str> {
    lit.as_name().ok_or_else(|| {
        MenuError::definition(format!("{}: expected a name, got `{}`", form, lit))
    })
}

fn split_name<'a>(form: &str, rest: &'a [Lit]) -> Result<(&'a str, &'a [Lit])> {
    let (name, tail) = rest
        .split_first()
        .ok_or_else(|| MenuError::definition(format!("{} needs a name", form)))?;
    Ok((form_name(form, name)?, tail))
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
