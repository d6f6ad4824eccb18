use crate::error::{MenuError, Result};
use crate::literal::Lit;
use crate::model::{
    CommandId, Description, GroupClass, MAX_LEVEL, MultiValue, Predicates, SuffixClass,
    TransientOverride,
};

mod compile;
mod edit;
mod locator;

pub use compile::{
    compile_command_spec, compile_group, compile_layout, compile_suffix, merge_command_spec,
};
pub use edit::{get_node, insert_after, insert_before, remove, replace, set_property};
pub use locator::{Locator, PathStep, locate};

#[derive(Clone, Debug, PartialEq)]
pub enum LayoutNode {
    Group(Group),
    Suffix(SuffixSpec),
    Text(TextNode),
}

impl LayoutNode {
    pub fn is_group(&self) -> bool {
        matches!(self, LayoutNode::Group(_))
    }

    pub fn level(&self) -> Option<u8> {
        match self {
            LayoutNode::Group(g) => g.level,
            LayoutNode::Suffix(s) => s.level,
            LayoutNode::Text(t) => t.level,
        }
    }

    pub fn as_suffix(&self) -> Option<&SuffixSpec> {
        match self {
            LayoutNode::Suffix(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            LayoutNode::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn children(&self) -> &[LayoutNode] {
        match self {
            LayoutNode::Group(g) => &g.children,
            _ => &[],
        }
    }

    /// Every suffix spec in pre-order.
    pub fn suffixes(&self) -> Vec<&SuffixSpec> {
        let mut out = Vec::new();
        collect_suffixes(std::slice::from_ref(self), &mut out);
        out
    }
}

pub fn collect_suffixes<'a>(nodes: &'a [LayoutNode], out: &mut Vec<&'a SuffixSpec>) {
    for n in nodes {
        match n {
            LayoutNode::Group(g) => collect_suffixes(&g.children, out),
            LayoutNode::Suffix(s) => out.push(s),
            LayoutNode::Text(_) => {}
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub level: Option<u8>,
    pub class: GroupClass,
    pub description: Option<Description>,
    pub predicates: Predicates,
    /// Heading is not rendered.
    pub hide: bool,
    pub pad_keys: bool,
    pub children: Vec<LayoutNode>,
}

impl Group {
    pub fn new(class: GroupClass) -> Self {
        Self {
            level: None,
            class,
            description: None,
            predicates: Predicates::default(),
            hide: false,
            pad_keys: false,
            children: Vec::new(),
        }
    }

    pub fn set_property(&mut self, key: &str, value: &Lit) -> Result<()> {
        match key {
            "level" => self.level = Some(parse_level(value)?),
            "description" => self.description = Some(parse_description(value)?),
            "class" => {
                let name = expect_name(key, value)?;
                self.class = GroupClass::parse(name)
                    .ok_or_else(|| MenuError::definition(format!("unknown group class `{}`", name)))?;
            }
            "if" => self.predicates.if_ = Some(expect_name(key, value)?.to_string()),
            "if-not" => self.predicates.if_not = Some(expect_name(key, value)?.to_string()),
            "inapt-if" => self.predicates.inapt_if = Some(expect_name(key, value)?.to_string()),
            "hide" => self.hide = value.is_truthy(),
            "pad-keys" => self.pad_keys = value.is_truthy(),
            _ => {
                return Err(MenuError::definition(format!(
                    "unknown group property :{}",
                    key
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextNode {
    pub level: Option<u8>,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SuffixSpec {
    pub level: Option<u8>,
    pub class: SuffixClass,
    pub key: String,
    pub command: CommandId,
    pub description: Option<Description>,
    pub argument: Option<String>,
    pub shortarg: Option<String>,
    pub reader: Option<String>,
    pub choices: Vec<String>,
    pub format: Option<String>,
    pub transient: Option<TransientOverride>,
    pub predicates: Predicates,
    pub prompt: Option<String>,
    pub history_key: Option<String>,
    pub always_read: bool,
    pub allow_empty: Option<bool>,
    pub multi_value: Option<MultiValue>,
    pub init_value: Option<String>,
    pub unsavable: bool,
    pub argument_format: Option<String>,
    pub argument_regexp: Option<String>,
    pub variable: Option<String>,
    pub default: Option<String>,
    /// Command was synthesized from the argument.
    pub anonymous: bool,
}

impl SuffixSpec {
    pub fn new(key: impl Into<String>, command: impl Into<CommandId>) -> Self {
        Self {
            level: None,
            class: SuffixClass::Plain,
            key: key.into(),
            command: command.into(),
            description: None,
            argument: None,
            shortarg: None,
            reader: None,
            choices: Vec::new(),
            format: None,
            transient: None,
            predicates: Predicates::default(),
            prompt: None,
            history_key: None,
            always_read: false,
            allow_empty: None,
            multi_value: None,
            init_value: None,
            unsavable: false,
            argument_format: None,
            argument_regexp: None,
            variable: None,
            default: None,
            anonymous: false,
        }
    }

    pub fn description_text(&self) -> Option<&str> {
        match &self.description {
            Some(Description::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn set_property(&mut self, key: &str, value: &Lit) -> Result<()> {
        match key {
            "level" => self.level = Some(parse_level(value)?),
            "class" => {
                let name = expect_name(key, value)?;
                self.class = SuffixClass::parse(name).ok_or_else(|| {
                    MenuError::definition(format!("unknown suffix class `{}`", name))
                })?;
            }
            "key" => self.key = expect_name(key, value)?.to_string(),
            "command" => {
                self.command = expect_name(key, value)?.to_string();
                self.anonymous = false;
            }
            "description" => self.description = Some(parse_description(value)?),
            "argument" => self.argument = Some(expect_name(key, value)?.to_string()),
            "shortarg" => self.shortarg = Some(expect_name(key, value)?.to_string()),
            "reader" => self.reader = Some(expect_name(key, value)?.to_string()),
            "choices" => {
                self.choices = value.string_list().ok_or_else(|| {
                    MenuError::definition(format!(":choices expects strings, got {}", value))
                })?;
            }
            "format" => self.format = Some(expect_name(key, value)?.to_string()),
            "transient" => {
                self.transient = Some(match value {
                    Lit::Bool(b) => TransientOverride::Bool(*b),
                    Lit::Sym(s) => TransientOverride::Named(s.clone()),
                    other => {
                        return Err(MenuError::definition(format!(
                            ":transient expects t, nil or a behavior name, got {}",
                            other
                        )));
                    }
                })
            }
            "if" => self.predicates.if_ = Some(expect_name(key, value)?.to_string()),
            "if-not" => self.predicates.if_not = Some(expect_name(key, value)?.to_string()),
            "inapt-if" => self.predicates.inapt_if = Some(expect_name(key, value)?.to_string()),
            "prompt" => self.prompt = Some(expect_name(key, value)?.to_string()),
            "history-key" => self.history_key = Some(expect_name(key, value)?.to_string()),
            "always-read" => self.always_read = value.is_truthy(),
            "allow-empty" => self.allow_empty = Some(value.is_truthy()),
            "multi-value" => {
                self.multi_value = match value {
                    Lit::Bool(false) => None,
                    Lit::Bool(true) => Some(MultiValue::Repeat),
                    Lit::Sym(s) if s == "repeat" => Some(MultiValue::Repeat),
                    Lit::Sym(s) if s == "rest" => Some(MultiValue::Rest),
                    other => {
                        return Err(MenuError::definition(format!(
                            ":multi-value expects repeat or rest, got {}",
                            other
                        )));
                    }
                }
            }
            "init-value" => self.init_value = Some(expect_name(key, value)?.to_string()),
            "unsavable" => self.unsavable = value.is_truthy(),
            "argument-format" => {
                self.argument_format = Some(expect_name(key, value)?.to_string())
            }
            "argument-regexp" => {
                self.argument_regexp = Some(expect_name(key, value)?.to_string())
            }
            "variable" => self.variable = Some(expect_name(key, value)?.to_string()),
            "default" => self.default = Some(expect_name(key, value)?.to_string()),
            _ => {
                return Err(MenuError::definition(format!(
                    "unknown suffix property :{}",
                    key
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn parse_level(value: &Lit) -> Result<u8> {
    match value.as_int() {
        Some(n) if (0..=MAX_LEVEL as i64).contains(&n) => Ok(n as u8),
        _ => Err(MenuError::definition(format!(
            "level must be an integer between 0 and {}, got {}",
            MAX_LEVEL, value
        ))),
    }
}

fn parse_description(value: &Lit) -> Result<Description> {
    match value {
        Lit::Str(s) => Ok(Description::Text(s.clone())),
        Lit::Sym(s) => Ok(Description::Dynamic(s.clone())),
        other => Err(MenuError::definition(format!(
            "description must be a string or function name, got {}",
            other
        ))),
    }
}

fn expect_name<'a>(key: &str, value: &'a Lit) -> Result<&'a str> {
    value.as_name().ok_or_else(|| {
        MenuError::definition(format!(
            ":{} expects a string or symbol, got {} `{}`",
            key,
            value.kind_name(),
            value
        ))
    })
}
