use std::collections::BTreeMap;

use crate::error::{MenuError, Result};
use crate::host::ReadRequest;
use crate::layout::SuffixSpec;
use crate::model::{Arg, CommandId, Description, SuffixClass, TransientOverride};
use crate::render::{Face, Row, Segment};

mod files;
mod option;
mod switch;
mod switches;
mod variable;

pub use files::FileList;
pub use option::OptionArg;
pub use switch::Switch;
pub use switches::{ArgumentPattern, Switches};
pub use variable::Variable;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InfixValue {
    #[default]
    Unset,
    One(String),
    Many(Vec<String>),
}

impl InfixValue {
    pub fn is_set(&self) -> bool {
        !matches!(self, InfixValue::Unset)
    }

    pub fn as_one(&self) -> Option<&str> {
        match self {
            InfixValue::One(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_strings(&self) -> Vec<String> {
        match self {
            InfixValue::Unset => Vec::new(),
            InfixValue::One(s) => vec![s.clone()],
            InfixValue::Many(v) => v.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    Set(InfixValue),
    Cancelled,
}

/// Line reader handed to `Infix::read_value`; `Ok(None)` means cancelled.
pub type ReadFn<'a> = dyn FnMut(ReadRequest) -> Result<Option<String>> + 'a;

pub struct InitContext<'a> {
    /// The prefix value the infixes are seeded from. `None` means no value was
    /// set, saved or declared, so each infix falls back to its own default.
    pub value: Option<&'a [Arg]>,
    /// Host-visible variables bound by variable infixes.
    pub variables: &'a BTreeMap<String, String>,
}

/// Behavior shared by every value-carrying suffix.
pub trait Infix {
    fn value(&self) -> &InfixValue;

    /// Raw assignment; callers go through the incompatibility resolver.
    fn store_value(&mut self, value: InfixValue);

    fn init_value(&mut self, ctx: &InitContext<'_>);

    fn read_value(&self, read: &mut ReadFn<'_>) -> Result<ReadOutcome>;

    fn format_value(&self) -> Vec<Segment>;

    fn contribute(&self, out: &mut Vec<Arg>);

    /// Whether an empty string is a value in its own right rather than unset.
    fn allows_empty(&self) -> bool;

    /// The argument string this infix stands for right now.
    fn identity(&self) -> Option<String>;

    fn matches_argument(&self, arg: &str) -> bool;

    fn history_key(&self) -> Option<&str> {
        None
    }

    fn unsavable(&self) -> bool {
        false
    }

    /// Turn a string read from the user into a value.
    fn parse_input(&self, input: String) -> InfixValue {
        if input.is_empty() && !self.allows_empty() {
            InfixValue::Unset
        } else {
            InfixValue::One(input)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SuffixKind {
    Plain,
    Switch(Switch),
    Option(OptionArg),
    Switches(Switches),
    Files(FileList),
    Variable(Variable),
}

/// Per-class defaults every suffix instance starts from.
#[derive(Clone, Debug, PartialEq)]
pub struct Prototype {
    pub class: SuffixClass,
    pub transient: Option<TransientOverride>,
    pub format: String,
    pub allow_empty: bool,
}

impl Prototype {
    pub fn for_class(class: SuffixClass) -> Self {
        let infix = class.is_infix();
        Self {
            class,
            transient: infix.then_some(TransientOverride::Bool(true)),
            format: if infix { " %k %d (%v)" } else { " %k %d" }.to_string(),
            allow_empty: matches!(class, SuffixClass::Variable),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Suffix {
    pub key: String,
    pub command: CommandId,
    pub class: SuffixClass,
    pub description: Option<Description>,
    pub level: u8,
    pub inapt: bool,
    pub transient: Option<TransientOverride>,
    pub format: String,
    pub kind: SuffixKind,
}

impl Suffix {
    /// A fresh instance: prototype defaults overlaid with the suffix spec's fields.
    pub fn from_spec(spec: &SuffixSpec, proto: &Prototype, level: u8) -> Result<Self> {
        let proto = proto.clone();
        let argument = || {
            spec.argument.clone().ok_or_else(|| {
                MenuError::definition(format!(
                    "{} suffix `{}` has no argument",
                    spec.class.name(),
                    spec.key
                ))
            })
        };
        let history_key = spec
            .history_key
            .clone()
            .or_else(|| spec.argument.clone())
            .unwrap_or_else(|| spec.command.clone());

        let kind = match spec.class {
            SuffixClass::Plain => SuffixKind::Plain,
            SuffixClass::Switch => SuffixKind::Switch(Switch::new(
                argument()?,
                spec.shortarg.clone(),
                spec.init_value.is_some(),
            )),
            SuffixClass::Option => SuffixKind::Option(OptionArg {
                argument: argument()?,
                shortarg: spec.shortarg.clone(),
                prompt: spec.prompt.clone(),
                choices: spec.choices.clone(),
                reader: spec.reader.clone(),
                always_read: spec.always_read,
                allow_empty: spec.allow_empty.unwrap_or(proto.allow_empty),
                multi_value: spec.multi_value,
                init: spec.init_value.clone(),
                unsavable: spec.unsavable,
                history_key,
                value: InfixValue::Unset,
            }),
            SuffixClass::Switches => SuffixKind::Switches(Switches::new(
                spec.argument_format.clone().or_else(|| spec.argument.clone()),
                spec.argument_regexp.clone(),
                spec.choices.clone(),
                spec.init_value.clone(),
            )?),
            SuffixClass::Files => SuffixKind::Files(FileList {
                argument: spec
                    .argument
                    .clone()
                    .unwrap_or_else(|| crate::model::FILES_ARGUMENT.to_string()),
                prompt: spec.prompt.clone(),
                reader: spec.reader.clone(),
                history_key,
                value: InfixValue::Unset,
            }),
            SuffixClass::Variable => SuffixKind::Variable(Variable {
                name: spec
                    .variable
                    .clone()
                    .unwrap_or_else(|| spec.command.clone()),
                choices: spec.choices.clone(),
                default: spec.default.clone(),
                prompt: spec.prompt.clone(),
                reader: spec.reader.clone(),
                allow_empty: spec.allow_empty.unwrap_or(proto.allow_empty),
                history_key,
                value: InfixValue::Unset,
            }),
        };

        Ok(Self {
            key: spec.key.clone(),
            command: spec.command.clone(),
            class: spec.class,
            description: spec.description.clone(),
            level,
            inapt: false,
            transient: spec.transient.clone().or(proto.transient),
            format: spec.format.clone().unwrap_or(proto.format),
            kind,
        })
    }

    pub fn infix(&self) -> Option<&dyn Infix> {
        match &self.kind {
            SuffixKind::Plain => None,
            SuffixKind::Switch(x) => Some(x),
            SuffixKind::Option(x) => Some(x),
            SuffixKind::Switches(x) => Some(x),
            SuffixKind::Files(x) => Some(x),
            SuffixKind::Variable(x) => Some(x),
        }
    }

    pub fn infix_mut(&mut self) -> Option<&mut dyn Infix> {
        match &mut self.kind {
            SuffixKind::Plain => None,
            SuffixKind::Switch(x) => Some(x),
            SuffixKind::Option(x) => Some(x),
            SuffixKind::Switches(x) => Some(x),
            SuffixKind::Files(x) => Some(x),
            SuffixKind::Variable(x) => Some(x),
        }
    }

    pub fn is_infix(&self) -> bool {
        self.infix().is_some()
    }

    pub fn value(&self) -> InfixValue {
        self.infix()
            .map(|i| i.value().clone())
            .unwrap_or_default()
    }

    pub fn variable(&self) -> Option<&Variable> {
        match &self.kind {
            SuffixKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// Expand the format string (`%k` key, `%d` description, `%v` value,
    /// `%l` level).
    pub fn format_row(&self, description: &str, edit_mode: bool) -> Row {
        let mut row = Vec::new();
        if edit_mode && !self.format.contains("%l") {
            row.push(Segment::new(format!("{} ", self.level), Face::Level));
        }

        let mut lit = String::new();
        let mut chars = self.format.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                lit.push(c);
                continue;
            }
            let Some(spec) = chars.next() else {
                lit.push('%');
                break;
            };
            let expansion = match spec {
                'k' => vec![Segment::new(self.key.clone(), Face::Key)],
                'd' => vec![Segment::new(
                    description.to_string(),
                    if self.inapt {
                        Face::Inapt
                    } else {
                        Face::Description
                    },
                )],
                'v' => self.infix().map(|i| i.format_value()).unwrap_or_default(),
                'l' => vec![Segment::new(self.level.to_string(), Face::Level)],
                '%' => {
                    lit.push('%');
                    continue;
                }
                other => {
                    lit.push('%');
                    lit.push(other);
                    continue;
                }
            };
            if !lit.is_empty() {
                row.push(Segment::plain(std::mem::take(&mut lit)));
            }
            row.extend(expansion);
        }
        if !lit.is_empty() {
            row.push(Segment::plain(lit));
        }
        row
    }
}

pub(crate) fn value_face(active: bool) -> Face {
    if active {
        Face::ValueActive
    } else {
        Face::ValueInactive
    }
}

#[cfg(test)]
#[path = "tests/object_tests.rs"]
mod tests;
