use std::fmt;

use serde::{Deserialize, Serialize};

pub type CommandId = String;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 7;
pub const DEFAULT_LEVEL: u8 = 4;

/// Argument separator used by file-list infixes.
pub const FILES_ARGUMENT: &str = "--";

/// One exported argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    /// `--all`, `--author=me`
    Str(String),
    /// `("--", ["a.rs", "b.rs"])`
    Pair(String, Vec<String>),
}

impl Arg {
    pub fn str(s: impl Into<String>) -> Self {
        Arg::Str(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            Arg::Pair(..) => None,
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => write!(f, "{}", s),
            Arg::Pair(head, rest) => {
                write!(f, "{}", head)?;
                for r in rest {
                    write!(f, " {}", r)?;
                }
                Ok(())
            }
        }
    }
}

pub fn format_args_line(args: &[Arg]) -> String {
    args.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Explicit `:transient` value on a suffix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransientOverride {
    Bool(bool),
    /// Name of a registered behavior function.
    Named(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Predicates {
    pub if_: Option<String>,
    pub if_not: Option<String>,
    /// Keep the suffix visible but refuse to run it.
    pub inapt_if: Option<String>,
}

impl Predicates {
    pub fn is_empty(&self) -> bool {
        self.if_.is_none() && self.if_not.is_none() && self.inapt_if.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Description {
    Text(String),
    /// Name of a registered description function.
    Dynamic(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultiValue {
    /// `--opt=a --opt=b`
    Repeat,
    /// `("--opt", ["a", "b"])`
    Rest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SuffixClass {
    Plain,
    Switch,
    Option,
    Switches,
    Files,
    Variable,
}

impl SuffixClass {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "suffix" | "plain" => SuffixClass::Plain,
            "switch" => SuffixClass::Switch,
            "option" => SuffixClass::Option,
            "switches" => SuffixClass::Switches,
            "files" => SuffixClass::Files,
            "variable" => SuffixClass::Variable,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            SuffixClass::Plain => "suffix",
            SuffixClass::Switch => "switch",
            SuffixClass::Option => "option",
            SuffixClass::Switches => "switches",
            SuffixClass::Files => "files",
            SuffixClass::Variable => "variable",
        }
    }

    pub fn is_infix(self) -> bool {
        !matches!(self, SuffixClass::Plain)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupClass {
    Column,
    Row,
    Columns,
    Subgroups,
}

impl GroupClass {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "column" => GroupClass::Column,
            "row" => GroupClass::Row,
            "columns" => GroupClass::Columns,
            "subgroups" => GroupClass::Subgroups,
            _ => return None,
        })
    }

    /// Classes whose children are groups.
    pub fn holds_groups(self) -> bool {
        matches!(self, GroupClass::Columns | GroupClass::Subgroups)
    }
}
