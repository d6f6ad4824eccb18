//! Reader for the declarative menu literal syntax.
//!
//! ```text
//! (define-prefix my-commit "Commit"
//!   :man "git-commit"
//!   ["Arguments"
//!    ("-a" "Stage all" ("-a" "--all"))
//!    ("-m" "Message" "--message=")]
//!   ["Actions"
//!    ("c" "Commit" my-commit-create)])
//! ```

use std::fmt;

use crate::error::{MenuError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lit {
    Int(i64),
    Str(String),
    Sym(String),
    /// Keyword without its leading `:`.
    Kw(String),
    Bool(bool),
    Vector(Vec<Lit>),
    List(Vec<Lit>),
}

impl Lit {
    pub fn str(s: impl Into<String>) -> Self {
        Lit::Str(s.into())
    }

    pub fn sym(s: impl Into<String>) -> Self {
        Lit::Sym(s.into())
    }

    pub fn kw(s: impl Into<String>) -> Self {
        Lit::Kw(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Lit::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sym(&self) -> Option<&str> {
        match self {
            Lit::Sym(s) => Some(s),
            _ => None,
        }
    }

    /// String or symbol contents.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Lit::Str(s) | Lit::Sym(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Lit::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_kw(&self) -> Option<&str> {
        match self {
            Lit::Kw(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a vector or list.
    pub fn items(&self) -> Option<&[Lit]> {
        match self {
            Lit::Vector(v) | Lit::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Lit::Bool(false))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Lit::Int(_) => "integer",
            Lit::Str(_) => "string",
            Lit::Sym(_) => "symbol",
            Lit::Kw(_) => "keyword",
            Lit::Bool(_) => "boolean",
            Lit::Vector(_) => "vector",
            Lit::List(_) => "list",
        }
    }

    /// Strings from a string, or a vector/list of strings.
    pub fn string_list(&self) -> Option<Vec<String>> {
        match self {
            Lit::Str(s) => Some(vec![s.clone()]),
            Lit::Vector(v) | Lit::List(v) => v
                .iter()
                .map(|x| x.as_name().map(str::to_string))
                .collect::<Option<Vec<_>>>(),
            _ => None,
        }
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn seq(f: &mut fmt::Formatter<'_>, items: &[Lit], open: char, close: char) -> fmt::Result {
            write!(f, "{}", open)?;
            for (i, it) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", it)?;
            }
            write!(f, "{}", close)
        }

        match self {
            Lit::Int(n) => write!(f, "{}", n),
            Lit::Str(s) => write!(f, "{:?}", s),
            Lit::Sym(s) => write!(f, "{}", s),
            Lit::Kw(s) => write!(f, ":{}", s),
            Lit::Bool(true) => write!(f, "t"),
            Lit::Bool(false) => write!(f, "nil"),
            Lit::Vector(v) => seq(f, v, '[', ']'),
            Lit::List(v) => seq(f, v, '(', ')'),
        }
    }
}

pub fn parse(src: &str) -> Result<Vec<Lit>> {
    let mut r = Reader::new(src);
    let mut out = Vec::new();
    loop {
        r.skip_ws();
        if r.peek().is_none() {
            return Ok(out);
        }
        out.push(r.read()?);
    }
}

/// Parse exactly one form.
pub fn parse_one(src: &str) -> Result<Lit> {
    let mut forms = parse(src)?;
    match forms.len() {
        1 => Ok(forms.remove(0)),
        0 => Err(MenuError::definition("empty input")),
        n => Err(MenuError::definition(format!("expected one form, found {}", n))),
    }
}

struct Reader<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    col: usize,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn err(&self, msg: impl fmt::Display) -> MenuError {
        MenuError::definition(format!("{}:{}: {}", self.line, self.col, msg))
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c == ';' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn read(&mut self) -> Result<Lit> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.err("unexpected end of input")),
            Some('(') => {
                self.bump();
                Ok(Lit::List(self.read_seq(')')?))
            }
            Some('[') => {
                self.bump();
                Ok(Lit::Vector(self.read_seq(']')?))
            }
            Some(c @ (')' | ']')) => Err(self.err(format!("unexpected `{}`", c))),
            Some('"') => self.read_string(),
            Some(_) => self.read_atom(),
        }
    }

    fn read_seq(&mut self, close: char) -> Result<Vec<Lit>> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(self.err(format!("missing `{}`", close))),
                Some(c) if c == close => {
                    self.bump();
                    return Ok(items);
                }
                Some(c @ (')' | ']')) => {
                    return Err(self.err(format!("expected `{}`, found `{}`", close, c)));
                }
                Some(_) => items.push(self.read()?),
            }
        }
    }

    fn read_string(&mut self) -> Result<Lit> {
        self.bump();
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(self.err("unterminated string")),
                Some('"') => return Ok(Lit::Str(s)),
                Some('\\') => match self.bump() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => return Err(self.err("dangling escape")),
                },
                Some(c) => s.push(c),
            }
        }
    }

    fn read_atom(&mut self) -> Result<Lit> {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '"' | ';') {
                break;
            }
            s.push(c);
            self.bump();
        }

        if let Ok(n) = s.parse::<i64>() {
            return Ok(Lit::Int(n));
        }
        Ok(match s.as_str() {
            "t" => Lit::Bool(true),
            "nil" => Lit::Bool(false),
            _ => match s.strip_prefix(':') {
                Some(kw) if !kw.is_empty() => Lit::Kw(kw.to_string()),
                _ => Lit::Sym(s),
            },
        })
    }
}

#[cfg(test)]
#[path = "tests/literal_tests.rs"]
mod tests;
