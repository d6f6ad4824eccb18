use regex::Regex;

use super::*;

/// Compiled regular form of a switches set. Compared by its source text.
#[derive(Clone, Debug)]
pub struct ArgumentPattern(Regex);

impl ArgumentPattern {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, arg: &str) -> bool {
        self.0.is_match(arg)
    }

    /// The choice captured by group 1.
    pub fn choice<'a>(&self, arg: &'a str) -> Option<&'a str> {
        Some(self.0.captures(arg)?.get(1)?.as_str())
    }
}

impl PartialEq for ArgumentPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// A set of mutually exclusive flags sharing one format, e.g.
/// `--color=%s` with choices `always` and `never`. Reading cycles through
/// the choices and back to unset.
#[derive(Clone, Debug, PartialEq)]
pub struct Switches {
    pub argument_format: String,
    /// Regular form matching every member of the set; group 1 is the choice.
    pub pattern: ArgumentPattern,
    pub choices: Vec<String>,
    pub init: Option<String>,
    pub value: InfixValue,
}

impl Switches {
    pub fn new(
        argument_format: Option<String>,
        argument_regexp: Option<String>,
        choices: Vec<String>,
        init: Option<String>,
    ) -> Result<Self> {
        let argument_format = argument_format
            .filter(|f| f.contains("%s"))
            .ok_or_else(|| MenuError::definition("switches need an :argument-format with %s"))?;
        if choices.is_empty() {
            return Err(MenuError::definition("switches need :choices"));
        }

        let pattern = match argument_regexp {
            Some(p) => p,
            None => {
                let (pre, post) = argument_format
                    .split_once("%s")
                    .unwrap_or((argument_format.as_str(), ""));
                let alts = choices
                    .iter()
                    .map(|c| regex::escape(c))
                    .collect::<Vec<_>>()
                    .join("|");
                format!("^{}({}){}$", regex::escape(pre), alts, regex::escape(post))
            }
        };
        let pattern = Regex::new(&pattern)
            .map(ArgumentPattern)
            .map_err(|e| MenuError::definition(format!("bad argument regexp {}: {}", pattern, e)))?;

        Ok(Self {
            argument_format,
            pattern,
            choices,
            init,
            value: InfixValue::Unset,
        })
    }

    pub fn argument_for(&self, choice: &str) -> String {
        self.argument_format.replacen("%s", choice, 1)
    }

    pub fn current_choice(&self) -> Option<String> {
        let full = self.value.as_one()?;
        if let Some(c) = self.choices.iter().find(|c| self.argument_for(c) == full) {
            return Some(c.clone());
        }
        self.pattern.choice(full).map(str::to_string)
    }
}

impl Infix for Switches {
    fn value(&self) -> &InfixValue {
        &self.value
    }

    fn store_value(&mut self, value: InfixValue) {
        self.value = value;
    }

    fn init_value(&mut self, ctx: &InitContext<'_>) {
        self.value = match ctx.value {
            Some(args) => args
                .iter()
                .filter_map(Arg::as_str)
                .find(|s| self.pattern.is_match(s))
                .map(|s| InfixValue::One(s.to_string()))
                .unwrap_or_default(),
            None => self
                .init
                .as_deref()
                .map(|c| InfixValue::One(self.argument_for(c)))
                .unwrap_or_default(),
        };
    }

    fn read_value(&self, _read: &mut ReadFn<'_>) -> Result<ReadOutcome> {
        let next = match self.current_choice() {
            None => self.choices.first(),
            Some(cur) => {
                let pos = self.choices.iter().position(|c| *c == cur);
                pos.and_then(|i| self.choices.get(i + 1))
            }
        };
        Ok(ReadOutcome::Set(match next {
            Some(c) => InfixValue::One(self.argument_for(c)),
            None => InfixValue::Unset,
        }))
    }

    fn format_value(&self) -> Vec<Segment> {
        let (pre, post) = self
            .argument_format
            .split_once("%s")
            .unwrap_or((self.argument_format.as_str(), ""));
        let current = self.current_choice();
        let set = current.is_some();

        let mut out = vec![Segment::new(format!("{}[", pre), value_face(set))];
        for (i, c) in self.choices.iter().enumerate() {
            if i > 0 {
                out.push(Segment::new("|", value_face(false)));
            }
            out.push(Segment::new(
                c.clone(),
                value_face(current.as_deref() == Some(c.as_str())),
            ));
        }
        out.push(Segment::new(format!("]{}", post), value_face(set)));
        out
    }

    fn contribute(&self, out: &mut Vec<Arg>) {
        if let Some(v) = self.value.as_one() {
            out.push(Arg::Str(v.to_string()));
        }
    }

    fn allows_empty(&self) -> bool {
        false
    }

    fn identity(&self) -> Option<String> {
        self.value.as_one().map(str::to_string)
    }

    /// Any member of the set matches, not only the current one.
    fn matches_argument(&self, arg: &str) -> bool {
        self.value.as_one() == Some(arg) || self.pattern.is_match(arg)
    }
}
