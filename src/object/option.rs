use super::*;
use crate::model::MultiValue;

/// `--name=VALUE`, read from the user.
#[derive(Clone, Debug, PartialEq)]
pub struct OptionArg {
    pub argument: String,
    pub shortarg: Option<String>,
    pub prompt: Option<String>,
    pub choices: Vec<String>,
    pub reader: Option<String>,
    /// Read a new value even when one is set, instead of unsetting.
    pub always_read: bool,
    pub allow_empty: bool,
    pub multi_value: Option<MultiValue>,
    pub init: Option<String>,
    pub unsavable: bool,
    pub history_key: String,
    pub value: InfixValue,
}

impl OptionArg {
    fn split_multi(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Infix for OptionArg {
    fn value(&self) -> &InfixValue {
        &self.value
    }

    fn store_value(&mut self, value: InfixValue) {
        self.value = value;
    }

    fn init_value(&mut self, ctx: &InitContext<'_>) {
        let Some(args) = ctx.value else {
            self.value = match &self.init {
                Some(v) if self.multi_value.is_some() => InfixValue::Many(Self::split_multi(v)),
                Some(v) => self.parse_input(v.clone()),
                None => InfixValue::Unset,
            };
            return;
        };

        self.value = match self.multi_value {
            Some(MultiValue::Rest) => args
                .iter()
                .find_map(|a| match a {
                    Arg::Pair(head, rest) if *head == self.argument => {
                        Some(InfixValue::Many(rest.clone()))
                    }
                    _ => None,
                })
                .unwrap_or_default(),
            Some(MultiValue::Repeat) => {
                let all = args
                    .iter()
                    .filter_map(|a| a.as_str()?.strip_prefix(self.argument.as_str()))
                    .map(str::to_string)
                    .collect::<Vec<_>>();
                if all.is_empty() {
                    InfixValue::Unset
                } else {
                    InfixValue::Many(all)
                }
            }
            None => args
                .iter()
                .find_map(|a| a.as_str()?.strip_prefix(self.argument.as_str()))
                .map(|rest| self.parse_input(rest.to_string()))
                .unwrap_or_default(),
        };
    }

    fn read_value(&self, read: &mut ReadFn<'_>) -> Result<ReadOutcome> {
        if self.value.is_set() && !self.always_read {
            return Ok(ReadOutcome::Set(InfixValue::Unset));
        }

        let initial = self
            .value
            .is_set()
            .then(|| self.value.to_strings().join(","));
        let req = ReadRequest {
            prompt: self
                .prompt
                .clone()
                .unwrap_or_else(|| self.argument.clone()),
            initial,
            history_key: self.history_key.clone(),
            history: Vec::new(),
            choices: self.choices.clone(),
            reader: self.reader.clone(),
        };

        let Some(input) = read(req)? else {
            return Ok(ReadOutcome::Cancelled);
        };
        let value = if self.multi_value.is_some() {
            let parts = Self::split_multi(&input);
            if parts.is_empty() {
                InfixValue::Unset
            } else {
                InfixValue::Many(parts)
            }
        } else {
            self.parse_input(input)
        };
        Ok(ReadOutcome::Set(value))
    }

    fn format_value(&self) -> Vec<Segment> {
        let text = match (&self.value, self.multi_value) {
            (InfixValue::Unset, _) => return vec![Segment::new(self.argument.clone(), value_face(false))],
            (InfixValue::One(v), _) => format!("{}{}", self.argument, v),
            (InfixValue::Many(vs), Some(MultiValue::Repeat)) => vs
                .iter()
                .map(|v| format!("{}{}", self.argument, v))
                .collect::<Vec<_>>()
                .join(" "),
            (InfixValue::Many(vs), _) => format!("{} {}", self.argument, vs.join(" ")),
        };
        vec![Segment::new(text, value_face(true))]
    }

    fn contribute(&self, out: &mut Vec<Arg>) {
        match (&self.value, self.multi_value) {
            (InfixValue::Unset, _) => {}
            (InfixValue::One(v), _) => out.push(Arg::Str(format!("{}{}", self.argument, v))),
            (InfixValue::Many(vs), Some(MultiValue::Rest)) => {
                out.push(Arg::Pair(self.argument.clone(), vs.clone()))
            }
            (InfixValue::Many(vs), _) => {
                out.extend(vs.iter().map(|v| Arg::Str(format!("{}{}", self.argument, v))))
            }
        }
    }

    fn allows_empty(&self) -> bool {
        self.allow_empty
    }

    fn identity(&self) -> Option<String> {
        Some(self.argument.clone())
    }

    fn matches_argument(&self, arg: &str) -> bool {
        self.argument == arg || self.shortarg.as_deref() == Some(arg)
    }

    fn history_key(&self) -> Option<&str> {
        Some(&self.history_key)
    }

    fn unsavable(&self) -> bool {
        self.unsavable
    }
}
