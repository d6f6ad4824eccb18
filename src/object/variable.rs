use super::*;

/// Binds a host-visible variable instead of contributing an argument.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub name: String,
    pub choices: Vec<String>,
    pub default: Option<String>,
    pub prompt: Option<String>,
    pub reader: Option<String>,
    pub allow_empty: bool,
    pub history_key: String,
    pub value: InfixValue,
}

impl Infix for Variable {
    fn value(&self) -> &InfixValue {
        &self.value
    }

    fn store_value(&mut self, value: InfixValue) {
        self.value = value;
    }

    fn init_value(&mut self, ctx: &InitContext<'_>) {
        self.value = ctx
            .variables
            .get(&self.name)
            .cloned()
            .or_else(|| self.default.clone())
            .map(InfixValue::One)
            .unwrap_or_default();
    }

    fn read_value(&self, read: &mut ReadFn<'_>) -> Result<ReadOutcome> {
        if !self.choices.is_empty() {
            let next = match self.value.as_one() {
                None => self.choices.first(),
                Some(cur) => self
                    .choices
                    .iter()
                    .position(|c| c == cur)
                    .and_then(|i| self.choices.get(i + 1)),
            };
            return Ok(ReadOutcome::Set(
                next.cloned().map(InfixValue::One).unwrap_or_default(),
            ));
        }

        let req = ReadRequest {
            prompt: self
                .prompt
                .clone()
                .unwrap_or_else(|| format!("Set {}: ", self.name)),
            initial: self.value.as_one().map(str::to_string),
            history_key: self.history_key.clone(),
            history: Vec::new(),
            choices: Vec::new(),
            reader: self.reader.clone(),
        };
        match read(req)? {
            Some(input) => Ok(ReadOutcome::Set(self.parse_input(input))),
            None => Ok(ReadOutcome::Cancelled),
        }
    }

    fn format_value(&self) -> Vec<Segment> {
        if self.choices.is_empty() {
            return match self.value.as_one() {
                Some(v) => vec![Segment::new(format!("{:?}", v), value_face(true))],
                None => vec![Segment::new("unset", value_face(false))],
            };
        }

        let current = self.value.as_one();
        let mut out = vec![Segment::new("[", value_face(false))];
        for (i, c) in self.choices.iter().enumerate() {
            if i > 0 {
                out.push(Segment::new("|", value_face(false)));
            }
            out.push(Segment::new(c.clone(), value_face(current == Some(c.as_str()))));
        }
        out.push(Segment::new("]", value_face(false)));
        out
    }

    fn contribute(&self, _out: &mut Vec<Arg>) {}

    fn allows_empty(&self) -> bool {
        self.allow_empty
    }

    fn identity(&self) -> Option<String> {
        None
    }

    fn matches_argument(&self, _arg: &str) -> bool {
        false
    }

    fn history_key(&self) -> Option<&str> {
        Some(&self.history_key)
    }

    fn unsavable(&self) -> bool {
        true
    }
}
