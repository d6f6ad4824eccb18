use super::*;

/// Trailing file arguments, exported as `("--", [files])`.
#[derive(Clone, Debug, PartialEq)]
pub struct FileList {
    pub argument: String,
    pub prompt: Option<String>,
    pub reader: Option<String>,
    pub history_key: String,
    pub value: InfixValue,
}

impl Infix for FileList {
    fn value(&self) -> &InfixValue {
        &self.value
    }

    fn store_value(&mut self, value: InfixValue) {
        self.value = value;
    }

    fn init_value(&mut self, ctx: &InitContext<'_>) {
        self.value = ctx
            .value
            .unwrap_or_default()
            .iter()
            .find_map(|a| match a {
                Arg::Pair(head, files) if *head == self.argument && !files.is_empty() => {
                    Some(InfixValue::Many(files.clone()))
                }
                _ => None,
            })
            .unwrap_or_default();
    }

    fn read_value(&self, read: &mut ReadFn<'_>) -> Result<ReadOutcome> {
        if self.value.is_set() {
            return Ok(ReadOutcome::Set(InfixValue::Unset));
        }
        let req = ReadRequest {
            prompt: self.prompt.clone().unwrap_or_else(|| "Files: ".to_string()),
            initial: None,
            history_key: self.history_key.clone(),
            history: Vec::new(),
            choices: Vec::new(),
            reader: self.reader.clone(),
        };
        let Some(input) = read(req)? else {
            return Ok(ReadOutcome::Cancelled);
        };
        let files = input
            .split([',', ' '])
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        Ok(ReadOutcome::Set(if files.is_empty() {
            InfixValue::Unset
        } else {
            InfixValue::Many(files)
        }))
    }

    fn format_value(&self) -> Vec<Segment> {
        match &self.value {
            InfixValue::Many(files) => vec![Segment::new(
                format!("{} {}", self.argument, files.join(" ")),
                value_face(true),
            )],
            _ => vec![Segment::new(self.argument.clone(), value_face(false))],
        }
    }

    fn contribute(&self, out: &mut Vec<Arg>) {
        if let InfixValue::Many(files) = &self.value {
            out.push(Arg::Pair(self.argument.clone(), files.clone()));
        }
    }

    /// An empty file list is the same as no file list.
    fn allows_empty(&self) -> bool {
        false
    }

    fn identity(&self) -> Option<String> {
        Some(self.argument.clone())
    }

    fn matches_argument(&self, arg: &str) -> bool {
        self.argument == arg
    }

    fn history_key(&self) -> Option<&str> {
        Some(&self.history_key)
    }
}
