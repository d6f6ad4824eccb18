use super::*;

/// A flag that is either present or absent.
#[derive(Clone, Debug, PartialEq)]
pub struct Switch {
    pub argument: String,
    pub shortarg: Option<String>,
    /// Initial state when the prefix carries no value.
    pub default_on: bool,
    pub value: InfixValue,
}

impl Switch {
    pub fn new(argument: String, shortarg: Option<String>, default_on: bool) -> Self {
        Self {
            argument,
            shortarg,
            default_on,
            value: InfixValue::Unset,
        }
    }

    pub fn is_on(&self) -> bool {
        self.value.is_set()
    }

    fn on(&self) -> InfixValue {
        InfixValue::One(self.argument.clone())
    }
}

impl Infix for Switch {
    fn value(&self) -> &InfixValue {
        &self.value
    }

    fn store_value(&mut self, value: InfixValue) {
        self.value = value;
    }

    fn init_value(&mut self, ctx: &InitContext<'_>) {
        let on = match ctx.value {
            Some(args) => args.iter().any(|a| a.as_str() == Some(self.argument.as_str())),
            None => self.default_on,
        };
        self.value = if on { self.on() } else { InfixValue::Unset };
    }

    fn read_value(&self, _read: &mut ReadFn<'_>) -> Result<ReadOutcome> {
        Ok(ReadOutcome::Set(if self.is_on() {
            InfixValue::Unset
        } else {
            self.on()
        }))
    }

    fn format_value(&self) -> Vec<Segment> {
        vec![Segment::new(self.argument.clone(), value_face(self.is_on()))]
    }

    fn contribute(&self, out: &mut Vec<Arg>) {
        if self.is_on() {
            out.push(Arg::Str(self.argument.clone()));
        }
    }

    fn allows_empty(&self) -> bool {
        false
    }

    fn identity(&self) -> Option<String> {
        Some(self.argument.clone())
    }

    fn matches_argument(&self, arg: &str) -> bool {
        self.argument == arg || self.shortarg.as_deref() == Some(arg)
    }
}
