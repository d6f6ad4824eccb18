use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Index into the instance's live suffixes.
    Suffix(usize),
    Builtin(Builtin),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub keys: KeySeq,
    pub command: CommandId,
    pub target: Target,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    Command(Binding),
    /// The strokes so far start one or more longer keys.
    Prefix,
    None,
}

/// The keys of one active menu.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Keymap {
    prefix: CommandId,
    bindings: Vec<Binding>,
}

fn overlaps(a: &KeySeq, b: &KeySeq) -> bool {
    a.starts_with(b.strokes()) || b.starts_with(a.strokes())
}

/// Built-in keys, with configured overrides applied.
pub fn builtin_bindings(overrides: &BTreeMap<String, String>) -> Result<Vec<(Builtin, KeySeq)>> {
    for name in overrides.keys() {
        if Builtin::from_name(name).is_none() {
            return Err(MenuError::definition(format!(
                "builtin_keys: unknown built-in `{}`",
                name
            )));
        }
    }
    Builtin::ALL
        .into_iter()
        .map(|b| {
            let desc = overrides
                .get(b.name())
                .map(String::as_str)
                .unwrap_or(b.default_key());
            Ok((b, KeySeq::parse(desc)?))
        })
        .collect()
}

impl Keymap {
    /// Bind every live suffix plus the built-ins whose keys no suffix uses.
    ///
    /// With `detect_conflicts`, two different commands on the same key, or
    /// on keys where one is a prefix of the other, are an error. The same
    /// command bound twice to one key is not.
    pub fn build(
        prefix: &str,
        suffixes: &[Suffix],
        builtins: &[(Builtin, KeySeq)],
        detect_conflicts: bool,
    ) -> Result<Self> {
        let mut bindings: Vec<Binding> = Vec::with_capacity(suffixes.len() + builtins.len());
        for (idx, s) in suffixes.iter().enumerate() {
            let keys = KeySeq::parse(&s.key)?;
            if let Some(prev) = bindings.iter().find(|b| overlaps(&b.keys, &keys)) {
                if prev.command == s.command && prev.keys == keys {
                    continue;
                }
                if detect_conflicts {
                    let shorter = if prev.keys.len() <= keys.len() {
                        &prev.keys
                    } else {
                        &keys
                    };
                    return Err(MenuError::Conflict {
                        prefix: prefix.to_string(),
                        key: shorter.to_string(),
                        first: prev.command.clone(),
                        second: s.command.clone(),
                    });
                }
                tracing::debug!(prefix, key = %keys, command = %s.command, "shadowed key");
            }
            bindings.push(Binding {
                keys,
                command: s.command.clone(),
                target: Target::Suffix(idx),
            });
        }

        let suffix_count = bindings.len();
        for (b, keys) in builtins {
            if bindings[..suffix_count].iter().any(|s| overlaps(&s.keys, keys)) {
                continue;
            }
            bindings.push(Binding {
                keys: keys.clone(),
                command: b.name().to_string(),
                target: Target::Builtin(*b),
            });
        }

        Ok(Self {
            prefix: prefix.to_string(),
            bindings,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Exact matches win over longer keys they are a prefix of.
    pub fn lookup(&self, strokes: &[KeyStroke]) -> Lookup {
        if let Some(b) = self.bindings.iter().find(|b| b.keys.strokes() == strokes) {
            return Lookup::Command(b.clone());
        }
        if self
            .bindings
            .iter()
            .any(|b| b.keys.len() > strokes.len() && b.keys.starts_with(strokes))
        {
            return Lookup::Prefix;
        }
        Lookup::None
    }

    /// Keys that can still complete from `strokes`.
    pub fn reachable(&self, strokes: &[KeyStroke]) -> Vec<String> {
        self.bindings
            .iter()
            .filter(|b| b.keys.starts_with(strokes))
            .map(|b| b.keys.to_string())
            .collect()
    }

    pub fn key_for(&self, command: &str) -> Option<&KeySeq> {
        self.bindings
            .iter()
            .find(|b| b.command == command)
            .map(|b| &b.keys)
    }
}

#[cfg(test)]
#[path = "../tests/dispatch/keymap_tests.rs"]
mod tests;
