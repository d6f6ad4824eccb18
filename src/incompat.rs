//! Mutually exclusive arguments.

use crate::object::{Infix, InfixValue, Suffix};

/// Sets infix values and unsets the arguments they are incompatible with.
pub struct Resolver<'a> {
    groups: &'a [Vec<String>],
    resolving: bool,
}

fn in_group(infix: &dyn Infix, arg: &str) -> bool {
    infix.identity().as_deref() == Some(arg) || infix.matches_argument(arg)
}

impl<'a> Resolver<'a> {
    pub fn new(groups: &'a [Vec<String>]) -> Self {
        Self {
            groups,
            resolving: false,
        }
    }

    /// Store `value` on `suffixes[idx]`. When the value is set, every other
    /// live infix sharing a group with it is unset through this same method;
    /// those unsets never cascade further. Returns the unset indices.
    pub fn set(&mut self, suffixes: &mut [Suffix], idx: usize, value: InfixValue) -> Vec<usize> {
        let Some(infix) = suffixes.get_mut(idx).and_then(Suffix::infix_mut) else {
            return Vec::new();
        };
        infix.store_value(value);
        if self.resolving || !infix.value().is_set() {
            return Vec::new();
        }

        let victims = self.conflicts(suffixes, idx);
        self.resolving = true;
        for &j in &victims {
            tracing::debug!(
                set = %suffixes[idx].command,
                unset = %suffixes[j].command,
                "incompatible arguments"
            );
            self.set(suffixes, j, InfixValue::Unset);
        }
        self.resolving = false;
        victims
    }

    fn conflicts(&self, suffixes: &[Suffix], idx: usize) -> Vec<usize> {
        let Some(target) = suffixes.get(idx).and_then(Suffix::infix) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for group in self.groups {
            if !group.iter().any(|a| in_group(target, a)) {
                continue;
            }
            for (j, s) in suffixes.iter().enumerate() {
                let Some(other) = s.infix() else { continue };
                if j == idx || out.contains(&j) || !other.value().is_set() {
                    continue;
                }
                let clash = group
                    .iter()
                    .any(|a| !in_group(target, a) && other.matches_argument(a));
                if clash {
                    out.push(j);
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "tests/incompat_tests.rs"]
mod tests;
