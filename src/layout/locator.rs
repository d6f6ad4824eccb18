use std::fmt;

use super::*;
use crate::key::KeySeq;

/// Addresses one node of a layout tree.
///
/// Duplicate keys or commands resolve to the first match in pre-order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Locator {
    Command(CommandId),
    Key(String),
    /// Child indices from the top level down; negative indices count from the
    /// end. An optional final step searches the addressed group's children.
    Path(Vec<isize>, Option<PathStep>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathStep {
    Command(CommandId),
    Key(String),
}

impl Locator {
    pub fn command(c: impl Into<String>) -> Self {
        Locator::Command(c.into())
    }

    pub fn key(k: impl Into<String>) -> Self {
        Locator::Key(k.into())
    }

    pub fn path(indices: impl IntoIterator<Item = isize>) -> Self {
        Locator::Path(indices.into_iter().collect(), None)
    }

    /// A symbol is a command, a string a key, a vector a coordinate path.
    pub fn from_lit(lit: &Lit) -> Result<Self> {
        match lit {
            Lit::Sym(s) => Ok(Locator::Command(s.clone())),
            Lit::Str(s) => Ok(Locator::Key(s.clone())),
            Lit::Vector(items) => {
                let mut indices = Vec::new();
                let mut step = None;
                for (i, it) in items.iter().enumerate() {
                    match it {
                        Lit::Int(n) if step.is_none() => indices.push(*n as isize),
                        Lit::Sym(s) if i + 1 == items.len() => {
                            step = Some(PathStep::Command(s.clone()))
                        }
                        Lit::Str(s) if i + 1 == items.len() => step = Some(PathStep::Key(s.clone())),
                        other => {
                            return Err(MenuError::definition(format!(
                                "bad coordinate element `{}` in locator {}",
                                other, lit
                            )));
                        }
                    }
                }
                if indices.is_empty() {
                    return Err(MenuError::definition(format!(
                        "coordinate locator {} has no indices",
                        lit
                    )));
                }
                Ok(Locator::Path(indices, step))
            }
            other => Err(MenuError::definition(format!(
                "a locator must be a command, key or coordinate vector, got `{}`",
                other
            ))),
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Self::from_lit(&crate::literal::parse_one(s)?)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Command(c) => write!(f, "{}", c),
            Locator::Key(k) => write!(f, "{:?}", k),
            Locator::Path(ix, step) => {
                let mut parts = ix.iter().map(|i| i.to_string()).collect::<Vec<_>>();
                match step {
                    Some(PathStep::Command(c)) => parts.push(c.clone()),
                    Some(PathStep::Key(k)) => parts.push(format!("{:?}", k)),
                    None => {}
                }
                write!(f, "[{}]", parts.join(" "))
            }
        }
    }
}

pub(crate) fn keys_equal(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (KeySeq::parse(a), KeySeq::parse(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

fn matches_step(node: &LayoutNode, step: &PathStep) -> bool {
    match (node, step) {
        (LayoutNode::Suffix(s), PathStep::Command(c)) => &s.command == c,
        (LayoutNode::Suffix(s), PathStep::Key(k)) => keys_equal(&s.key, k),
        _ => false,
    }
}

fn find_preorder(nodes: &[LayoutNode], step: &PathStep, addr: &mut Vec<usize>) -> bool {
    for (i, n) in nodes.iter().enumerate() {
        addr.push(i);
        if matches_step(n, step) {
            return true;
        }
        if let LayoutNode::Group(g) = n
            && find_preorder(&g.children, step, addr)
        {
            return true;
        }
        addr.pop();
    }
    false
}

fn resolve_index(i: isize, len: usize) -> Option<usize> {
    let idx = if i < 0 { len as isize + i } else { i };
    (0..len as isize).contains(&idx).then_some(idx as usize)
}

/// Address (child indices from the top level) of the located node.
pub fn locate(layout: &[LayoutNode], loc: &Locator) -> Option<Vec<usize>> {
    match loc {
        Locator::Command(c) => {
            let mut addr = Vec::new();
            find_preorder(layout, &PathStep::Command(c.clone()), &mut addr).then_some(addr)
        }
        Locator::Key(k) => {
            let mut addr = Vec::new();
            find_preorder(layout, &PathStep::Key(k.clone()), &mut addr).then_some(addr)
        }
        Locator::Path(indices, step) => {
            let mut addr = Vec::new();
            let mut nodes = layout;
            let mut current: Option<&LayoutNode> = None;
            for &i in indices {
                if let Some(node) = current {
                    nodes = node.as_group()?.children.as_slice();
                }
                let idx = resolve_index(i, nodes.len())?;
                addr.push(idx);
                current = Some(&nodes[idx]);
            }
            if let Some(step) = step {
                let children = &current?.as_group()?.children;
                let pos = children.iter().position(|c| matches_step(c, step))?;
                addr.push(pos);
            }
            Some(addr)
        }
    }
}

pub(crate) fn node_at<'a>(layout: &'a [LayoutNode], addr: &[usize]) -> Option<&'a LayoutNode> {
    let (first, rest) = addr.split_first()?;
    let mut node = layout.get(*first)?;
    for &i in rest {
        node = node.as_group()?.children.get(i)?;
    }
    Some(node)
}

#[cfg(test)]
#[path = "../tests/layout/locator_tests.rs"]
mod tests;
