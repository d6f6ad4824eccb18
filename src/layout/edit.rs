use super::compile::check_children;
use super::locator::{keys_equal, node_at};
use super::*;

fn not_found(loc: &Locator) -> MenuError {
    MenuError::Locator(loc.to_string())
}

fn siblings_mut<'a>(
    layout: &'a mut Vec<LayoutNode>,
    parent: &[usize],
) -> Option<&'a mut Vec<LayoutNode>> {
    let mut nodes = layout;
    for &i in parent {
        match nodes.get_mut(i)? {
            LayoutNode::Group(g) => nodes = &mut g.children,
            _ => return None,
        }
    }
    Some(nodes)
}

fn group_at<'a>(layout: &'a [LayoutNode], parent: &[usize]) -> Option<&'a Group> {
    if parent.is_empty() {
        return None;
    }
    node_at(layout, parent)?.as_group()
}

/// The tree stays well formed after placing `node` among `parent`'s children.
fn check_placement(
    prefix: &str,
    layout: &[LayoutNode],
    parent: &[usize],
    node: &LayoutNode,
) -> Result<()> {
    match group_at(layout, parent) {
        None if !node.is_group() => Err(MenuError::definition(format!(
            "{}: only groups can be placed at the top level",
            prefix
        ))),
        None => Ok(()),
        Some(g) => {
            let mut probe = g.clone();
            probe.children.push(node.clone());
            check_children(prefix, &probe)
        }
    }
}

/// Remove suffixes bound to the same key and command as `node`, except the
/// one at `keep`. Returns `keep` adjusted for the removals.
fn drop_duplicates(
    layout: &mut Vec<LayoutNode>,
    node: &LayoutNode,
    mut keep: Vec<usize>,
    keep_is_target: bool,
) -> Vec<usize> {
    let LayoutNode::Suffix(new) = node else {
        return keep;
    };
    loop {
        let Some(dup) = find_dup(layout, new, &keep, keep_is_target) else {
            return keep;
        };
        let Some((dup_idx, dup_parent)) = dup.split_last() else {
            return keep;
        };
        if let Some(sibs) = siblings_mut(layout, dup_parent) {
            sibs.remove(*dup_idx);
        }
        // Shift the kept address if the removal preceded it under the same parent.
        if keep.len() > dup_parent.len()
            && keep[..dup_parent.len()] == *dup_parent
            && keep[dup_parent.len()] > *dup_idx
        {
            keep[dup_parent.len()] -= 1;
        }
    }
}

fn find_dup(
    layout: &[LayoutNode],
    new: &SuffixSpec,
    keep: &[usize],
    keep_is_target: bool,
) -> Option<Vec<usize>> {
    fn walk(
        nodes: &[LayoutNode],
        new: &SuffixSpec,
        keep: &[usize],
        keep_is_target: bool,
        addr: &mut Vec<usize>,
    ) -> Option<Vec<usize>> {
        for (i, n) in nodes.iter().enumerate() {
            addr.push(i);
            match n {
                LayoutNode::Suffix(s)
                    if s.command == new.command
                        && keys_equal(&s.key, &new.key)
                        && !(keep_is_target && addr.as_slice() == keep) =>
                {
                    return Some(addr.clone());
                }
                LayoutNode::Group(g) => {
                    if let Some(found) = walk(&g.children, new, keep, keep_is_target, addr) {
                        return Some(found);
                    }
                }
                _ => {}
            }
            addr.pop();
        }
        None
    }
    walk(layout, new, keep, keep_is_target, &mut Vec::new())
}

fn insert_at(
    prefix: &str,
    layout: &mut Vec<LayoutNode>,
    loc: &Locator,
    node: LayoutNode,
    after: bool,
) -> Result<()> {
    let addr = locate(layout, loc).ok_or_else(|| not_found(loc))?;
    let addr = drop_duplicates(layout, &node, addr, false);
    let (idx, parent) = addr.split_last().ok_or_else(|| not_found(loc))?;
    check_placement(prefix, layout, parent, &node)?;
    let sibs = siblings_mut(layout, parent).ok_or_else(|| not_found(loc))?;
    let at = if after { idx + 1 } else { *idx };
    sibs.insert(at.min(sibs.len()), node);
    Ok(())
}

pub fn insert_before(
    prefix: &str,
    layout: &mut Vec<LayoutNode>,
    loc: &Locator,
    node: LayoutNode,
) -> Result<()> {
    insert_at(prefix, layout, loc, node, false)
}

pub fn insert_after(
    prefix: &str,
    layout: &mut Vec<LayoutNode>,
    loc: &Locator,
    node: LayoutNode,
) -> Result<()> {
    insert_at(prefix, layout, loc, node, true)
}

pub fn replace(
    prefix: &str,
    layout: &mut Vec<LayoutNode>,
    loc: &Locator,
    node: LayoutNode,
) -> Result<LayoutNode> {
    let addr = locate(layout, loc).ok_or_else(|| not_found(loc))?;
    let addr = drop_duplicates(layout, &node, addr, true);
    let (idx, parent) = addr.split_last().ok_or_else(|| not_found(loc))?;

    // Validate against the siblings that remain after the swap.
    if let Some(g) = group_at(layout, parent) {
        let mut probe = g.clone();
        probe.children[*idx] = node.clone();
        check_children(prefix, &probe)?;
    } else if !node.is_group() {
        return Err(MenuError::definition(format!(
            "{}: only groups can be placed at the top level",
            prefix
        )));
    }

    let sibs = siblings_mut(layout, parent).ok_or_else(|| not_found(loc))?;
    Ok(std::mem::replace(&mut sibs[*idx], node))
}

pub fn remove(layout: &mut Vec<LayoutNode>, loc: &Locator) -> Result<LayoutNode> {
    let addr = locate(layout, loc).ok_or_else(|| not_found(loc))?;
    let (idx, parent) = addr.split_last().ok_or_else(|| not_found(loc))?;
    let sibs = siblings_mut(layout, parent).ok_or_else(|| not_found(loc))?;
    Ok(sibs.remove(*idx))
}

pub fn get_node<'a>(layout: &'a [LayoutNode], loc: &Locator) -> Option<&'a LayoutNode> {
    node_at(layout, &locate(layout, loc)?)
}

pub fn set_property(
    layout: &mut Vec<LayoutNode>,
    loc: &Locator,
    key: &str,
    value: &Lit,
) -> Result<()> {
    let addr = locate(layout, loc).ok_or_else(|| not_found(loc))?;
    let (idx, parent) = addr.split_last().ok_or_else(|| not_found(loc))?;
    let sibs = siblings_mut(layout, parent).ok_or_else(|| not_found(loc))?;
    match &mut sibs[*idx] {
        LayoutNode::Group(g) => g.set_property(key, value),
        LayoutNode::Suffix(s) => s.set_property(key, value),
        LayoutNode::Text(t) => match key {
            "level" => {
                t.level = Some(parse_level(value)?);
                Ok(())
            }
            "description" => {
                t.text = value
                    .as_str()
                    .ok_or_else(|| MenuError::definition("text must be a string"))?
                    .to_string();
                Ok(())
            }
            _ => Err(MenuError::definition(format!(
                "unknown text property :{}",
                key
            ))),
        },
    }
}

#[cfg(test)]
#[path = "../tests/layout/edit_tests.rs"]
mod tests;
