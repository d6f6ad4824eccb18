use super::*;
use crate::literal::Lit;
use crate::model::{GroupClass, SuffixClass};

/// Compile the group literals of one prefix into its layout tree.
pub fn compile_layout(prefix: &str, groups: &[Lit]) -> Result<Vec<LayoutNode>> {
    let mut out = Vec::with_capacity(groups.len());
    for g in groups {
        match g {
            Lit::Vector(_) => out.push(LayoutNode::Group(compile_group(prefix, g)?)),
            other => {
                return Err(MenuError::definition(format!(
                    "{}: top-level layout elements must be groups, got {} `{}`",
                    prefix,
                    other.kind_name(),
                    other
                )));
            }
        }
    }
    Ok(out)
}

/// `[LEVEL? DESCRIPTION? :KEYWORD VALUE... ELEMENT...]`
pub fn compile_group(prefix: &str, lit: &Lit) -> Result<Group> {
    let Lit::Vector(items) = lit else {
        return Err(MenuError::definition(format!(
            "{}: a group must be a vector, got `{}`",
            prefix, lit
        )));
    };

    let mut g = Group::new(GroupClass::Column);
    let mut i = 0;
    if let Some(Lit::Int(_)) = items.first() {
        g.level = Some(parse_level(&items[0])?);
        i += 1;
    }
    if let Some(Lit::Str(s)) = items.get(i) {
        g.description = Some(Description::Text(s.clone()));
        i += 1;
    }

    let mut explicit_class = false;
    while let Some(Lit::Kw(kw)) = items.get(i) {
        let value = items.get(i + 1).ok_or_else(|| {
            MenuError::definition(format!("{}: group keyword :{} has no value", prefix, kw))
        })?;
        g.set_property(kw, value)
            .map_err(|e| MenuError::definition(format!("{}: {}", prefix, inner_message(e))))?;
        explicit_class |= kw == "class";
        i += 2;
    }

    for child in &items[i..] {
        let node = match child {
            Lit::Vector(_) => LayoutNode::Group(compile_group(prefix, child)?),
            Lit::List(_) => LayoutNode::Suffix(compile_suffix(prefix, child)?),
            Lit::Str(s) => LayoutNode::Text(TextNode {
                level: None,
                text: s.clone(),
            }),
            other => {
                return Err(MenuError::definition(format!(
                    "{}: unexpected {} `{}` in group",
                    prefix,
                    other.kind_name(),
                    other
                )));
            }
        };
        g.children.push(node);
    }

    if !explicit_class && g.children.iter().any(LayoutNode::is_group) {
        g.class = GroupClass::Columns;
    }
    check_children(prefix, &g)?;
    Ok(g)
}

/// Groups hold either groups or suffix/text nodes, never both.
pub(super) fn check_children(prefix: &str, g: &Group) -> Result<()> {
    let groups = g.children.iter().filter(|c| c.is_group()).count();
    if groups != 0 && groups != g.children.len() {
        return Err(MenuError::definition(format!(
            "{}: groups and suffixes cannot be siblings",
            prefix
        )));
    }
    if !g.children.is_empty() && (groups != 0) != g.class.holds_groups() {
        return Err(MenuError::definition(format!(
            "{}: group class {:?} cannot hold {}",
            prefix,
            g.class,
            if groups != 0 { "groups" } else { "suffixes" }
        )));
    }
    Ok(())
}

/// `(LEVEL? KEY DESCRIPTION? COMMAND-OR-ARGUMENT :KEYWORD VALUE...)`
pub fn compile_suffix(prefix: &str, lit: &Lit) -> Result<SuffixSpec> {
    let Lit::List(items) = lit else {
        return Err(MenuError::definition(format!(
            "{}: a suffix must be a list, got `{}`",
            prefix, lit
        )));
    };

    let mut i = 0;
    let mut level = None;
    if let Some(Lit::Int(_)) = items.first() {
        level = Some(parse_level(&items[0])?);
        i += 1;
    }

    let key = match items.get(i) {
        Some(Lit::Str(k)) => k.clone(),
        Some(Lit::Kw(_)) => String::new(),
        other => {
            return Err(MenuError::definition(format!(
                "{}: suffix must start with a key string, got {}",
                prefix,
                other.map(|o| o.to_string()).unwrap_or_else(|| "nothing".into())
            )));
        }
    };
    if !key.is_empty() {
        i += 1;
    }

    let mut spec = SuffixSpec::new(key, String::new());
    spec.level = level;

    if let Some(Lit::Str(d)) = items.get(i) {
        spec.description = Some(Description::Text(d.clone()));
        i += 1;
    }

    match items.get(i) {
        Some(Lit::Sym(cmd)) => {
            spec.command = cmd.clone();
            i += 1;
        }
        Some(Lit::Str(arg)) => {
            spec.argument = Some(arg.clone());
            i += 1;
        }
        Some(pair @ (Lit::List(_) | Lit::Vector(_))) => {
            let parts = pair.string_list().filter(|p| p.len() == 2).ok_or_else(|| {
                MenuError::definition(format!(
                    "{}: expected (SHORTARG ARGUMENT), got `{}`",
                    prefix, pair
                ))
            })?;
            spec.shortarg = Some(parts[0].clone());
            spec.argument = Some(parts[1].clone());
            i += 1;
        }
        Some(Lit::Kw(_)) | None => {}
        Some(other) => {
            return Err(MenuError::definition(format!(
                "{}: expected a command or argument, got {} `{}`",
                prefix,
                other.kind_name(),
                other
            )));
        }
    }

    let mut explicit_class = false;
    while i < items.len() {
        let Lit::Kw(kw) = &items[i] else {
            return Err(MenuError::definition(format!(
                "{}: unexpected `{}` in suffix {}",
                prefix, items[i], lit
            )));
        };
        let value = items.get(i + 1).ok_or_else(|| {
            MenuError::definition(format!("{}: keyword :{} has no value", prefix, kw))
        })?;
        spec.set_property(kw, value)
            .map_err(|e| MenuError::definition(format!("{}: {}", prefix, inner_message(e))))?;
        explicit_class |= kw == "class";
        i += 2;
    }

    if spec.key.is_empty() {
        return Err(MenuError::definition(format!(
            "{}: suffix {} has no key",
            prefix, lit
        )));
    }

    if !explicit_class {
        spec.class = infer_class(&spec);
    }

    if spec.shortarg.is_none()
        && let Some(arg) = spec.argument.as_deref()
    {
        spec.shortarg = derive_shortarg(arg);
    }

    if spec.command.is_empty() {
        let Some(ident) = spec
            .argument
            .clone()
            .or_else(|| spec.variable.clone())
            .or_else(|| spec.argument_format.clone())
        else {
            return Err(MenuError::definition(format!(
                "{}: suffix `{}` has neither a command nor an argument",
                prefix, spec.key
            )));
        };
        spec.command = format!("{}:{}", prefix, ident);
        spec.anonymous = true;
    }

    if spec.class == SuffixClass::Switches && spec.choices.is_empty() {
        return Err(MenuError::definition(format!(
            "{}: switches `{}` needs :choices",
            prefix, spec.key
        )));
    }

    Ok(spec)
}

/// A suffix defined once under its command name and referenced from layouts
/// by that name: `(define-infix NAME :KEYWORD VALUE...)`. The key is
/// optional here; the layout that binds the command supplies it.
pub fn compile_command_spec(command: &str, items: &[Lit]) -> Result<SuffixSpec> {
    let mut spec = SuffixSpec::new(String::new(), command);
    let mut explicit_class = false;
    for pair in items.chunks(2) {
        let [Lit::Kw(kw), value] = pair else {
            return Err(MenuError::definition(format!(
                "{}: expected :KEYWORD VALUE pairs, got `{}`",
                command, pair[0]
            )));
        };
        spec.set_property(kw, value)
            .map_err(|e| MenuError::definition(format!("{}: {}", command, inner_message(e))))?;
        explicit_class |= kw == "class";
    }
    if !explicit_class {
        spec.class = infer_class(&spec);
    }
    if spec.shortarg.is_none()
        && let Some(arg) = spec.argument.as_deref()
    {
        spec.shortarg = derive_shortarg(arg);
    }
    Ok(spec)
}

/// Overlay a layout reference onto a command's own definition. The layout
/// supplies placement (key, level, description, predicates, transient); the
/// definition supplies everything else.
pub fn merge_command_spec(base: &SuffixSpec, layout: &SuffixSpec) -> SuffixSpec {
    let mut out = base.clone();
    if !layout.key.is_empty() {
        out.key = layout.key.clone();
    }
    out.level = layout.level.or(base.level);
    out.description = layout.description.clone().or_else(|| base.description.clone());
    out.transient = layout.transient.clone().or_else(|| base.transient.clone());
    if !layout.predicates.is_empty() {
        out.predicates = layout.predicates.clone();
    }
    out.format = layout.format.clone().or_else(|| base.format.clone());
    out
}

fn infer_class(spec: &SuffixSpec) -> SuffixClass {
    if spec.variable.is_some() {
        return SuffixClass::Variable;
    }
    if spec.argument_format.is_some() {
        return SuffixClass::Switches;
    }
    match spec.argument.as_deref() {
        Some(crate::model::FILES_ARGUMENT) => SuffixClass::Files,
        Some(arg) if arg.ends_with('=') => SuffixClass::Option,
        Some(_) => SuffixClass::Switch,
        None => SuffixClass::Plain,
    }
}

/// `-a` and `-a=` have the short form `-a`.
fn derive_shortarg(arg: &str) -> Option<String> {
    let bare = arg.strip_suffix('=').unwrap_or(arg);
    let mut chars = bare.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('-'), Some(c), None) if c.is_ascii_alphabetic() => Some(bare.to_string()),
        _ => None,
    }
}

fn inner_message(e: MenuError) -> String {
    match e {
        MenuError::Definition(m) => m,
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "../tests/layout/compile_tests.rs"]
mod tests;
