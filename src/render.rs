//! Render model handed to the host. The engine never draws; it describes.

use crate::model::GroupClass;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    Plain,
    Key,
    Description,
    ValueActive,
    ValueInactive,
    Inapt,
    Heading,
    Level,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub face: Face,
}

impl Segment {
    pub fn new(text: impl Into<String>, face: Face) -> Self {
        Self {
            text: text.into(),
            face,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Face::Plain)
    }
}

pub type Row = Vec<Segment>;

pub fn row_text(row: &[Segment]) -> String {
    row.iter().map(|s| s.text.as_str()).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupView {
    pub heading: Option<String>,
    pub class: GroupClass,
    pub rows: Vec<Row>,
    pub children: Vec<GroupView>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeBanner {
    Help,
    Edit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuView {
    pub title: String,
    pub level: u8,
    pub groups: Vec<GroupView>,
    pub banner: Option<ModeBanner>,
    /// Strokes typed so far of a multi-stroke key.
    pub pending: Option<String>,
    /// Keys reachable from the pending strokes.
    pub reachable: Vec<String>,
    pub value_line: String,
}

impl MenuView {
    /// All rows, depth first; handy for hosts without layout and for tests.
    pub fn lines(&self) -> Vec<String> {
        fn walk(g: &GroupView, out: &mut Vec<String>) {
            if let Some(h) = &g.heading {
                out.push(h.clone());
            }
            for r in &g.rows {
                out.push(row_text(r));
            }
            for c in &g.children {
                walk(c, out);
            }
        }

        let mut out = Vec::new();
        for g in &self.groups {
            walk(g, &mut out);
        }
        out
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
