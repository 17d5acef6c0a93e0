//! Sidebar navigation state: per-node expansion, click handling and the
//! active-route highlighting rules.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::icon::Icon;
use super::tree::{self, MenuItem};

pub const TITLE: &str = "ERP Admin";
pub const SHORT_TITLE: &str = "EA";

/// What a click on a sidebar entry did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarAction {
    Navigate(String),
    Toggled { id: i64, expanded: bool },
    /// Parent clicked while the sidebar is collapsed, or unknown id
    Ignored,
}

/// Expansion state keyed by menu id. Entries default to collapsed and are
/// independent of each other: collapsing a parent keeps whatever its
/// descendants had.
#[derive(Debug, Clone, Default)]
pub struct Sidebar {
    expanded: HashMap<i64, bool>,
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: i64) -> bool {
        self.expanded.get(&id).copied().unwrap_or(false)
    }

    /// Flip one entry and return its new state
    pub fn toggle(&mut self, id: i64) -> bool {
        let state = self.expanded.entry(id).or_insert(false);
        *state = !*state;
        *state
    }

    pub fn set_expanded(&mut self, id: i64, expanded: bool) {
        self.expanded.insert(id, expanded);
    }

    pub fn expand_all(&mut self, nodes: &[MenuItem]) {
        for node in tree::walk(nodes) {
            if node.has_children() {
                self.expanded.insert(node.id, true);
            }
        }
    }

    /// Routed entries navigate; the rest toggle, but only while the
    /// sidebar is open.
    pub fn click(&mut self, node: &MenuItem, sidebar_open: bool) -> SidebarAction {
        if node.has_route() {
            return SidebarAction::Navigate(node.route.clone());
        }
        if !sidebar_open {
            return SidebarAction::Ignored;
        }
        let expanded = self.toggle(node.id);
        tracing::debug!(menu_id = node.id, expanded, "sidebar entry toggled");
        SidebarAction::Toggled { id: node.id, expanded }
    }

    pub fn click_id(&mut self, nodes: &[MenuItem], id: i64, sidebar_open: bool) -> SidebarAction {
        match tree::find(nodes, id) {
            Some(node) => {
                let node = node.clone();
                self.click(&node, sidebar_open)
            }
            None => SidebarAction::Ignored,
        }
    }

    pub fn render(&self, nodes: &[MenuItem], current_route: Option<&str>, open: bool) -> SidebarView {
        let mut lines = Vec::new();
        for node in nodes {
            self.render_node(node, 0, current_route, open, &mut lines);
        }
        SidebarView {
            title: if open { TITLE } else { SHORT_TITLE }.to_string(),
            open,
            lines,
        }
    }

    fn render_node(
        &self,
        node: &MenuItem,
        depth: usize,
        current_route: Option<&str>,
        open: bool,
        lines: &mut Vec<SidebarLine>,
    ) {
        let expanded = self.is_expanded(node.id);
        let kind = if node.has_route() {
            LineKind::Link {
                route: node.route.clone(),
                active: is_active(node, current_route),
            }
        } else {
            LineKind::Parent {
                expanded: node.has_children().then_some(expanded),
                child_active: has_active_descendant(node, current_route),
            }
        };

        lines.push(SidebarLine {
            id: node.id,
            depth,
            icon: Icon::from_name(&node.icon),
            label: open.then(|| node.name.clone()),
            kind,
        });

        if node.has_children() && open && expanded {
            for child in &node.children {
                self.render_node(child, depth + 1, current_route, open, lines);
            }
        }
    }
}

/// Exact string match against a routed entry
pub fn is_active(node: &MenuItem, current_route: Option<&str>) -> bool {
    node.has_route() && current_route == Some(node.route.as_str())
}

/// Looks two levels down only: a direct child or a grandchild on the
/// current route.
pub fn has_active_descendant(node: &MenuItem, current_route: Option<&str>) -> bool {
    let Some(current) = current_route else {
        return false;
    };
    node.children.iter().any(|child| {
        child.route == current || child.children.iter().any(|grandchild| grandchild.route == current)
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineKind {
    Link { route: String, active: bool },
    /// `expanded` is `None` for a parent without children
    Parent { expanded: Option<bool>, child_active: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarLine {
    pub id: i64,
    pub depth: usize,
    pub icon: Icon,
    /// Hidden when the sidebar is collapsed
    pub label: Option<String>,
    pub kind: LineKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarView {
    pub title: String,
    pub open: bool,
    pub lines: Vec<SidebarLine>,
}

impl fmt::Display for SidebarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "-".repeat(if self.open { 32 } else { 4 }))?;
        for line in &self.lines {
            let marker = match &line.kind {
                LineKind::Link { active: true, .. } => '>',
                LineKind::Parent { child_active: true, .. } => '*',
                _ => ' ',
            };
            let indent = "  ".repeat(line.depth);
            match &line.label {
                Some(label) => {
                    let chevron = match &line.kind {
                        LineKind::Parent { expanded: Some(true), .. } => " ▾",
                        LineKind::Parent { expanded: Some(false), .. } => " ▸",
                        _ => "",
                    };
                    writeln!(f, "{}{}{} {}{}", marker, indent, line.icon.glyph(), label, chevron)?;
                }
                None => writeln!(f, "{}{}", marker, line.icon.glyph())?,
            }
        }
        Ok(())
    }
}
