//! Tree dump and snapshot
//!
//! [`Document::to_tree`] renders a box-drawing outline for debugging.
//! [`NodeSnapshot`] is a normalized, serializable view of the same tree,
//! suitable for JSON output and snapshot tests.

use super::document::Document;
use super::node::{NodeId, NodeKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const LABEL_PREVIEW: usize = 20;

/// A serializable snapshot of a node and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Variant name (e.g., "Section", "Text")
    pub node_type: String,

    /// Primary label, as shown by the tree dump
    pub label: String,

    /// Variant-specific attributes in a stable order
    pub attributes: IndexMap<String, String>,

    /// Argument groups first, then body children
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn new(node_type: impl Into<String>, label: impl Into<String>) -> Self {
        NodeSnapshot {
            node_type: node_type.into(),
            label: label.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
}

impl Document {
    /// Indented outline of the whole document
    pub fn to_tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(self.root(), "", true, &mut out);
        out
    }

    fn write_tree(&self, id: NodeId, prefix: &str, last: bool, out: &mut String) {
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        out.push_str(&self.describe(id));
        out.push('\n');

        let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
        let subnodes = self.subnodes(id);
        let count = subnodes.len();
        for (i, child) in subnodes.into_iter().enumerate() {
            self.write_tree(child, &child_prefix, i + 1 == count, out);
        }
    }

    /// One-line description of a node
    pub fn describe(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Document => "Document".to_string(),
            NodeKind::Environment(data) => format!("Environment: {}", data.name),
            NodeKind::Command(data) => format!("Command: \\{}", data.name),
            NodeKind::Section(section) => {
                let level = match section.level {
                    1 => "Section".to_string(),
                    2 => "Subsection".to_string(),
                    3 => "Subsubsection".to_string(),
                    n => format!("Level {}", n),
                };
                format!("{}: {}", level, self.title_text(id))
            }
            NodeKind::Footnote(_) => "Footnote".to_string(),
            NodeKind::Cite(cite) => format!("Cite: {}", cite.keys.join(", ")),
            NodeKind::Paragraph(_) => "Paragraph".to_string(),
            NodeKind::Text(text) => format!("Text: '{}'", preview(&text.content)),
            NodeKind::Math(math) => {
                let mode = if math.display { "Display" } else { "Inline" };
                format!("Math ({}): '{}'", mode, preview(&math.content))
            }
            NodeKind::Group(group) => {
                let flavour = if group.optional { "optional" } else { "required" };
                format!("Group ({})", flavour)
            }
            NodeKind::SpecialChar(c) => format!("SpecialChar: '{}'", c),
        }
    }

    /// Snapshot of the whole document
    pub fn snapshot(&self) -> NodeSnapshot {
        self.snapshot_node(self.root())
    }

    pub fn snapshot_node(&self, id: NodeId) -> NodeSnapshot {
        let kind = self.kind(id);
        let mut snapshot = NodeSnapshot::new(kind.type_name(), self.describe(id));

        snapshot = match kind {
            NodeKind::Environment(data) | NodeKind::Command(data) => {
                snapshot.with_attribute("name", &data.name)
            }
            NodeKind::Section(section) => {
                let mut s = snapshot
                    .with_attribute("name", &section.command.name)
                    .with_attribute("level", section.level)
                    .with_attribute("numbered", section.numbered);
                if let Some(label) = &section.label {
                    s = s.with_attribute("label", label);
                }
                s
            }
            NodeKind::Footnote(footnote) => snapshot.with_attribute("name", &footnote.command.name),
            NodeKind::Cite(cite) => snapshot
                .with_attribute("name", &cite.command.name)
                .with_attribute("keys", cite.keys.join(",")),
            NodeKind::Text(text) => {
                let mut s = snapshot.with_attribute("position", text.position);
                if !text.source_ranges.is_empty() {
                    s = s.with_attribute("ranges", text.source_ranges.len());
                }
                if text.from_newline {
                    s = s.with_attribute("from_newline", true);
                }
                s
            }
            NodeKind::Math(math) => snapshot.with_attribute("display", math.display),
            NodeKind::Group(group) => snapshot.with_attribute("optional", group.optional),
            NodeKind::Document | NodeKind::Paragraph(_) | NodeKind::SpecialChar(_) => snapshot,
        };

        snapshot.children = self
            .subnodes(id)
            .into_iter()
            .map(|child| self.snapshot_node(child))
            .collect();
        snapshot
    }

    /// The document snapshot as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

fn preview(content: &str) -> String {
    let escaped = content.replace('\n', "\\n");
    if escaped.chars().count() > LABEL_PREVIEW {
        let head: String = escaped.chars().take(LABEL_PREVIEW).collect();
        format!("{}...", head)
    } else {
        escaped
    }
}
