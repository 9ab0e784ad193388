//! Text reconstruction.
//!
//! Every variant knows how to flatten itself back to text. Groups nested as
//! children keep their delimiters; argument groups are rendered by their
//! owner.

use super::document::Document;
use super::node::{NodeId, NodeKind};

impl Document {
    /// Flattened text of the subtree rooted at `id`.
    ///
    /// Paragraph texts are cached on first computation. Use
    /// [`Document::refresh_text_content`] after mutating the tree.
    pub fn text_content(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Document | NodeKind::Group(_) => self.children_text(id),
            NodeKind::Text(text) => text.content.clone(),
            NodeKind::Math(math) => math.wrapped(),
            NodeKind::SpecialChar(c) => c.to_string(),
            NodeKind::Paragraph(paragraph) => paragraph
                .text_cache
                .get_or_init(|| self.paragraph_text(id))
                .clone(),
            NodeKind::Environment(data) => {
                let mut result = format!("\\begin{{{}}}", data.name);
                for option in &data.options {
                    result.push('[');
                    result.push_str(&self.text_content(*option));
                    result.push(']');
                }
                for param in &data.parameters {
                    result.push('{');
                    result.push_str(&self.text_content(*param));
                    result.push('}');
                }
                result.push_str(&self.children_text(id));
                result.push_str(&format!("\\end{{{}}}", data.name));
                result
            }
            NodeKind::Command(_)
            | NodeKind::Section(_)
            | NodeKind::Footnote(_)
            | NodeKind::Cite(_) => {
                let mut result: String = self
                    .kind(id)
                    .command_data()
                    .map(|data| {
                        data.parameters
                            .iter()
                            .map(|param| self.text_content(*param))
                            .collect()
                    })
                    .unwrap_or_default();
                result.push_str(&self.children_text(id));
                result
            }
        }
    }

    /// Text of the whole document
    pub fn full_text(&self) -> String {
        self.text_content(self.root())
    }

    /// Math formula without delimiters. `None` if `id` is not math.
    pub fn math_content(&self, id: NodeId) -> Option<&str> {
        self.kind(id).as_math().map(|math| math.content.as_str())
    }

    /// Flattened title of a section. Empty if it has none.
    pub fn title_text(&self, section: NodeId) -> String {
        self.kind(section)
            .as_section()
            .and_then(|data| data.title())
            .map(|title| self.text_content(title))
            .unwrap_or_default()
    }

    /// Flattened short title (`\section[short]{long}`). Empty if it has none.
    pub fn short_title_text(&self, section: NodeId) -> String {
        self.kind(section)
            .as_section()
            .and_then(|data| data.short_title())
            .map(|title| self.text_content(title))
            .unwrap_or_default()
    }

    fn children_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .map(|child| self.rendered_child(*child))
            .collect()
    }

    fn rendered_child(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Group(group) => {
                let (open, close) = group.delimiters();
                format!("{}{}{}", open, self.text_content(id), close)
            }
            _ => self.text_content(id),
        }
    }

    fn paragraph_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .map(|child| self.rendered_child(*child))
            .filter(|text| text != " ")
            .collect::<Vec<_>>()
            .join(" ")
    }
}
