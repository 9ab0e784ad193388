//! Node kinds and per-variant data.
//!
//! Nodes live in the [`Document`](super::Document) arena and refer to each
//! other through [`NodeId`] handles. Structural links (`parent`, `index`,
//! `children`) are shared by every variant; everything else belongs to the
//! variant's own data struct.

use crate::core::engine::token::Position;
use once_cell::unsync::OnceCell;
use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Heading depth per base command name (trailing `*` stripped)
static SECTION_LEVELS: phf::Map<&'static str, u8> = phf_map! {
    "section" => 1,
    "subsection" => 2,
    "subsubsection" => 3,
    "paragraph" => 4,
    "subparagraph" => 5,
};

/// Handle to a node inside a [`Document`](super::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// A tree node: variant data plus structural links.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// `None` for the root and for nodes pruned out of the tree
    pub parent: Option<NodeId>,
    /// Position among siblings. For argument groups, the slot index.
    pub index: usize,
    pub children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            parent: None,
            index: 0,
            children: Vec::new(),
        }
    }
}

/// Closed set of node variants
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The root
    Document,
    /// `\begin{name}...\end{name}`
    Environment(CommandData),
    /// Any `\name[opt]{req}` without a specialized variant
    Command(CommandData),
    Section(SectionData),
    Footnote(FootnoteData),
    Cite(CiteData),
    Paragraph(ParagraphData),
    Text(TextData),
    Math(MathData),
    Group(GroupData),
    SpecialChar(char),
}

impl NodeKind {
    /// Short variant name, as used by snapshots
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Document => "Document",
            NodeKind::Environment(_) => "Environment",
            NodeKind::Command(_) => "Command",
            NodeKind::Section(_) => "Section",
            NodeKind::Footnote(_) => "Footnote",
            NodeKind::Cite(_) => "Cite",
            NodeKind::Paragraph(_) => "Paragraph",
            NodeKind::Text(_) => "Text",
            NodeKind::Math(_) => "Math",
            NodeKind::Group(_) => "Group",
            NodeKind::SpecialChar(_) => "SpecialChar",
        }
    }

    /// Name and argument slots of command-headed variants, environments included
    pub fn command_data(&self) -> Option<&CommandData> {
        match self {
            NodeKind::Environment(data) | NodeKind::Command(data) => Some(data),
            NodeKind::Section(section) => Some(&section.command),
            NodeKind::Footnote(footnote) => Some(&footnote.command),
            NodeKind::Cite(cite) => Some(&cite.command),
            _ => None,
        }
    }

    pub(crate) fn command_data_mut(&mut self) -> Option<&mut CommandData> {
        match self {
            NodeKind::Environment(data) | NodeKind::Command(data) => Some(data),
            NodeKind::Section(section) => Some(&mut section.command),
            NodeKind::Footnote(footnote) => Some(&mut footnote.command),
            NodeKind::Cite(cite) => Some(&mut cite.command),
            _ => None,
        }
    }

    /// True for `Command` and its specializations (not environments)
    pub fn is_command_like(&self) -> bool {
        matches!(
            self,
            NodeKind::Command(_) | NodeKind::Section(_) | NodeKind::Footnote(_) | NodeKind::Cite(_)
        )
    }

    pub fn is_environment(&self) -> bool {
        matches!(self, NodeKind::Environment(_))
    }

    /// Name of an environment or command-headed node
    pub fn name(&self) -> Option<&str> {
        self.command_data().map(|data| data.name.as_str())
    }

    pub fn as_section(&self) -> Option<&SectionData> {
        match self {
            NodeKind::Section(section) => Some(section),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextData> {
        match self {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_math(&self) -> Option<&MathData> {
        match self {
            NodeKind::Math(math) => Some(math),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupData> {
        match self {
            NodeKind::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_footnote(&self) -> Option<&FootnoteData> {
        match self {
            NodeKind::Footnote(footnote) => Some(footnote),
            _ => None,
        }
    }

    pub fn as_cite(&self) -> Option<&CiteData> {
        match self {
            NodeKind::Cite(cite) => Some(cite),
            _ => None,
        }
    }
}

/// Name plus `[..]` and `{..}` argument slots.
///
/// The slots hold group nodes owned by this node; they are not part of the
/// node's `children`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandData {
    pub name: String,
    pub options: Vec<NodeId>,
    pub parameters: Vec<NodeId>,
}

impl CommandData {
    pub fn new(name: impl Into<String>) -> Self {
        CommandData {
            name: name.into(),
            options: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// All `[..]` arguments
    pub fn optional_args(&self) -> &[NodeId] {
        &self.options
    }

    /// All `{..}` arguments
    pub fn required_args(&self) -> &[NodeId] {
        &self.parameters
    }

    pub fn is_section(&self) -> bool {
        ["section", "subsection", "subsubsection"]
            .iter()
            .any(|prefix| self.name.starts_with(prefix))
    }

    pub fn is_footnote(&self) -> bool {
        self.name == "footnote"
    }

    pub fn is_cite(&self) -> bool {
        matches!(self.name.as_str(), "cite" | "citep" | "citet")
    }

    /// Argument groups in source order: options first, then parameters
    pub fn arguments(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.options.iter().chain(self.parameters.iter()).copied()
    }
}

/// A heading command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionData {
    pub command: CommandData,
    /// 1 (section) through 5 (subparagraph)
    pub level: u8,
    pub label: Option<String>,
    /// False for starred headings
    pub numbered: bool,
}

impl SectionData {
    pub fn new(name: &str) -> Self {
        SectionData {
            command: CommandData::new(name),
            level: section_level(name),
            label: None,
            numbered: !name.ends_with('*'),
        }
    }

    /// First required argument
    pub fn title(&self) -> Option<NodeId> {
        self.command.parameters.first().copied()
    }

    /// First optional argument
    pub fn short_title(&self) -> Option<NodeId> {
        self.command.options.first().copied()
    }
}

/// Level of a heading command. Unrecognized names count as level 1.
pub fn section_level(name: &str) -> u8 {
    let base = name.trim_end_matches('*');
    SECTION_LEVELS.get(base).copied().unwrap_or(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootnoteData {
    pub command: CommandData,
    /// First required argument, filled in once arguments are parsed
    pub content: Option<NodeId>,
}

impl FootnoteData {
    pub fn new(name: &str) -> Self {
        FootnoteData {
            command: CommandData::new(name),
            content: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiteData {
    pub command: CommandData,
    pub keys: Vec<String>,
    /// Resolved bibliography entries. Never filled by the parser.
    pub citations: Vec<String>,
}

impl CiteData {
    pub fn new(name: &str) -> Self {
        CiteData {
            command: CommandData::new(name),
            keys: Vec::new(),
            citations: Vec::new(),
        }
    }
}

/// A paragraph and its lazily computed flattened text
#[derive(Debug, Clone, Default)]
pub struct ParagraphData {
    pub(crate) text_cache: OnceCell<String>,
}

impl ParagraphData {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached text, if it has been computed
    pub fn cached_text(&self) -> Option<&str> {
        self.text_cache.get().map(String::as_str)
    }
}

/// Source span of one token folded into a merged text node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl SourceRange {
    pub fn new(start: Position, len: usize) -> Self {
        SourceRange {
            start_line: start.line,
            start_col: start.column,
            end_line: start.line,
            end_col: start.column + len,
        }
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end_col.saturating_sub(self.start_col)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextData {
    pub content: String,
    /// Start of the first token that produced this text
    pub position: Position,
    /// One entry per merged token, empty outside merge mode
    pub source_ranges: Vec<SourceRange>,
    /// True for the space synthesized from a single line break
    pub from_newline: bool,
}

impl TextData {
    pub fn new(content: impl Into<String>, position: Position) -> Self {
        TextData {
            content: content.into(),
            position,
            source_ranges: Vec::new(),
            from_newline: false,
        }
    }

    pub fn merged(content: String, position: Position, source_ranges: Vec<SourceRange>) -> Self {
        TextData {
            content,
            position,
            source_ranges,
            from_newline: false,
        }
    }

    /// Map a character offset inside `content` back to its source position.
    ///
    /// Returns `None` when the offset is past the end of the content.
    pub fn source_position(&self, offset: usize) -> Option<Position> {
        if offset >= self.content.chars().count() {
            return None;
        }

        if self.source_ranges.is_empty() {
            if self.from_newline {
                return Some(self.position);
            }
            return Some(Position::new(
                self.position.line,
                self.position.column + offset,
            ));
        }

        let mut remaining = offset;
        for range in &self.source_ranges {
            if remaining < range.len() {
                return Some(Position::new(range.start_line, range.start_col + remaining));
            }
            remaining -= range.len();
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MathData {
    /// Formula without its `$` delimiters
    pub content: String,
    pub display: bool,
}

impl MathData {
    pub fn new(content: impl Into<String>, display: bool) -> Self {
        MathData {
            content: content.into(),
            display,
        }
    }

    /// The formula re-wrapped in `$..$` or `$$..$$`
    pub fn wrapped(&self) -> String {
        if self.display {
            format!("$${}$$", self.content)
        } else {
            format!("${}$", self.content)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupData {
    /// `[..]` when true, `{..}` otherwise
    pub optional: bool,
}

impl GroupData {
    pub fn new(optional: bool) -> Self {
        GroupData { optional }
    }

    pub fn delimiters(&self) -> (char, char) {
        if self.optional {
            ('[', ']')
        } else {
            ('{', '}')
        }
    }
}
