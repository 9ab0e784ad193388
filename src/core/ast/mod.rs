//! Document tree
//!
//! An arena-backed AST: [`Document`] owns every [`Node`], nodes link to each
//! other through [`NodeId`]s, and the variant set is the closed [`NodeKind`]
//! enum.

pub mod document;
pub mod node;
pub mod text;
pub mod tree;

pub use document::{ArgumentSlot, Document};
pub use node::{
    section_level, CiteData, CommandData, FootnoteData, GroupData, MathData, Node, NodeId,
    NodeKind, ParagraphData, SectionData, SourceRange, TextData,
};
pub use tree::NodeSnapshot;
