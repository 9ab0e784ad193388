//! Command registry and structural lookup tables
//!
//! The registry decides which node variant a command token turns into.
//! Unregistered names fall back to a generic [`NodeKind::Command`].

use fxhash::FxHashMap;
use phf::{phf_map, phf_set};
use tracing::debug;

use crate::core::ast::{CiteData, CommandData, FootnoteData, NodeKind, SectionData};

/// Builds the node for a command name
pub type NodeConstructor = fn(&str) -> NodeKind;

/// Number of `{..}` arguments an environment takes right after `\begin{name}`
pub static ENVIRONMENT_ARITY: phf::Map<&'static str, usize> = phf_map! {
    "tabular" => 1,
    "array" => 1,
    "tabularx" => 2,
    "minipage" => 1,
    "thebibliography" => 1,
    "multicols" => 1,
};

/// Environments whose line breaks always become spaces
pub static SINGLE_LINE_ENVIRONMENTS: phf::Set<&'static str> = phf_set! {
    "tabular",
    "matrix",
    "array",
};

pub fn section_node(name: &str) -> NodeKind {
    NodeKind::Section(SectionData::new(name))
}

pub fn footnote_node(name: &str) -> NodeKind {
    NodeKind::Footnote(FootnoteData::new(name))
}

pub fn cite_node(name: &str) -> NodeKind {
    NodeKind::Cite(CiteData::new(name))
}

pub fn command_node(name: &str) -> NodeKind {
    NodeKind::Command(CommandData::new(name))
}

/// Name to constructor mapping
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    handlers: FxHashMap<String, NodeConstructor>,
}

impl CommandRegistry {
    /// An empty registry: every command becomes a generic `Command`
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the structural commands the parser understands
    pub fn with_structural_commands() -> Self {
        let mut registry = Self::new();
        for name in ["section", "subsection", "subsubsection"] {
            registry.register(name, section_node);
        }
        registry.register("footnote", footnote_node);
        for name in ["cite", "citep", "citet"] {
            registry.register(name, cite_node);
        }
        registry
    }

    /// Register a constructor. A trailing `*` in `name` is stripped so the
    /// entry also serves the starred form.
    pub fn register(&mut self, name: &str, constructor: NodeConstructor) {
        let base = name.trim_end_matches('*');
        self.handlers.insert(base.to_string(), constructor);
    }

    /// Look up a constructor: exact name first, then the name without its
    /// trailing `*`
    pub fn lookup(&self, name: &str) -> Option<NodeConstructor> {
        if let Some(constructor) = self.handlers.get(name) {
            return Some(*constructor);
        }
        name.strip_suffix('*')
            .and_then(|base| self.handlers.get(base))
            .copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Build the node for `name`. Never fails.
    pub fn create_command_node(&self, name: &str) -> NodeKind {
        match self.lookup(name) {
            Some(constructor) => {
                debug!(command = name, "registry dispatch");
                constructor(name)
            }
            None => command_node(name),
        }
    }
}
