//! The document tree.
//!
//! A [`Document`] is an arena of [`Node`]s. The root always sits at index 0.
//! Argument groups are owned through their command's option and parameter
//! slots; every other non-root node appears exactly once in its parent's
//! `children`, at its recorded `index`.

use super::node::{Node, NodeId, NodeKind, ParagraphData};
use once_cell::unsync::OnceCell;

/// A parsed LaTeX document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Which argument slot a group is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentSlot {
    Option,
    Parameter,
}

impl Document {
    /// Create a document holding only its root
    pub fn new() -> Self {
        Document {
            nodes: vec![Node::new(NodeKind::Document)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena, pruned ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Access a node. Panics if `id` does not belong to this document.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub(crate) fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.node_mut(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Allocate a detached node
    pub(crate) fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    /// Attach a detached node as the last child of `parent`
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        let index = self.nodes[parent.0].children.len();
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.index = index;
        self.nodes[parent.0].children.push(child);
    }

    /// Create a node and append it to `parent`
    pub fn append_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.alloc(kind);
        self.attach(parent, id);
        id
    }

    /// Create a group node in one of `owner`'s argument slots.
    ///
    /// Returns `None` if `owner` carries no argument slots.
    pub(crate) fn append_argument(
        &mut self,
        owner: NodeId,
        slot: ArgumentSlot,
        kind: NodeKind,
    ) -> Option<NodeId> {
        let id = NodeId(self.nodes.len());
        let data = self.nodes[owner.0].kind.command_data_mut()?;
        let list = match slot {
            ArgumentSlot::Option => &mut data.options,
            ArgumentSlot::Parameter => &mut data.parameters,
        };
        let index = list.len();
        list.push(id);

        let mut node = Node::new(kind);
        node.parent = Some(owner);
        node.index = index;
        self.nodes.push(node);
        Some(id)
    }

    /// Remove the children of `parent` sitting at the given sibling indices.
    ///
    /// Remaining children are renumbered contiguously and the removed ones
    /// lose their parent link. Indices out of range are ignored.
    pub fn remove_children(&mut self, parent: NodeId, indices: &[usize]) {
        let old = std::mem::take(&mut self.nodes[parent.0].children);
        let mut kept = Vec::with_capacity(old.len());

        for child in old {
            if indices.contains(&self.nodes[child.0].index) {
                self.nodes[child.0].parent = None;
            } else {
                self.nodes[child.0].index = kept.len();
                kept.push(child);
            }
        }

        self.nodes[parent.0].children = kept;
    }

    /// Nearest ancestor of `id` (excluding `id`) matching the predicate
    pub fn ancestor_where<F>(&self, id: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&NodeKind) -> bool,
    {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if predicate(self.kind(node)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Number of ancestors of `id`. The root has depth 0.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(node) = current {
            depth += 1;
            current = self.parent(node);
        }
        depth
    }

    /// Argument groups of `id` followed by its children
    pub fn subnodes(&self, id: NodeId) -> Vec<NodeId> {
        let node = self.node(id);
        let mut result: Vec<NodeId> = node
            .kind
            .command_data()
            .map(|data| data.arguments().collect())
            .unwrap_or_default();
        result.extend_from_slice(&node.children);
        result
    }

    /// All nodes below `id` in depth-first pre-order, argument groups first
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.subnodes(id).into_iter().rev().collect();

        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.subnodes(current).into_iter().rev());
        }

        result
    }

    /// All descendants of `id` whose kind matches the predicate
    pub fn find_all<F>(&self, id: NodeId, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&NodeKind) -> bool,
    {
        self.descendants(id)
            .into_iter()
            .filter(|node| predicate(self.kind(*node)))
            .collect()
    }

    /// First descendant of `id` (pre-order) whose kind matches the predicate
    pub fn find_first<F>(&self, id: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&NodeKind) -> bool,
    {
        let mut stack: Vec<NodeId> = self.subnodes(id).into_iter().rev().collect();

        while let Some(current) = stack.pop() {
            if predicate(self.kind(current)) {
                return Some(current);
            }
            stack.extend(self.subnodes(current).into_iter().rev());
        }

        None
    }

    /// Top-level sections (direct children of the root)
    pub fn sections(&self) -> Vec<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .filter(|id| matches!(self.kind(*id), NodeKind::Section(_)))
            .collect()
    }

    /// Every environment in the document
    pub fn environments(&self) -> Vec<NodeId> {
        self.find_all(self.root(), NodeKind::is_environment)
    }

    /// Every command in the document, specialized ones included
    pub fn commands(&self) -> Vec<NodeId> {
        self.find_all(self.root(), NodeKind::is_command_like)
    }

    /// First environment called `name`
    pub fn find_environment(&self, name: &str) -> Option<NodeId> {
        self.find_first(self.root(), |kind| {
            kind.is_environment() && kind.name() == Some(name)
        })
    }

    /// First command called `name`
    pub fn find_command(&self, name: &str) -> Option<NodeId> {
        self.find_first(self.root(), |kind| {
            kind.is_command_like() && kind.name() == Some(name)
        })
    }

    /// The `abstract` environment, if any
    pub fn abstract_env(&self) -> Option<NodeId> {
        self.find_environment("abstract")
    }

    /// The `\title` command, if any
    pub fn title(&self) -> Option<NodeId> {
        self.find_command("title")
    }

    /// Drop every cached paragraph text so it is recomputed on next access
    pub fn refresh_text_content(&mut self) {
        for node in &mut self.nodes {
            if let NodeKind::Paragraph(paragraph) = &mut node.kind {
                paragraph.text_cache = OnceCell::new();
            }
        }
    }

    pub(crate) fn new_paragraph() -> NodeKind {
        NodeKind::Paragraph(ParagraphData::new())
    }
}
