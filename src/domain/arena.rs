//! Arena-backed configuration tree.
//!
//! Every node lives in a single generational arena owned by [`ConfigTree`].
//! Parent and child links are plain arena indices, so the tree has exactly
//! one owner and no reference cycles.

use generational_arena::{Arena, Index};
use std::fmt;
use tracing::{debug, instrument};

/// Name of the implicit top-level section.
pub const ROOT_NAME: &str = "root";

/// Discriminant of a node, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Section,
    Leaf,
    Comment,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Section => write!(f, "section"),
            NodeKind::Leaf => write!(f, "leaf"),
            NodeKind::Comment => write!(f, "comment"),
        }
    }
}

/// Payload of a tree node.
///
/// Only sections carry children, so a leaf or comment can never own nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Section { name: String, children: Vec<Index> },
    Leaf { name: String, value: String },
    Comment { text: String },
}

/// Tree node in the arena.
#[derive(Debug, Clone)]
pub struct ConfigNode {
    data: NodeData,
    parent: Option<Index>,
    depth: usize,
    /// 1-based source line the node was parsed from
    line: Option<usize>,
}

impl ConfigNode {
    /// Tag name, key name, or comment text.
    pub fn name(&self) -> &str {
        match &self.data {
            NodeData::Section { name, .. } | NodeData::Leaf { name, .. } => name,
            NodeData::Comment { text } => text,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Section { .. } => NodeKind::Section,
            NodeData::Leaf { .. } => NodeKind::Leaf,
            NodeData::Comment { .. } => NodeKind::Comment,
        }
    }

    /// Raw string value, present only for leaves.
    pub fn value(&self) -> Option<&str> {
        match &self.data {
            NodeData::Leaf { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Index] {
        match &self.data {
            NodeData::Section { children, .. } => children,
            _ => &[],
        }
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn is_section(&self) -> bool {
        self.kind() == NodeKind::Section
    }

    pub fn is_leaf(&self) -> bool {
        self.kind() == NodeKind::Leaf
    }
}

/// Handle to a node that is known to be a section.
///
/// Only [`ConfigTree`] hands these out, which makes creating children under
/// a leaf or comment impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(Index);

impl SectionId {
    pub fn index(self) -> Index {
        self.0
    }
}

impl From<SectionId> for Index {
    fn from(id: SectionId) -> Self {
        id.0
    }
}

/// The configuration tree: a root section plus everything below it.
#[derive(Debug, Clone)]
pub struct ConfigTree {
    arena: Arena<ConfigNode>,
    root: SectionId,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTree {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(ConfigNode {
            data: NodeData::Section {
                name: ROOT_NAME.to_string(),
                children: Vec::new(),
            },
            parent: None,
            depth: 0,
            line: None,
        });
        Self {
            arena,
            root: SectionId(root),
        }
    }

    pub fn root(&self) -> SectionId {
        self.root
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True when the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 1
    }

    pub fn get(&self, idx: Index) -> Option<&ConfigNode> {
        self.arena.get(idx)
    }

    /// Node behind a section handle.
    pub fn section(&self, id: SectionId) -> Option<&ConfigNode> {
        self.arena.get(id.0)
    }

    /// Returns a section handle if `idx` points at a section.
    pub fn as_section(&self, idx: Index) -> Option<SectionId> {
        self.arena
            .get(idx)
            .filter(|node| node.is_section())
            .map(|_| SectionId(idx))
    }

    /// Parent section of `id`, `None` for the root.
    pub fn parent_section(&self, id: SectionId) -> Option<SectionId> {
        self.section(id)
            .and_then(|node| node.parent)
            .map(SectionId)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn create_section(&mut self, parent: SectionId, name: &str, line: Option<usize>) -> SectionId {
        let data = NodeData::Section {
            name: name.to_string(),
            children: Vec::new(),
        };
        SectionId(self.attach(parent, data, line))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn create_leaf(
        &mut self,
        parent: SectionId,
        name: &str,
        value: &str,
        line: Option<usize>,
    ) -> Index {
        let data = NodeData::Leaf {
            name: name.to_string(),
            value: value.to_string(),
        };
        self.attach(parent, data, line)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn create_comment(&mut self, parent: SectionId, text: &str, line: Option<usize>) -> Index {
        let data = NodeData::Comment {
            text: text.to_string(),
        };
        self.attach(parent, data, line)
    }

    fn attach(&mut self, parent: SectionId, data: NodeData, line: Option<usize>) -> Index {
        let depth = self.arena.get(parent.0).map_or(0, |p| p.depth) + 1;
        let node_idx = self.arena.insert(ConfigNode {
            data,
            parent: Some(parent.0),
            depth,
            line,
        });

        if let Some(ConfigNode {
            data: NodeData::Section { children, .. },
            ..
        }) = self.arena.get_mut(parent.0)
        {
            children.push(node_idx);
        }

        node_idx
    }

    /// Overwrites a leaf's value. Returns false for anything but a leaf.
    pub fn set_value(&mut self, idx: Index, new_value: String) -> bool {
        match self.arena.get_mut(idx) {
            Some(ConfigNode {
                data: NodeData::Leaf { name, value },
                ..
            }) => {
                debug!("set {} = {:?}", name, new_value);
                *value = new_value;
                true
            }
            _ => false,
        }
    }

    /// New tree whose root holds copies of everything below `id`.
    ///
    /// Depths are recomputed; names, values and source lines are kept.
    pub fn subtree(&self, id: SectionId) -> ConfigTree {
        let mut copy = ConfigTree::new();
        let root = copy.root();
        self.copy_children(id.0, &mut copy, root);
        copy
    }

    fn copy_children(&self, from: Index, into: &mut ConfigTree, parent: SectionId) {
        let Some(node) = self.get(from) else {
            return;
        };
        for &child_idx in node.children() {
            let Some(child) = self.get(child_idx) else {
                continue;
            };
            match &child.data {
                NodeData::Section { name, .. } => {
                    let section = into.create_section(parent, name, child.line);
                    self.copy_children(child_idx, into, section);
                }
                NodeData::Leaf { name, value } => {
                    into.create_leaf(parent, name, value, child.line);
                }
                NodeData::Comment { text } => {
                    into.create_comment(parent, text, child.line);
                }
            }
        }
    }

    /// Pre-order walk starting at the root (root included).
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self)
    }

    /// True when both trees hold the same kinds, names, values and order.
    ///
    /// Source line numbers are ignored.
    pub fn same_structure(&self, other: &ConfigTree) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((_, a), (_, b))| a.depth == b.depth && same_payload(a, b))
    }
}

fn same_payload(a: &ConfigNode, b: &ConfigNode) -> bool {
    a.kind() == b.kind() && a.name() == b.name() && a.value() == b.value()
}

pub struct TreeIterator<'a> {
    tree: &'a ConfigTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a ConfigTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root.0],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a ConfigNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children().iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
