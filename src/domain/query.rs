//! Fan-out path matching over a [`ConfigTree`].
//!
//! Sibling names are not unique. Every child whose name equals the current
//! segment is followed, so one path can resolve to many nodes. Comments
//! never match a segment.

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::{ConfigTree, NodeKind};
use crate::domain::path::ConfigPath;

/// Appends every node reached by `segments[offset..]` starting at `node`.
pub fn collect(
    tree: &ConfigTree,
    node: Index,
    segments: &[String],
    offset: usize,
    result: &mut Vec<Index>,
) {
    walk(tree, node, segments, offset, &mut |idx| result.push(idx));
}

/// Like [`collect`], but emits the children of every terminal node instead
/// of the node itself.
pub fn collect_sections(
    tree: &ConfigTree,
    node: Index,
    segments: &[String],
    offset: usize,
    result: &mut Vec<Index>,
) {
    walk(tree, node, segments, offset, &mut |idx| {
        if let Some(terminal) = tree.get(idx) {
            result.extend_from_slice(terminal.children());
        }
    });
}

fn walk(
    tree: &ConfigTree,
    node: Index,
    segments: &[String],
    offset: usize,
    emit: &mut dyn FnMut(Index),
) {
    if offset == segments.len() {
        emit(node);
        return;
    }
    let Some(current) = tree.get(node) else {
        return;
    };
    let wanted = &segments[offset];
    for &child in current.children() {
        let matches = tree
            .get(child)
            .is_some_and(|c| c.kind() != NodeKind::Comment && c.name() == wanted);
        if matches {
            walk(tree, child, segments, offset + 1, emit);
        }
    }
}

impl ConfigTree {
    /// Nodes at the end of `path`, in traversal order.
    #[instrument(level = "trace", skip(self, path), fields(path = %path))]
    pub fn collect(&self, path: &ConfigPath) -> Vec<Index> {
        let mut result = Vec::new();
        collect(self, self.root().index(), path.segments(), 0, &mut result);
        result
    }

    /// Children of every node at the end of `path`, flattened.
    #[instrument(level = "trace", skip(self, path), fields(path = %path))]
    pub fn collect_sections(&self, path: &ConfigPath) -> Vec<Index> {
        let mut result = Vec::new();
        collect_sections(self, self.root().index(), path.segments(), 0, &mut result);
        result
    }
}
