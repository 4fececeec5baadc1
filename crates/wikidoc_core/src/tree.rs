//! Forest construction over a document snapshot.
//!
//! # Invariants
//! - Every input document appears exactly once in the output.
//! - A document whose parent is absent from the snapshot is a root.
//! - Siblings and roots keep the relative order of the input slice.
//! - The function is pure: same input, structurally identical output.
//! - Building, comparing, measuring and dropping a forest never recurse, so
//!   nesting depth is bounded by memory only.

use crate::model::document::{Document, DocumentId};
use serde::Serialize;
use std::collections::HashMap;

/// One document with its ordered children.
#[derive(Debug)]
pub struct TreeNode {
    pub document: Document,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of documents in this subtree, including the node itself.
    pub fn subtree_size(&self) -> usize {
        let mut size = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            size += 1;
            stack.extend(node.children.iter());
        }
        size
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first `(depth, document)` pairs, root at depth 0.
    pub fn flatten(&self) -> Vec<(usize, &Document)> {
        flatten_forest(std::slice::from_ref(self))
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if left.document != right.document || left.children.len() != right.children.len() {
                return false;
            }
            pending.extend(left.children.iter().zip(right.children.iter()));
        }
        true
    }
}

impl Eq for TreeNode {}

impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Depth-first `(depth, document)` pairs over a whole forest.
pub fn flatten_forest(roots: &[TreeNode]) -> Vec<(usize, &Document)> {
    let mut out = Vec::new();
    let mut stack: Vec<(usize, &TreeNode)> = roots.iter().rev().map(|node| (0, node)).collect();
    while let Some((depth, node)) = stack.pop() {
        out.push((depth, &node.document));
        stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
    }
    out
}

/// One line of a forest outline; the flat, serializable view of a forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutlineEntry<'a> {
    pub depth: usize,
    pub document: &'a Document,
}

/// Depth-first outline of a whole forest.
pub fn outline(roots: &[TreeNode]) -> Vec<OutlineEntry<'_>> {
    flatten_forest(roots)
        .into_iter()
        .map(|(depth, document)| OutlineEntry { depth, document })
        .collect()
}

/// Builds the parent/child forest for `documents`.
///
/// Parents are resolved against the snapshot only: a missing or deleted
/// parent makes the child a root. Members of a parent loop that no root
/// reaches are promoted to roots at their input position, so no document is
/// ever dropped.
pub fn build_tree(documents: &[Document]) -> Vec<TreeNode> {
    let mut index: HashMap<DocumentId, usize> = HashMap::with_capacity(documents.len());
    for (position, document) in documents.iter().enumerate() {
        index.entry(document.id).or_insert(position);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); documents.len()];
    let mut is_root = vec![false; documents.len()];
    for (position, document) in documents.iter().enumerate() {
        match document.parent_id.and_then(|parent| index.get(&parent).copied()) {
            Some(parent) if parent != position => children[parent].push(position),
            _ => is_root[position] = true,
        }
    }

    let mut reached = vec![false; documents.len()];
    for position in 0..documents.len() {
        if is_root[position] {
            mark_reached(position, &children, &mut reached);
        }
    }
    for position in 0..documents.len() {
        if !reached[position] {
            is_root[position] = true;
            mark_reached(position, &children, &mut reached);
        }
    }

    let mut placed = vec![false; documents.len()];
    (0..documents.len())
        .filter(|&position| is_root[position])
        .map(|position| materialize(position, documents, &children, &mut placed))
        .collect()
}

fn mark_reached(start: usize, children: &[Vec<usize>], reached: &mut [bool]) {
    let mut stack = vec![start];
    while let Some(position) = stack.pop() {
        if reached[position] {
            continue;
        }
        reached[position] = true;
        stack.extend(children[position].iter().copied());
    }
}

/// Node under construction plus the index of its next child to visit.
struct Frame {
    position: usize,
    cursor: usize,
    node: TreeNode,
}

impl Frame {
    fn open(position: usize, documents: &[Document], children: &[Vec<usize>]) -> Self {
        Self {
            position,
            cursor: 0,
            node: TreeNode {
                document: documents[position].clone(),
                children: Vec::with_capacity(children[position].len()),
            },
        }
    }
}

/// Builds the subtree under `root` post-order with an explicit stack; a
/// finished node is moved into its parent's `children`.
fn materialize(
    root: usize,
    documents: &[Document],
    children: &[Vec<usize>],
    placed: &mut [bool],
) -> TreeNode {
    placed[root] = true;
    let mut ancestors: Vec<Frame> = Vec::new();
    let mut current = Frame::open(root, documents, children);
    loop {
        let pending = &children[current.position];
        while current.cursor < pending.len() && placed[pending[current.cursor]] {
            current.cursor += 1;
        }
        if let Some(&child) = pending.get(current.cursor) {
            current.cursor += 1;
            placed[child] = true;
            let next = Frame::open(child, documents, children);
            ancestors.push(std::mem::replace(&mut current, next));
            continue;
        }

        match ancestors.pop() {
            Some(mut parent) => {
                parent.node.children.push(current.node);
                current = parent;
            }
            None => return current.node,
        }
    }
}
