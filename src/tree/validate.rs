//! Structural diagnostics.
//!
//! [`Tree::check_invariants`] walks the whole tree and verifies:
//!
//! - every leaf sits at depth `height - 1`;
//! - non-root leaves hold `MIN_EXT..=MAX_EXT` elements, a root leaf at most `MAX_EXT`;
//! - non-root internodes have `MIN_INT..=MAX_INT` children, a root internode at least 2;
//! - every cached length equals the sum of its children's lengths.
//!
//! It is `O(n / MIN_EXT)` and meant for tests and debugging.

use crate::alloc::BlockAllocator;
use crate::config::{MAX_EXT, MAX_INT, MIN_EXT, MIN_INT};
use crate::node::Node;

use super::{Tree, TreeError};

/// Node counts of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeShape {
    /// Number of levels.
    pub height: usize,
    /// Number of leaf blocks.
    pub leaves: usize,
    /// Number of internodes.
    pub internodes: usize,
    /// Number of elements.
    pub len: usize,
}

const fn corrupted(what: &'static str, depth: usize) -> TreeError {
    TreeError::Corrupted { what, depth }
}

impl<T, A: BlockAllocator<T>> Tree<T, A> {
    /// Verify every structural invariant, returning the tree's shape.
    pub fn check_invariants(&self) -> Result<TreeShape, TreeError> {
        let mut shape = TreeShape {
            height: self.height,
            len: self.len(),
            ..TreeShape::default()
        };
        if self.height == 0 {
            return Err(corrupted("height is zero", 0));
        }

        let leaf_depth = self.height - 1;
        let mut stack = vec![(&self.root, 0_usize)];
        while let Some((node, depth)) = stack.pop() {
            let is_root = depth == 0;
            match node {
                Node::Leaf(leaf) => {
                    shape.leaves += 1;
                    if depth != leaf_depth {
                        return Err(corrupted("leaf above the leaf level", depth));
                    }
                    let n = leaf.len();
                    if n > MAX_EXT || (!is_root && n < MIN_EXT) {
                        return Err(corrupted("leaf occupancy out of bounds", depth));
                    }
                }
                Node::Internode(inner) => {
                    shape.internodes += 1;
                    if depth >= leaf_depth {
                        return Err(corrupted("internode at the leaf level", depth));
                    }
                    let width = inner.width();
                    let min = if is_root { 2 } else { MIN_INT };
                    if width < min || width > MAX_INT {
                        return Err(corrupted("internode width out of bounds", depth));
                    }
                    if inner.len != inner.children.iter().map(Node::len).sum::<usize>() {
                        return Err(corrupted("cached length differs from children", depth));
                    }
                    stack.extend(inner.children.iter().map(|child| (child, depth + 1)));
                }
            }
        }
        Ok(shape)
    }

    /// Count levels and nodes without checking anything.
    #[must_use]
    pub fn shape(&self) -> TreeShape {
        let mut shape = TreeShape {
            height: self.height,
            len: self.len(),
            ..TreeShape::default()
        };
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf(_) => shape.leaves += 1,
                Node::Internode(inner) => {
                    shape.internodes += 1;
                    stack.extend(inner.children.iter());
                }
            }
        }
        shape
    }

    /// Element slots held by the live leaf blocks.
    #[must_use]
    pub fn capacity(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf(leaf) => total += leaf.cells.capacity(),
                Node::Internode(inner) => stack.extend(inner.children.iter()),
            }
        }
        total
    }
}
