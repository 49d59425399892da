//! Node and level model.
//!
//! A tree is a [`Node`] root plus a height. Height 1 means the root is a
//! leaf; every leaf sits at the same depth. Nodes own their children, so
//! moving a subtree between trees is moving one value.
//!
//! Structural repairs never recurse. A descent records the child slot taken
//! at every level in a [`Path`]; repairs then walk the path back upward,
//! re-borrowing each ancestor from the root with [`descend_mut`].

use std::fmt as StdFmt;

use crate::alloc::BlockAllocator;
use crate::config::{MAX_EXT, MAX_HEIGHT, MAX_INT};
use crate::internode::Internode;
use crate::leaf::LeafBlock;

/// A leaf block or an internode.
pub(crate) enum Node<T> {
    Leaf(LeafBlock<T>),
    Internode(Internode<T>),
}

impl<T> Node<T> {
    /// An empty leaf with no storage.
    #[inline]
    pub(crate) const fn empty() -> Self {
        Self::Leaf(LeafBlock::empty())
    }

    /// Element count of the subtree.
    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Leaf(leaf) => leaf.len(),
            Self::Internode(inner) => inner.len,
        }
    }

    /// Occupancy for a leaf, child count for an internode.
    #[inline(always)]
    pub(crate) fn degree(&self) -> usize {
        match self {
            Self::Leaf(leaf) => leaf.len(),
            Self::Internode(inner) => inner.width(),
        }
    }

    #[inline(always)]
    pub(crate) const fn max_degree(&self) -> usize {
        match self {
            Self::Leaf(_) => MAX_EXT,
            Self::Internode(_) => MAX_INT,
        }
    }

    #[inline(always)]
    pub(crate) fn is_overfull(&self) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.is_overfull(),
            Self::Internode(inner) => inner.is_overfull(),
        }
    }

    #[inline(always)]
    pub(crate) fn is_underfull(&self) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.is_underfull(),
            Self::Internode(inner) => inner.is_underfull(),
        }
    }

    /// First element of the subtree (leftmost descent).
    pub(crate) fn first(&self) -> Option<&T> {
        let mut node = self;
        loop {
            match node {
                Self::Leaf(leaf) => return leaf.cells.first(),
                Self::Internode(inner) => node = inner.children.first()?,
            }
        }
    }

    /// Last element of the subtree (rightmost descent).
    pub(crate) fn last(&self) -> Option<&T> {
        let mut node = self;
        loop {
            match node {
                Self::Leaf(leaf) => return leaf.cells.last(),
                Self::Internode(inner) => node = inner.children.last()?,
            }
        }
    }

    /// Element at logical `index`.
    pub(crate) fn get(&self, mut index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        let mut node = self;
        loop {
            match node {
                Self::Leaf(leaf) => return leaf.cells.get(index),
                Self::Internode(inner) => {
                    let (slot, offset) = inner.locate(index);
                    index = offset;
                    node = &inner.children[slot];
                }
            }
        }
    }

    /// Mutable element at logical `index`.
    pub(crate) fn get_mut(&mut self, mut index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }
        let mut node = self;
        loop {
            match node {
                Self::Leaf(leaf) => return leaf.cells.get_mut(index),
                Self::Internode(inner) => {
                    let (slot, offset) = inner.locate(index);
                    index = offset;
                    node = &mut inner.children[slot];
                }
            }
        }
    }

    #[inline]
    pub(crate) fn as_internode_mut(&mut self) -> Option<&mut Internode<T>> {
        match self {
            Self::Internode(inner) => Some(inner),
            Self::Leaf(_) => None,
        }
    }
}

impl<T> StdFmt::Debug for Node<T> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::Leaf(leaf) => f.debug_struct("Leaf").field("len", &leaf.len()).finish(),
            Self::Internode(inner) => StdFmt::Debug::fmt(inner, f),
        }
    }
}

// ============================================================================
//  Subtree
// ============================================================================

/// A detached, non-empty root with its height.
///
/// Used as the unit of exchange by split and join: every non-root node
/// inside satisfies the degree bounds, the root itself may be underfull.
pub(crate) struct Subtree<T> {
    pub(crate) node: Node<T>,
    pub(crate) height: usize,
}

impl<T> Subtree<T> {
    #[inline]
    pub(crate) const fn new(node: Node<T>, height: usize) -> Self {
        Self { node, height }
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.node.len()
    }

    /// Turn a run of siblings at height `height` into one subtree.
    ///
    /// Zero siblings give `None`, one sibling becomes the root itself, more
    /// are grouped under a new root.
    pub(crate) fn from_siblings(mut siblings: Vec<Node<T>>, height: usize) -> Option<Self> {
        match siblings.len() {
            0 => None,
            1 => siblings.pop().map(|node| Self::new(node, height)),
            _ => Some(Self::new(
                Node::Internode(Internode::from_children(siblings)),
                height + 1,
            )),
        }
    }
}

// ============================================================================
//  Path
// ============================================================================

/// Child slots taken by a descent, root first.
#[derive(Clone, Copy)]
pub(crate) struct Path {
    slots: [usize; MAX_HEIGHT],
    depth: usize,
}

impl Path {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            slots: [0; MAX_HEIGHT],
            depth: 0,
        }
    }

    #[inline(always)]
    pub(crate) fn push(&mut self, slot: usize) {
        debug_assert!(self.depth < MAX_HEIGHT, "path deeper than MAX_HEIGHT");
        self.slots[self.depth] = slot;
        self.depth += 1;
    }

    /// Number of recorded slots (depth of the node the descent ended at).
    #[inline(always)]
    pub(crate) const fn depth(&self) -> usize {
        self.depth
    }

    /// Slots leading to the node at `depth`.
    #[inline(always)]
    pub(crate) fn prefix(&self, depth: usize) -> &[usize] {
        &self.slots[..depth]
    }

    /// Slot taken out of the node at `depth`.
    #[inline(always)]
    pub(crate) const fn slot(&self, depth: usize) -> usize {
        self.slots[depth]
    }
}

impl StdFmt::Debug for Path {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_list().entries(&self.slots[..self.depth]).finish()
    }
}

/// Follow `slots` down from `root`.
pub(crate) fn descend_mut<'a, T>(root: &'a mut Node<T>, slots: &[usize]) -> &'a mut Node<T> {
    let mut node = root;
    for &slot in slots {
        let Node::Internode(inner) = node else {
            unreachable!("path descends below the leaf level");
        };
        node = &mut inner.children[slot];
    }
    node
}

/// Split every overfull node on `path`, bottom-up.
///
/// Starts at the node at `path.depth()` and stops at the first ancestor that
/// did not overflow. Returns whether the root itself is left overfull, in
/// which case the caller must grow the tree.
pub(crate) fn split_upward<T, A: BlockAllocator<T>>(root: &mut Node<T>, path: &Path, alloc: &mut A) -> bool {
    let mut depth = path.depth();
    while depth > 0 {
        let parent = descend_mut(root, path.prefix(depth - 1));
        let Some(parent) = parent.as_internode_mut() else {
            unreachable!("ancestor on path is a leaf");
        };
        if !parent.split_child(path.slot(depth - 1), alloc) {
            return false;
        }
        depth -= 1;
    }
    root.is_overfull()
}

/// Push the overfull `root` one level down under a new internode and split it.
pub(crate) fn grow<T, A: BlockAllocator<T>>(root: &mut Node<T>, alloc: &mut A) {
    let old = std::mem::replace(root, Node::empty());
    let mut top = Internode::from_children(vec![old]);
    top.split_child(0, alloc);
    *root = Node::Internode(top);
}

/// Replace a single-child internode root with its child while possible.
///
/// Returns how many levels were removed.
pub(crate) fn collapse<T>(root: &mut Node<T>) -> usize {
    let mut removed = 0;
    loop {
        let child = match &mut *root {
            Node::Internode(inner) if inner.width() == 1 => inner.children.pop(),
            _ => None,
        };
        let Some(child) = child else {
            return removed;
        };
        *root = child;
        removed += 1;
    }
}

/// Drop a detached subtree, returning each leaf block to `alloc`.
pub(crate) fn release<T, A: BlockAllocator<T>>(node: Node<T>, alloc: &mut A) {
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        match node {
            Node::Leaf(leaf) => {
                if leaf.cells.capacity() > 0 {
                    alloc.release(leaf.cells);
                }
            }
            Node::Internode(inner) => stack.extend(inner.children),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Fail fast in tests")]
mod tests {
    use super::*;
    use crate::alloc::{HeapBlocks, PooledBlocks};

    fn leaf(range: std::ops::Range<usize>) -> Node<usize> {
        Node::Leaf(LeafBlock::from_block(range.collect()))
    }

    fn two_level() -> Node<usize> {
        Node::Internode(Internode::from_children(vec![leaf(0..70), leaf(70..150), leaf(150..220)]))
    }

    #[test]
    fn test_get_and_bounds() {
        let root = two_level();
        assert_eq!(root.len(), 220);
        assert_eq!(root.get(0), Some(&0));
        assert_eq!(root.get(149), Some(&149));
        assert_eq!(root.get(150), Some(&150));
        assert_eq!(root.get(220), None);
        assert_eq!(root.first(), Some(&0));
        assert_eq!(root.last(), Some(&219));
    }

    #[test]
    fn test_get_mut() {
        let mut root = two_level();
        *root.get_mut(75).unwrap() = 1000;
        assert_eq!(root.get(75), Some(&1000));
    }

    #[test]
    fn test_descend_mut() {
        let mut root = two_level();
        let node = descend_mut(&mut root, &[2]);
        assert_eq!(node.first(), Some(&150));
    }

    #[test]
    fn test_grow_then_collapse() {
        let mut root = leaf(0..MAX_EXT + 1);
        assert!(root.is_overfull());
        grow(&mut root, &mut HeapBlocks);
        assert_eq!(root.degree(), 2);
        assert_eq!(root.len(), MAX_EXT + 1);

        let Node::Internode(inner) = &mut root else {
            panic!("expected internode");
        };
        inner.fix_pair(0, &mut HeapBlocks);
        assert_eq!(inner.width(), 2, "129 elements cannot merge");
        let right = inner.children.pop().unwrap();
        inner.recount();
        drop(right);
        assert_eq!(collapse(&mut root), 1);
        assert!(matches!(root, Node::Leaf(_)));
    }

    #[test]
    fn test_split_upward_stops_at_first_fit() {
        let mut root = Node::Internode(Internode::from_children(vec![leaf(0..64), leaf(64..64 + MAX_EXT + 1)]));
        let mut path = Path::new();
        path.push(1);
        assert!(!split_upward(&mut root, &path, &mut HeapBlocks));
        assert_eq!(root.degree(), 3);
    }

    #[test]
    fn test_release_returns_blocks() {
        let mut pool = PooledBlocks::new();
        release(two_level(), &mut pool);
        assert_eq!(pool.released_count(), 3);
    }

    #[test]
    fn test_from_siblings() {
        assert!(Subtree::<usize>::from_siblings(Vec::new(), 1).is_none());
        let one = Subtree::from_siblings(vec![leaf(0..5)], 1).unwrap();
        assert_eq!(one.height, 1);
        let many = Subtree::from_siblings(vec![leaf(0..64), leaf(64..128)], 1).unwrap();
        assert_eq!(many.height, 2);
        assert_eq!(many.len(), 128);
    }
}
