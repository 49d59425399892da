//! Internodes.
//!
//! An internode groups between [`MIN_INT`] and [`MAX_INT`] children of equal
//! height and caches `len`, the element count of its whole subtree. No
//! separator keys are stored: the key that routes a search into a child is
//! that child's first element, reached by leftmost descent.
//!
//! ```text
//!              [ len = 300 ]
//!             /      |      \
//!      [len 96]  [len 100]  [len 104]
//! ```
//!
//! Positional lookup walks the children subtracting their lengths, so a
//! descent costs `O(MAX_INT)` per level.

use std::fmt as StdFmt;

use crate::alloc::BlockAllocator;
use crate::config::{MAX_INT, MIN_INT};
use crate::node::Node;

/// Outcome of balancing two adjacent siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PairFix {
    /// The right sibling was folded into the left one.
    Merged,
    /// Elements or children moved between the two.
    Shifted,
    /// The pair was already even.
    Unchanged,
}

/// Interior grouping node.
pub(crate) struct Internode<T> {
    pub(crate) len: usize,
    pub(crate) children: Vec<Node<T>>,
}

impl<T> Internode<T> {
    /// Build an internode over `children`, computing `len`.
    pub(crate) fn from_children(children: Vec<Node<T>>) -> Self {
        let mut node = Self { len: 0, children };
        node.recount();
        node
    }

    /// Number of children.
    #[inline(always)]
    pub(crate) fn width(&self) -> usize {
        self.children.len()
    }

    #[inline(always)]
    pub(crate) fn is_overfull(&self) -> bool {
        self.children.len() > MAX_INT
    }

    #[inline(always)]
    pub(crate) fn is_underfull(&self) -> bool {
        self.children.len() < MIN_INT
    }

    /// Recompute `len` from the children.
    #[inline]
    pub(crate) fn recount(&mut self) {
        self.len = self.children.iter().map(Node::len).sum();
    }

    /// Find the child holding logical `index`.
    ///
    /// Returns `(slot, offset)` where `offset` is relative to the child. An
    /// `index` equal to `len` maps to the end of the last child.
    pub(crate) fn locate(&self, mut index: usize) -> (usize, usize) {
        debug_assert!(index <= self.len, "locate: index out of bounds");
        for (slot, child) in self.children.iter().enumerate() {
            let n = child.len();
            if index < n {
                return (slot, index);
            }
            index -= n;
        }
        let last = self.children.len() - 1;
        (last, self.children[last].len())
    }

    /// Logical index of the first element under `children[slot]`.
    #[inline]
    pub(crate) fn offset_of(&self, slot: usize) -> usize {
        self.children[..slot].iter().map(Node::len).sum()
    }

    /// Split an overfull internode, keeping [`MIN_INT`] children on the left.
    pub(crate) fn split_overfull(&mut self) -> Self {
        debug_assert!(self.is_overfull());
        let mut right = Vec::with_capacity(MAX_INT + 1);
        right.extend(self.children.drain(MIN_INT..));
        let right = Self::from_children(right);
        self.len -= right.len;
        right
    }

    /// Append every child of `right`.
    pub(crate) fn absorb(&mut self, mut right: Self) {
        debug_assert!(self.width() + right.width() <= MAX_INT, "absorb: merged internode too wide");
        self.len += right.len;
        self.children.append(&mut right.children);
    }

    /// Move the first `count` children of `right` onto the end of `self`.
    pub(crate) fn take_front_of(&mut self, right: &mut Self, count: usize) {
        let moved: usize = right.children[..count].iter().map(Node::len).sum();
        self.children.extend(right.children.drain(..count));
        self.len += moved;
        right.len -= moved;
    }

    /// Move the last `count` children of `self` onto the front of `right`.
    pub(crate) fn give_back_to(&mut self, right: &mut Self, count: usize) {
        let start = self.children.len() - count;
        let moved: usize = self.children[start..].iter().map(Node::len).sum();
        right.children.splice(0..0, self.children.drain(start..));
        self.len -= moved;
        right.len += moved;
    }

    /// Split `children[slot]` if it overflowed, inserting the new right half
    /// at `slot + 1`. Returns whether a split happened.
    pub(crate) fn split_child<A: BlockAllocator<T>>(&mut self, slot: usize, alloc: &mut A) -> bool {
        let right = match &mut self.children[slot] {
            Node::Leaf(leaf) if leaf.is_overfull() => Node::Leaf(leaf.split_overfull(alloc)),
            Node::Internode(inner) if inner.is_overfull() => Node::Internode(inner.split_overfull()),
            _ => return false,
        };
        self.children.insert(slot + 1, right);
        true
    }

    /// Balance `children[left]` with `children[left + 1]`.
    ///
    /// If both fit in one node the right one is merged away; otherwise half
    /// of the difference moves from the larger to the smaller. Either way the
    /// pair ends within bounds whenever their combined size allows it.
    pub(crate) fn fix_pair<A: BlockAllocator<T>>(&mut self, left: usize, alloc: &mut A) -> PairFix {
        debug_assert!(left + 1 < self.children.len(), "fix_pair: no right sibling");
        let (a, b) = (self.children[left].degree(), self.children[left + 1].degree());
        if a + b <= self.children[left].max_degree() {
            let right = self.children.remove(left + 1);
            match (&mut self.children[left], right) {
                (Node::Leaf(l), Node::Leaf(r)) => l.absorb(r, alloc),
                (Node::Internode(l), Node::Internode(r)) => l.absorb(r),
                _ => unreachable!("siblings at different heights"),
            }
            return PairFix::Merged;
        }

        let count = a.abs_diff(b) / 2;
        if count == 0 {
            return PairFix::Unchanged;
        }
        let (head, tail) = self.children.split_at_mut(left + 1);
        match (&mut head[left], &mut tail[0]) {
            (Node::Leaf(l), Node::Leaf(r)) if a < b => l.take_front_of(r, count),
            (Node::Leaf(l), Node::Leaf(r)) => l.give_back_to(r, count),
            (Node::Internode(l), Node::Internode(r)) if a < b => l.take_front_of(r, count),
            (Node::Internode(l), Node::Internode(r)) => l.give_back_to(r, count),
            _ => unreachable!("siblings at different heights"),
        }
        PairFix::Shifted
    }
}

impl<T> StdFmt::Debug for Internode<T> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("Internode")
            .field("len", &self.len)
            .field("width", &self.children.len())
            .finish_non_exhaustive()
    }
}
