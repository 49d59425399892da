//! Positional B+tree engine.
//!
//! [`Tree`] stores a sequence of elements in leaf blocks of 64..=128 cells
//! under internodes of 8..=16 children. Every internode caches the element
//! count of its subtree, so the engine answers positional queries, and the
//! ordered facades in [`crate::array`] layer comparator-driven search on top.
//!
//! The engine itself knows nothing about ordering. Its operations are:
//!
//! | Area     | Operations |
//! |----------|------------|
//! | Access   | `get`, `get_mut`, `first`, `last`, cursors and iterators |
//! | Search   | `partition_point` (monotone predicate descent) |
//! | Insert   | `insert`, `push_back`, `push_front`, bulk `from_iter` / `insert_iter` |
//! | Erase    | `remove`, `remove_range`, `clear` |
//! | Relocate | `split_off`, `split_into`, `split_range_into`, `splice`, `splice_range`, `move_range` |
//! | Rewrite  | `merge_by`, `sort_by`, `dedup_by`, `retain`, `reverse` |
//!
//! Relocation never copies elements: whole subtrees change owner and only
//! the nodes along the cut are rebalanced, so its cost is `O(log n)`.

use std::fmt as StdFmt;

use crate::alloc::{BlockAllocator, HeapBlocks};
use crate::node::{self, Node, Subtree};

mod build;
mod cursor;
mod erase;
mod insert;
mod iter;
mod merge;
mod search;
mod split;
mod validate;

pub use cursor::Cursor;
pub use iter::{IntoIter, Iter, IterMut};
pub use validate::TreeShape;

pub(crate) use merge::plan as plan_merge;

// ============================================================================
//  TreeError
// ============================================================================

/// Errors reported by positional and relocation operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Index at or beyond the current length.
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Length at the time of the call.
        len: usize,
    },

    /// The destination of a split must be empty.
    NonEmptyTarget {
        /// Length of the rejected destination.
        len: usize,
    },

    /// A `start..end` range that is inverted or runs past the end.
    InvalidRange {
        /// Range start.
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// Length at the time of the call.
        len: usize,
    },

    /// A structural invariant does not hold. Only reported by
    /// [`Tree::check_invariants`].
    Corrupted {
        /// Which invariant failed.
        what: &'static str,
        /// Depth of the offending node (0 = root).
        depth: usize,
    },
}

impl StdFmt::Display for TreeError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }

            Self::NonEmptyTarget { len } => {
                write!(f, "split destination must be empty (has {len} elements)")
            }

            Self::InvalidRange { start, end, len } => {
                write!(f, "invalid range {start}..{end} for length {len}")
            }

            Self::Corrupted { what, depth } => {
                write!(f, "tree invariant violated at depth {depth}: {what}")
            }
        }
    }
}

impl std::error::Error for TreeError {}

/// Check `start..end` against `len`.
#[inline]
pub(crate) const fn check_range(start: usize, end: usize, len: usize) -> Result<(), TreeError> {
    if start > end || end > len {
        Err(TreeError::InvalidRange { start, end, len })
    } else {
        Ok(())
    }
}

/// Resolve any `RangeBounds<usize>` to `start..end` without validating it.
pub(crate) fn resolve_range<R: std::ops::RangeBounds<usize>>(range: &R, len: usize) -> (usize, usize) {
    use std::ops::Bound;
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    (start, end)
}

// ============================================================================
//  Tree
// ============================================================================

/// Array-backed B+tree addressed by logical position.
///
/// # Example
///
/// ```rust
/// use bptarray::tree::Tree;
///
/// let mut tree: Tree<u32> = (0..1000).collect();
/// let mut tail = tree.split_off(400);
/// assert_eq!(tree.len(), 400);
/// assert_eq!(tail.get(0), Some(&400));
///
/// tree.splice(400, &mut tail).unwrap();
/// assert_eq!(tree.len(), 1000);
/// assert!(tail.is_empty());
/// ```
pub struct Tree<T, A = HeapBlocks> {
    root: Node<T>,
    /// Number of levels; 1 when the root is a leaf.
    height: usize,
    alloc: A,
}

impl<T, A: BlockAllocator<T> + Default> Tree<T, A> {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(A::default())
    }
}

impl<T, A: BlockAllocator<T> + Default> Default for Tree<T, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: BlockAllocator<T>> Tree<T, A> {
    /// Create an empty tree drawing leaf blocks from `alloc`.
    #[must_use]
    pub const fn with_allocator(alloc: A) -> Self {
        Self {
            root: Node::empty(),
            height: 1,
            alloc,
        }
    }

    /// Number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Whether the tree holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.len() == 0
    }

    /// Number of levels (1 when everything fits in one leaf).
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// The block allocator.
    #[inline]
    #[must_use]
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Element at `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.root.get(index)
    }

    /// Mutable element at `index`.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.root.get_mut(index)
    }

    /// Element at `index`, or [`TreeError::OutOfRange`].
    pub fn at(&self, index: usize) -> Result<&T, TreeError> {
        self.root.get(index).ok_or(TreeError::OutOfRange {
            index,
            len: self.len(),
        })
    }

    /// First element.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.root.first()
    }

    /// Last element.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.root.last()
    }

    /// Remove every element, returning all blocks to the allocator.
    pub fn clear(&mut self) {
        let old = std::mem::replace(&mut self.root, Node::empty());
        self.height = 1;
        node::release(old, &mut self.alloc);
    }

    /// Replace the contents with the elements of `iter`.
    pub fn assign<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.clear();
        self.extend_back(iter);
    }

    /// Largest element count the tree could ever hold, bounded by the
    /// address space the leaf blocks draw from.
    #[inline]
    #[must_use]
    pub const fn max_size(&self) -> usize {
        match std::mem::size_of::<T>() {
            0 => usize::MAX,
            size => isize::MAX.unsigned_abs() / size,
        }
    }

    // ========================================================================
    //  Root exchange
    // ========================================================================

    /// Detach the whole content as a subtree, leaving the tree empty.
    pub(crate) fn take_subtree(&mut self) -> Option<Subtree<T>> {
        if self.is_empty() {
            return None;
        }
        let node = std::mem::replace(&mut self.root, Node::empty());
        let height = std::mem::replace(&mut self.height, 1);
        Some(Subtree::new(node, height))
    }

    /// Install `sub` as the whole content. The tree must be empty.
    pub(crate) fn install(&mut self, sub: Option<Subtree<T>>) {
        debug_assert!(self.is_empty(), "install: tree not empty");
        let Some(sub) = sub else {
            return;
        };
        let old = std::mem::replace(&mut self.root, sub.node);
        self.height = sub.height;
        node::release(old, &mut self.alloc);
    }
}

impl<T: StdFmt::Debug, A> StdFmt::Debug for Tree<T, A> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        let mut list = f.debug_list();
        let mut cursor = Cursor::new(&self.root, self.height, 0);
        while let Some(value) = cursor.get() {
            list.entry(value);
            cursor.move_next();
        }
        list.finish()
    }
}

impl<T: Clone, A: BlockAllocator<T> + Clone> Clone for Tree<T, A> {
    fn clone(&self) -> Self {
        let mut tree = Self::with_allocator(self.alloc.clone());
        tree.extend_back(self.iter().cloned());
        tree
    }
}

impl<T: PartialEq, A, B> PartialEq<Tree<T, B>> for Tree<T, A>
where
    A: BlockAllocator<T>,
    B: BlockAllocator<T>,
{
    fn eq(&self, other: &Tree<T, B>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: BlockAllocator<T>> Eq for Tree<T, A> {}

impl<T: PartialOrd, A: BlockAllocator<T>> PartialOrd for Tree<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: BlockAllocator<T>> Ord for Tree<T, A> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T, A: BlockAllocator<T>> std::ops::Index<usize> for Tree<T, A> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.root.get(index) {
            Some(value) => value,
            None => panic!("index {index} out of range for length {}", self.len()),
        }
    }
}

impl<T, A: BlockAllocator<T>> std::ops::IndexMut<usize> for Tree<T, A> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        match self.root.get_mut(index) {
            Some(value) => value,
            None => panic!("index {index} out of range for length {len}"),
        }
    }
}

impl<T, A: BlockAllocator<T> + Default> FromIterator<T> for Tree<T, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend_back(iter);
        tree
    }
}

impl<T, A: BlockAllocator<T>> Extend<T> for Tree<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.extend_back(iter);
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Fail fast in tests")]
mod tests {
    use super::*;
    use crate::alloc::PooledBlocks;

    #[test]
    fn test_error_display() {
        let err = TreeError::OutOfRange { index: 5, len: 3 };
        assert_eq!(err.to_string(), "index 5 out of range for length 3");
        let err = TreeError::NonEmptyTarget { len: 2 };
        assert!(err.to_string().contains("must be empty"));
        let err = TreeError::InvalidRange { start: 4, end: 2, len: 9 };
        assert_eq!(err.to_string(), "invalid range 4..2 for length 9");
    }

    #[test]
    fn test_check_range() {
        assert!(check_range(0, 0, 0).is_ok());
        assert!(check_range(2, 5, 5).is_ok());
        assert!(check_range(3, 2, 5).is_err());
        assert!(check_range(0, 6, 5).is_err());
    }

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(&(..), 10), (0, 10));
        assert_eq!(resolve_range(&(2..=4), 10), (2, 5));
        assert_eq!(resolve_range(&(3..), 10), (3, 10));
    }

    #[test]
    fn test_empty_tree() {
        let tree: Tree<u8> = Tree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.get(0), None);
        assert_eq!(tree.at(0), Err(TreeError::OutOfRange { index: 0, len: 0 }));
        assert_eq!(tree.first(), None);
    }

    #[test]
    fn test_index_and_at() {
        let mut tree: Tree<usize> = (0..500).collect();
        assert_eq!(tree[250], 250);
        tree[250] = 7;
        assert_eq!(*tree.at(250).unwrap(), 7);
        assert_eq!(tree.last(), Some(&499));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_index_panics() {
        let tree: Tree<usize> = (0..3).collect();
        let _ = tree[3];
    }

    #[test]
    fn test_clear_releases_blocks() {
        let mut tree: Tree<usize, PooledBlocks<usize>> = (0..1000).collect();
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.allocator().released_count() >= 1000 / 128);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_clone_and_compare() {
        let tree: Tree<usize> = (0..300).collect();
        let copy = tree.clone();
        assert_eq!(tree, copy);
        let shorter: Tree<usize> = (0..299).collect();
        assert!(shorter < tree);
        let small: Tree<u8> = [1, 2].into_iter().collect();
        assert_eq!(format!("{small:?}"), "[1, 2]");
    }
}
