//! Element removal.
//!
//! After removing from a leaf, the leaf is balanced against a sibling: the
//! pair merges if it fits in one block, otherwise half the difference moves
//! across. A merge removes a child from the parent, so the parent is then
//! balanced against its own sibling, and so on up the recorded path. The
//! cascade stops at the first level that did not merge. A root left with a
//! single child is replaced by that child.
//!
//! Large ranges are not removed one by one: they are cut out as a subtree in
//! `O(log n)` and released block by block.

use std::ops::RangeBounds;

use crate::alloc::BlockAllocator;
use crate::config::MIN_EXT;
use crate::internode::PairFix;
use crate::node::{self, Node, Path};
use crate::tracing_helpers::{debug_log, trace_log};

use super::{Tree, TreeError, check_range, resolve_range};

impl<T, A: BlockAllocator<T>> Tree<T, A> {
    /// Remove and return the element at `index`, or `None` if out of range.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }

        let mut path = Path::new();
        let mut cur = &mut self.root;
        let mut offset = index;
        let value = loop {
            match cur {
                Node::Internode(inner) => {
                    let (slot, rest) = inner.locate(offset);
                    inner.len -= 1;
                    path.push(slot);
                    offset = rest;
                    cur = &mut inner.children[slot];
                }
                Node::Leaf(leaf) => break leaf.remove(offset),
            }
        };

        self.rebalance_upward(&path);
        Some(value)
    }

    /// Remove and return the last element.
    #[inline]
    pub fn pop_back(&mut self) -> Option<T> {
        self.remove(self.len().checked_sub(1)?)
    }

    /// Remove and return the first element.
    #[inline]
    pub fn pop_front(&mut self) -> Option<T> {
        self.remove(0)
    }

    /// Remove a positional range, returning how many elements were dropped.
    ///
    /// Short ranges are erased element by element; longer ones are cut out
    /// as a subtree.
    pub fn remove_range<R: RangeBounds<usize>>(&mut self, range: R) -> Result<usize, TreeError> {
        let len = self.len();
        let (start, end) = resolve_range(&range, len);
        check_range(start, end, len)?;
        self.erase_span(start, end);
        Ok(end - start)
    }

    /// Keep only the first `len` elements.
    pub fn truncate(&mut self, len: usize) {
        let current = self.len();
        if len < current {
            self.erase_span(len, current);
        }
    }

    /// Erase `start..end`, which must already be validated.
    pub(crate) fn erase_span(&mut self, start: usize, end: usize) {
        let count = end - start;
        if count < MIN_EXT {
            for _ in 0..count {
                self.remove(start);
            }
        } else if let Some(middle) = self.detach_range(start, end) {
            debug_log!(start, end, "released range as subtree");
            node::release(middle.node, &mut self.alloc);
        }
    }

    /// Balance the nodes on `path` after a removal, bottom-up.
    fn rebalance_upward(&mut self, path: &Path) {
        let mut depth = path.depth();
        while depth > 0 {
            let parent = node::descend_mut(&mut self.root, path.prefix(depth - 1));
            let Some(parent) = parent.as_internode_mut() else {
                unreachable!("ancestor on path is a leaf");
            };
            if parent.width() < 2 {
                break;
            }
            let slot = path.slot(depth - 1);
            let left = slot.saturating_sub(1);
            let fix = parent.fix_pair(left, &mut self.alloc);
            trace_log!(depth, slot, ?fix, "rebalanced after removal");
            if fix != PairFix::Merged {
                break;
            }
            depth -= 1;
        }

        let removed = node::collapse(&mut self.root);
        if removed > 0 {
            self.height -= removed;
            debug_log!(height = self.height, len = self.len(), "tree lost a level");
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Fail fast in tests")]
mod tests {
    use super::*;
    use crate::alloc::PooledBlocks;

    #[test]
    fn test_remove_matches_vec() {
        let mut tree: Tree<usize> = (0..4000).collect();
        let mut oracle: Vec<usize> = (0..4000).collect();
        let mut step = 0;
        while !oracle.is_empty() {
            let at = (step * 7919) % oracle.len();
            assert_eq!(tree.remove(at), Some(oracle.remove(at)));
            step += 1;
            if step % 250 == 0 {
                tree.check_invariants().unwrap();
                assert!(tree.iter().eq(oracle.iter()));
            }
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut tree: Tree<u8> = (0..5).collect();
        assert_eq!(tree.remove(5), None);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_pop_both_ends() {
        let mut tree: Tree<usize> = (0..1000).collect();
        for i in 0..500 {
            assert_eq!(tree.pop_front(), Some(i));
            assert_eq!(tree.pop_back(), Some(999 - i));
        }
        assert_eq!(tree.pop_back(), None);
        assert_eq!(tree.pop_front(), None);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_short_range() {
        let mut tree: Tree<usize> = (0..500).collect();
        assert_eq!(tree.remove_range(100..110).unwrap(), 10);
        assert_eq!(tree.len(), 490);
        assert_eq!(tree.get(100), Some(&110));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_long_range_releases_blocks() {
        let mut tree: Tree<usize, PooledBlocks<usize>> = (0..10_000).collect();
        assert_eq!(tree.remove_range(1000..9000).unwrap(), 8000);
        assert_eq!(tree.len(), 2000);
        assert!(tree.iter().copied().eq((0..1000).chain(9000..10_000)));
        assert!(tree.allocator().released_count() > 0);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_everything_then_insert() {
        let mut tree: Tree<usize> = (0..3000).collect();
        tree.remove_range(..).unwrap();
        assert!(tree.is_empty());
        tree.push_back(42);
        let shape = tree.check_invariants().unwrap();
        assert_eq!(shape.leaves, 1);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_remove_range_rejects_bad_bounds() {
        let mut tree: Tree<usize> = (0..10).collect();
        assert_eq!(
            tree.remove_range(5..11),
            Err(TreeError::InvalidRange { start: 5, end: 11, len: 10 })
        );
        let (lo, hi) = (6, 2);
        assert!(tree.remove_range(lo..hi).is_err());
        assert_eq!(tree.remove_range(3..3), Ok(0));
    }

    #[test]
    fn test_truncate() {
        let mut tree: Tree<usize> = (0..1000).collect();
        tree.truncate(2000);
        assert_eq!(tree.len(), 1000);
        tree.truncate(10);
        assert!(tree.iter().copied().eq(0..10));
        tree.check_invariants().unwrap();
    }
}
