//! Monotone-predicate descent.
//!
//! Ordered lookups reduce to [`Tree::partition_point`]: given a predicate
//! that holds for a prefix of the sequence and fails for the rest, find the
//! first position where it fails. `lower_bound(k)` is the partition point of
//! `e < k`, `upper_bound(k)` that of `!(k < e)`.
//!
//! At each internode the descent binary-searches the children by their first
//! element and keeps a running index of everything skipped on the left. The
//! leaf is finished with a binary search over at most [`MAX_EXT`] cells.
//!
//! [`MAX_EXT`]: crate::config::MAX_EXT

use crate::alloc::BlockAllocator;
use crate::node::Node;

use super::Tree;

impl<T, A: BlockAllocator<T>> Tree<T, A> {
    /// First index whose element fails `pred`, assuming `pred` holds for a
    /// prefix of the sequence and fails for the remainder.
    pub fn partition_point<P: FnMut(&T) -> bool>(&self, mut pred: P) -> usize {
        let (Some(first), Some(last)) = (self.root.first(), self.root.last()) else {
            return 0;
        };
        if !pred(first) {
            return 0;
        }
        if pred(last) {
            return self.len();
        }

        let mut node = &self.root;
        let mut base = 0;
        loop {
            match node {
                Node::Leaf(leaf) => return base + leaf.cells.partition_point(|v| pred(v)),
                Node::Internode(inner) => {
                    // Children whose first element passes form a prefix; the
                    // answer lies in the last of them.
                    let passing = inner
                        .children
                        .partition_point(|child| child.first().is_some_and(|v| pred(v)));
                    let slot = passing.saturating_sub(1);
                    base += inner.offset_of(slot);
                    node = &inner.children[slot];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_point_matches_slice() {
        let values: Vec<usize> = (0..5000).map(|v| v / 3).collect();
        let tree: Tree<usize> = values.iter().copied().collect();
        for probe in [0, 1, 7, 500, 1666, 1667, 4000] {
            assert_eq!(
                tree.partition_point(|&v| v < probe),
                values.partition_point(|&v| v < probe),
                "lower bound of {probe}"
            );
            assert_eq!(
                tree.partition_point(|&v| v <= probe),
                values.partition_point(|&v| v <= probe),
                "upper bound of {probe}"
            );
        }
    }

    #[test]
    fn test_partition_point_call_count_is_logarithmic() {
        let tree: Tree<usize> = (0..200_000).collect();
        let levels = tree.height() - 1;
        for target in [1, 777, 100_000, 199_999] {
            let mut calls = 0;
            let at = tree.partition_point(|&v| {
                calls += 1;
                v < target
            });
            assert_eq!(at, target);
            assert!(calls <= 2 + 6 * levels + 9, "{calls} predicate calls for {target}");
        }
    }

    #[test]
    fn test_partition_point_edges() {
        let tree: Tree<u32> = Tree::new();
        assert_eq!(tree.partition_point(|_| true), 0);

        let tree: Tree<u32> = (10..20).collect();
        assert_eq!(tree.partition_point(|&v| v < 5), 0);
        assert_eq!(tree.partition_point(|&v| v < 100), 10);
        assert_eq!(tree.partition_point(|&v| v < 15), 5);
    }
}
