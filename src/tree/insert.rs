//! Single-element insertion.
//!
//! The descent bumps every cached length on the way down and records the
//! child slots taken. After the shift-insert into the leaf, an overflowing
//! leaf is split (64 cells stay left) and the split propagates up the
//! recorded path until some ancestor still fits. Only an overflowing root
//! grows the tree.

use crate::alloc::BlockAllocator;
use crate::node::{self, Node, Path};
use crate::tracing_helpers::debug_log;

use super::Tree;

impl<T, A: BlockAllocator<T>> Tree<T, A> {
    /// Insert `value` so that it ends up at `index`, shifting later elements.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) {
        let len = self.len();
        assert!(index <= len, "insertion index {index} out of range for length {len}");

        let mut path = Path::new();
        let mut cur = &mut self.root;
        let mut offset = index;
        loop {
            match cur {
                Node::Internode(inner) => {
                    let (slot, rest) = inner.locate(offset);
                    inner.len += 1;
                    path.push(slot);
                    offset = rest;
                    cur = &mut inner.children[slot];
                }
                Node::Leaf(leaf) => {
                    leaf.ensure_block(&mut self.alloc);
                    leaf.insert(offset, value);
                    if !leaf.is_overfull() {
                        return;
                    }
                    break;
                }
            }
        }

        if node::split_upward(&mut self.root, &path, &mut self.alloc) {
            self.grow();
        }
    }

    /// Append `value` at the end.
    #[inline]
    pub fn push_back(&mut self, value: T) {
        self.insert(self.len(), value);
    }

    /// Prepend `value` at the front.
    #[inline]
    pub fn push_front(&mut self, value: T) {
        self.insert(0, value);
    }

    /// Insert `count` clones of `value` at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_count(&mut self, index: usize, count: usize, value: &T)
    where
        T: Clone,
    {
        self.insert_iter(index, std::iter::repeat_n(value, count).cloned());
    }

    /// Grow or shrink to `new_len`, filling with clones of `value`.
    pub fn resize(&mut self, new_len: usize, value: &T)
    where
        T: Clone,
    {
        let len = self.len();
        if new_len > len {
            self.insert_count(len, new_len - len, value);
        } else if new_len < len {
            self.truncate(new_len);
        }
    }

    /// Add a level on top of an overflowing root.
    pub(crate) fn grow(&mut self) {
        node::grow(&mut self.root, &mut self.alloc);
        self.height += 1;
        debug_log!(height = self.height, len = self.len(), "tree grew a level");
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Fail fast in tests")]
mod tests {
    use super::*;
    use crate::config::{MAX_EXT, MIN_EXT};

    #[test]
    fn test_append_grows_height() {
        let mut tree: Tree<usize> = Tree::new();
        for i in 0..=MAX_EXT {
            tree.push_back(i);
        }
        assert_eq!(tree.height(), 2);
        let shape = tree.check_invariants().unwrap();
        assert_eq!(shape.leaves, 2);
        assert_eq!(tree.get(MIN_EXT), Some(&MIN_EXT));
    }

    #[test]
    fn test_insert_front_matches_vec() {
        let mut tree: Tree<usize> = Tree::new();
        let mut oracle = Vec::new();
        for i in 0..3000 {
            tree.push_front(i);
            oracle.insert(0, i);
        }
        tree.check_invariants().unwrap();
        assert!(tree.iter().eq(oracle.iter()));
        assert!(tree.height() >= 3);
    }

    #[test]
    fn test_insert_middle_matches_vec() {
        let mut tree: Tree<usize> = Tree::new();
        let mut oracle = Vec::new();
        for i in 0..5000 {
            let at = (i * 7919) % (oracle.len() + 1);
            tree.insert(at, i);
            oracle.insert(at, i);
        }
        tree.check_invariants().unwrap();
        assert!(tree.iter().eq(oracle.iter()));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_insert_past_end_panics() {
        let mut tree: Tree<u8> = Tree::new();
        tree.insert(1, 0);
    }

    #[test]
    fn test_resize() {
        let mut tree: Tree<u8> = (0..10).collect();
        tree.resize(500, &9);
        assert_eq!(tree.len(), 500);
        assert_eq!(tree.get(499), Some(&9));
        tree.check_invariants().unwrap();
        tree.resize(3, &0);
        assert!(tree.iter().copied().eq(0..3));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_count() {
        let mut tree: Tree<u32> = (0..200).collect();
        tree.insert_count(100, 300, &7);
        assert_eq!(tree.len(), 500);
        assert_eq!(tree.get(99), Some(&99));
        assert_eq!(tree.get(100), Some(&7));
        assert_eq!(tree.get(399), Some(&7));
        assert_eq!(tree.get(400), Some(&100));
        tree.check_invariants().unwrap();
    }
}
