//! Positional cursor.
//!
//! A [`Cursor`] pairs a logical index with a direct view of the leaf block
//! holding it, so dereference is a slice access. It also keeps the slot it
//! took at every internode on the way down, so crossing into a neighbouring
//! block climbs only to the nearest ancestor with a sibling on that side.
//! Movement picks one of three regimes by distance:
//!
//! | Distance                       | Strategy                            |
//! |--------------------------------|-------------------------------------|
//! | `<= MIN_EXT`                   | step within or into the next block  |
//! | `<= (height + 1) * MIN_INT`    | walk sibling blocks along the path  |
//! | larger                         | one descent from the root           |
//!
//! A cursor borrows its tree, so no mutation can happen while it is alive;
//! mutating operations report positions as plain indices instead.
//!
//! Cursors compare by logical index only. Comparing cursors of different
//! trees is meaningless but harmless.

use std::cmp::Ordering;
use std::fmt as StdFmt;

use crate::alloc::BlockAllocator;
use crate::config::{MAX_HEIGHT, MIN_EXT, local_limit};
use crate::node::Node;

use super::Tree;

/// Read-only position inside a [`Tree`].
pub struct Cursor<'a, T> {
    root: &'a Node<T>,
    height: usize,
    len: usize,
    index: usize,
    block: &'a [T],
    block_start: usize,
    /// Children of each internode on the path, root first.
    levels: [&'a [Node<T>]; MAX_HEIGHT],
    /// Slot taken in each of `levels`.
    slots: [usize; MAX_HEIGHT],
    depth: usize,
}

impl<'a, T> Cursor<'a, T> {
    /// Position a cursor at `index` (clamped to `len`).
    pub(crate) fn new(root: &'a Node<T>, height: usize, index: usize) -> Self {
        let len = root.len();
        let none: &'a [Node<T>] = &[];
        let mut cursor = Self {
            root,
            height,
            len,
            index: index.min(len),
            block: &[],
            block_start: 0,
            levels: [none; MAX_HEIGHT],
            slots: [0; MAX_HEIGHT],
            depth: 0,
        };
        cursor.descend();
        cursor
    }

    /// Logical index; equals the tree length at the end position.
    #[inline(always)]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Whether the cursor sits one past the last element.
    #[inline(always)]
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.index >= self.len
    }

    /// The element under the cursor, `None` at the end position.
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&'a T> {
        self.block.get(self.index.wrapping_sub(self.block_start))
    }

    /// Remaining elements of the current block, starting at the cursor.
    #[inline]
    #[must_use]
    pub fn block_tail(&self) -> &'a [T] {
        let offset = self.index - self.block_start;
        self.block.get(offset..).unwrap_or(&[])
    }

    /// Advance by one. Returns `false` if already at the end.
    pub fn move_next(&mut self) -> bool {
        if self.index >= self.len {
            return false;
        }
        self.index += 1;
        if self.index - self.block_start >= self.block.len() && self.index < self.len {
            self.step_block(true);
        }
        true
    }

    /// Step back by one. Returns `false` if already at the start.
    pub fn move_prev(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        if self.index < self.block_start {
            self.step_block(false);
        }
        true
    }

    /// Move to absolute position `target` (clamped to `len`).
    pub fn seek(&mut self, target: usize) {
        let target = target.min(self.len);
        let distance = target.abs_diff(self.index);
        if distance <= MIN_EXT || distance <= local_limit(self.height) {
            self.step_to(target);
        } else {
            self.index = target;
            self.descend();
        }
    }

    /// Move by a signed offset, saturating at both ends.
    pub fn advance(&mut self, delta: isize) {
        let target = if delta.is_negative() {
            self.index.saturating_sub(delta.unsigned_abs())
        } else {
            self.index.saturating_add(delta.unsigned_abs())
        };
        self.seek(target);
    }

    /// Walk block by block until `target` is inside the current block.
    fn step_to(&mut self, target: usize) {
        loop {
            let block_end = self.block_start + self.block.len();
            // the end position belongs to the last block
            let holds_end = target == self.len && block_end == self.len;
            if target >= self.block_start && (target < block_end || holds_end) {
                self.index = target;
                return;
            }
            if !self.step_block(target >= block_end) {
                self.index = target;
                self.descend();
                return;
            }
        }
    }

    /// Descend from the root to the block holding `index`, recording the path.
    fn descend(&mut self) {
        let mut node = self.root;
        let mut rest = self.index;
        let mut start = 0;
        let mut depth = 0;
        loop {
            match node {
                Node::Leaf(leaf) => {
                    self.block = leaf.cells.as_slice();
                    self.block_start = start;
                    self.depth = depth;
                    return;
                }
                Node::Internode(inner) => {
                    let (slot, offset) = inner.locate(rest);
                    start += rest - offset;
                    rest = offset;
                    self.levels[depth] = inner.children.as_slice();
                    self.slots[depth] = slot;
                    depth += 1;
                    node = &inner.children[slot];
                }
            }
        }
    }

    /// Move to the block after (`forward`) or before the current one,
    /// leaving `index` alone. Returns `false` at either edge of the tree.
    fn step_block(&mut self, forward: bool) -> bool {
        let old_len = self.block.len();
        let mut depth = self.depth;
        loop {
            if depth == 0 {
                return false;
            }
            depth -= 1;
            let slot = self.slots[depth];
            if forward && slot + 1 < self.levels[depth].len() {
                self.slots[depth] = slot + 1;
                break;
            }
            if !forward && slot > 0 {
                self.slots[depth] = slot - 1;
                break;
            }
        }

        let level = self.levels[depth];
        let mut node = &level[self.slots[depth]];
        depth += 1;
        loop {
            match node {
                Node::Leaf(leaf) => {
                    self.block = leaf.cells.as_slice();
                    break;
                }
                Node::Internode(inner) => {
                    let slot = if forward { 0 } else { inner.children.len() - 1 };
                    self.levels[depth] = inner.children.as_slice();
                    self.slots[depth] = slot;
                    depth += 1;
                    node = &inner.children[slot];
                }
            }
        }
        if forward {
            self.block_start += old_len;
        } else {
            self.block_start -= self.block.len();
        }
        true
    }
}

impl<T, A: BlockAllocator<T>> Tree<T, A> {
    /// Cursor at `index` (clamped to the length).
    #[must_use]
    pub fn cursor(&self, index: usize) -> Cursor<'_, T> {
        Cursor::new(&self.root, self.height, index)
    }

    /// Cursor at the first element.
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, T> {
        self.cursor(0)
    }

    /// Cursor one past the last element.
    #[must_use]
    pub fn end(&self) -> Cursor<'_, T> {
        self.cursor(self.len())
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> PartialOrd for Cursor<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Cursor<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> StdFmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("len", &self.len)
            .field("block_start", &self.block_start)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(n: usize) -> Tree<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_walk_forward_and_back() {
        let tree = tree(1000);
        let mut cursor = tree.begin();
        for expected in 0..1000 {
            assert_eq!(cursor.get(), Some(&expected));
            assert!(cursor.move_next());
        }
        assert!(cursor.is_end());
        assert_eq!(cursor.get(), None);
        assert!(!cursor.move_next());

        for expected in (0..1000).rev() {
            assert!(cursor.move_prev());
            assert_eq!(cursor.get(), Some(&expected));
        }
        assert!(!cursor.move_prev());
    }

    #[test]
    fn test_seek_all_regimes() {
        let tree = tree(20_000);
        let mut cursor = tree.begin();
        for target in [3, 60, 64, 200, 150, 19_999, 5, 20_000, 10_000, 0] {
            cursor.seek(target);
            assert_eq!(cursor.index(), target);
            assert_eq!(cursor.get().copied(), (target < 20_000).then_some(target));
        }
    }

    #[test]
    fn test_walk_uneven_leaves() {
        let mut tree: Tree<usize> = Tree::new();
        for v in 0..12_000 {
            tree.insert((v * 7919) % (tree.len() + 1), v);
        }
        assert!(tree.height() >= 3);
        let expected: Vec<usize> = tree.iter().copied().collect();

        let mut cursor = tree.begin();
        for want in &expected {
            assert_eq!(cursor.get(), Some(want));
            cursor.move_next();
        }
        assert!(cursor.is_end());
        for want in expected.iter().rev() {
            cursor.move_prev();
            assert_eq!(cursor.get(), Some(want));
        }

        let mut cursor = tree.cursor(5000);
        for target in [5100, 5000, 5190, 4810, 11_999, 12_000, 11_900, 0, 150] {
            cursor.seek(target);
            assert_eq!(cursor.get(), expected.get(target), "seek to {target}");
        }
    }

    #[test]
    fn test_advance_saturates() {
        let tree = tree(300);
        let mut cursor = tree.cursor(10);
        cursor.advance(-50);
        assert_eq!(cursor.index(), 0);
        cursor.advance(1000);
        assert!(cursor.is_end());
        cursor.advance(-1);
        assert_eq!(cursor.get(), Some(&299));
    }

    #[test]
    fn test_compare_by_index() {
        let tree = tree(10);
        let a = tree.cursor(3);
        let mut b = tree.cursor(2);
        assert!(b < a);
        b.move_next();
        assert_eq!(a, b);
        assert_eq!(tree.end().index(), 10);
    }

    #[test]
    fn test_empty_tree_cursor() {
        let tree = tree(0);
        let mut cursor = tree.begin();
        assert!(cursor.is_end());
        assert_eq!(cursor.get(), None);
        assert!(!cursor.move_prev());
        cursor.seek(5);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_block_tail() {
        let tree = tree(10);
        let cursor = tree.cursor(7);
        assert_eq!(cursor.block_tail(), &[7, 8, 9]);
        assert!(tree.end().block_tail().is_empty());
    }
}
