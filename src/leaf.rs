//! Leaf blocks.
//!
//! A leaf block is a contiguous run of element cells. Every non-root leaf
//! holds between [`MIN_EXT`] and [`MAX_EXT`] elements; the root leaf may hold
//! anything up to [`MAX_EXT`].
//!
//! ```text
//!   [ e0 | e1 | e2 | ... | e(n-1) | . . spare . . ]
//!     ^ first cell          ^ last occupied cell
//! ```
//!
//! Blocks are obtained from and returned to a [`BlockAllocator`]; a leaf never
//! frees its own storage.

use std::fmt as StdFmt;

use crate::alloc::BlockAllocator;
use crate::config::{MAX_EXT, MIN_EXT};

/// One bottom-level node: an owned block of elements.
pub(crate) struct LeafBlock<T> {
    pub(crate) cells: Vec<T>,
}

impl<T> LeafBlock<T> {
    /// A leaf that owns no storage yet.
    #[inline]
    pub(crate) const fn empty() -> Self {
        Self { cells: Vec::new() }
    }

    #[inline]
    pub(crate) const fn from_block(cells: Vec<T>) -> Self {
        Self { cells }
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline(always)]
    pub(crate) fn is_overfull(&self) -> bool {
        self.cells.len() > MAX_EXT
    }

    #[inline(always)]
    pub(crate) fn is_underfull(&self) -> bool {
        self.cells.len() < MIN_EXT
    }

    /// Make sure the leaf is backed by an allocator block before the first insert.
    #[inline]
    pub(crate) fn ensure_block<A: BlockAllocator<T>>(&mut self, alloc: &mut A) {
        if self.cells.capacity() == 0 {
            self.cells = alloc.allocate();
        }
    }

    /// Shift-insert `value` at `offset`.
    #[inline]
    pub(crate) fn insert(&mut self, offset: usize, value: T) {
        debug_assert!(offset <= self.cells.len(), "insert: offset out of bounds");
        self.cells.insert(offset, value);
    }

    /// Remove and return the element at `offset`, closing the gap.
    #[inline]
    pub(crate) fn remove(&mut self, offset: usize) -> T {
        debug_assert!(offset < self.cells.len(), "remove: offset out of bounds");
        self.cells.remove(offset)
    }

    /// Move `cells[at..]` into a freshly allocated block.
    pub(crate) fn split_off<A: BlockAllocator<T>>(&mut self, at: usize, alloc: &mut A) -> Self {
        debug_assert!(at <= self.cells.len(), "split_off: offset out of bounds");
        let mut right = alloc.allocate();
        right.extend(self.cells.drain(at..));
        Self::from_block(right)
    }

    /// Split an overfull leaf, keeping [`MIN_EXT`] elements on the left.
    #[inline]
    pub(crate) fn split_overfull<A: BlockAllocator<T>>(&mut self, alloc: &mut A) -> Self {
        debug_assert!(self.is_overfull());
        self.split_off(MIN_EXT, alloc)
    }

    /// Append every element of `right` and hand its block back to `alloc`.
    pub(crate) fn absorb<A: BlockAllocator<T>>(&mut self, mut right: Self, alloc: &mut A) {
        debug_assert!(self.len() + right.len() <= MAX_EXT, "absorb: merged leaf too large");
        self.cells.append(&mut right.cells);
        alloc.release(right.cells);
    }

    /// Move the first `count` elements of `right` onto the end of `self`.
    pub(crate) fn take_front_of(&mut self, right: &mut Self, count: usize) {
        self.cells.extend(right.cells.drain(..count));
    }

    /// Move the last `count` elements of `self` onto the front of `right`.
    pub(crate) fn give_back_to(&mut self, right: &mut Self, count: usize) {
        let start = self.cells.len() - count;
        right.cells.splice(0..0, self.cells.drain(start..));
    }
}

impl<T: StdFmt::Debug> StdFmt::Debug for LeafBlock<T> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("LeafBlock")
            .field("len", &self.cells.len())
            .field("first", &self.cells.first())
            .field("last", &self.cells.last())
            .finish()
    }
}
