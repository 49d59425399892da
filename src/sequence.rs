//! Positional sequence with `O(log n)` insert, erase and splice anywhere.
//!
//! [`Sequence`] keeps no ordering invariant, so every [`Tree`] operation is
//! available through `Deref`/`DerefMut`. On top of those it adds the list
//! algorithms: `sort`, `unique`, `remove`, `remove_if`, `merge`, `write` and
//! `accumulate`.
//!
//! ```rust
//! use bptarray::sequence::Sequence;
//!
//! let mut seq: Sequence<u32> = (0..1000).collect();
//! let mut tail = seq.split_off(400);
//! assert_eq!((seq.len(), tail.len()), (400, 600));
//!
//! seq.splice(0, &mut tail).unwrap();
//! assert_eq!(seq[0], 400);
//! assert_eq!(seq[600], 0);
//! ```

use std::cmp::Ordering;
use std::fmt as StdFmt;
use std::ops::{Deref, DerefMut, RangeBounds};

use crate::alloc::{BlockAllocator, HeapBlocks};
use crate::tree::{IntoIter, Iter, IterMut, Tree, TreeError, check_range, resolve_range};

/// Sequence of elements addressed by position.
pub struct Sequence<T, A = HeapBlocks>(Tree<T, A>);

impl<T, A: BlockAllocator<T> + Default> Sequence<T, A> {
    /// Create an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self(Tree::new())
    }
}

impl<T, A: BlockAllocator<T>> Sequence<T, A> {
    /// Create an empty sequence drawing blocks from `alloc`.
    #[must_use]
    pub const fn with_allocator(alloc: A) -> Self {
        Self(Tree::with_allocator(alloc))
    }

    /// The wrapped tree.
    #[must_use]
    pub fn into_tree(self) -> Tree<T, A> {
        self.0
    }

    /// Replace the element at `index` in place.
    pub fn write(&mut self, index: usize, value: T) -> Result<(), TreeError> {
        let len = self.0.len();
        let slot = self.0.get_mut(index).ok_or(TreeError::OutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Fold `f` over the elements in `range`, which must lie within the
    /// sequence.
    pub fn accumulate<R, Acc, F>(&self, range: R, init: Acc, f: F) -> Result<Acc, TreeError>
    where
        R: RangeBounds<usize>,
        F: FnMut(Acc, &T) -> Acc,
    {
        let len = self.0.len();
        let (start, end) = resolve_range(&range, len);
        check_range(start, end, len)?;
        Ok(self.0.iter_range(start..end).fold(init, f))
    }

    /// Remove and return the element at `index`.
    pub fn erase(&mut self, index: usize) -> Option<T> {
        self.0.remove(index)
    }

    /// Remove every element equal to `value`, returning how many.
    pub fn remove(&mut self, value: &T) -> usize
    where
        T: PartialEq,
    {
        self.remove_if(|v| v == value)
    }

    /// Remove every element matching `pred`, returning how many.
    pub fn remove_if<F: FnMut(&T) -> bool>(&mut self, mut pred: F) -> usize {
        let before = self.0.len();
        self.0.retain(|v| !pred(v));
        before - self.0.len()
    }

    /// Stable ascending sort.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.0.sort_by(Ord::cmp);
    }

    /// Stable sort by an extracted key.
    pub fn sort_by_key<K: Ord, F: FnMut(&T) -> K>(&mut self, mut f: F) {
        self.0.sort_by(|a, b| f(a).cmp(&f(b)));
    }

    /// Collapse each run of equal elements to its first.
    pub fn unique(&mut self)
    where
        T: PartialEq,
    {
        self.0.dedup_by(|kept, candidate| kept == candidate);
    }

    /// Collapse runs under `same(kept, candidate)`.
    pub fn unique_by<F: FnMut(&T, &T) -> bool>(&mut self, same: F) {
        self.0.dedup_by(same);
    }

    /// Merge the ascending `other` into this ascending sequence, leaving
    /// `other` empty. Equal elements keep this sequence's first.
    pub fn merge(&mut self, other: &mut Self)
    where
        T: Ord,
    {
        self.0.merge_by(&mut other.0, false, |a, b| a < b);
    }

    /// Merge two sequences sorted under `less`.
    pub fn merge_by<F: FnMut(&T, &T) -> bool>(&mut self, other: &mut Self, less: F) {
        self.0.merge_by(&mut other.0, false, less);
    }

    /// Split at `at`, returning the tail.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`.
    #[must_use = "use `truncate` to drop the tail"]
    pub fn split_off(&mut self, at: usize) -> Self
    where
        A: Default,
    {
        Self(self.0.split_off(at))
    }

    /// Sort with a three-way comparator.
    pub fn sort_by<F: FnMut(&T, &T) -> Ordering>(&mut self, compare: F) {
        self.0.sort_by(compare);
    }
}

impl<T, A> Deref for Sequence<T, A> {
    type Target = Tree<T, A>;

    fn deref(&self) -> &Tree<T, A> {
        &self.0
    }
}

impl<T, A> DerefMut for Sequence<T, A> {
    fn deref_mut(&mut self) -> &mut Tree<T, A> {
        &mut self.0
    }
}

impl<T, A: BlockAllocator<T> + Default> Default for Sequence<T, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, A: BlockAllocator<T> + Clone> Clone for Sequence<T, A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: StdFmt::Debug, A> StdFmt::Debug for Sequence<T, A> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        StdFmt::Debug::fmt(&self.0, f)
    }
}

impl<T: PartialEq, A: BlockAllocator<T>> PartialEq for Sequence<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Eq, A: BlockAllocator<T>> Eq for Sequence<T, A> {}

impl<T: PartialOrd, A: BlockAllocator<T>> PartialOrd for Sequence<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl<T: Ord, A: BlockAllocator<T>> Ord for Sequence<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T, A: BlockAllocator<T> + Default> FromIterator<T> for Sequence<T, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T, A: BlockAllocator<T>> Extend<T> for Sequence<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend_back(iter);
    }
}

impl<'a, T, A: BlockAllocator<T>> IntoIterator for &'a Sequence<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'a, T, A: BlockAllocator<T>> IntoIterator for &'a mut Sequence<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter_mut()
    }
}

impl<T, A: BlockAllocator<T>> IntoIterator for Sequence<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
