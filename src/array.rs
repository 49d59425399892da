//! The configurable container behind every facade.
//!
//! [`BpTreeArray`] pairs a positional [`Tree`] with a key-extraction policy
//! ([`KeyOf`]), a comparator ([`Compare`]) and an [`ArrayConfig`]:
//!
//! | Config                  | Facade                 | `insert` places the value |
//! |-------------------------|------------------------|---------------------------|
//! | [`ArrayConfig::UNIQUE`]   | `Set`, `Map`           | at its lower bound, unless an equivalent key exists |
//! | [`ArrayConfig::MULTI`]    | `MultiSet`, `MultiMap` | after every equivalent key |
//! | [`ArrayConfig::SEQUENCE`] | `Sequence`             | at the end |
//!
//! Positions are plain `usize` indices. Every element keeps an index in
//! `0..len`, and ordered searches return the index where the key is or
//! would go.
//!
//! Positional operations (`insert_at`, `splice`, `write` in sequence mode,
//! `get_mut`) are available in every mode. In ordered mode the caller keeps
//! the elements sorted; breaking the order is a logic error that makes
//! later searches return unspecified positions, but never unsafety.

use std::fmt as StdFmt;
use std::marker::PhantomData;
use std::ops::{Range, RangeBounds};

use crate::alloc::{BlockAllocator, HeapBlocks};
use crate::config::{ArrayConfig, MAX_EXT};
use crate::ordering::{Compare, Identity, KeyOf, Natural};
use crate::tree::{IntoIter, Iter, IterMut, Tree, TreeError, TreeShape, check_range, plan_merge, resolve_range};

/// Augmented B+tree array with optional ordering.
pub struct BpTreeArray<T, KO = Identity, C = Natural, A = HeapBlocks> {
    tree: Tree<T, A>,
    compare: C,
    config: ArrayConfig,
    _key: PhantomData<fn() -> KO>,
}

// ============================================================================
//  Construction and observers
// ============================================================================

impl<T, KO, C, A> BpTreeArray<T, KO, C, A>
where
    KO: KeyOf<T>,
    C: Compare<KO::Key>,
    A: BlockAllocator<T>,
{
    /// Create an empty array.
    #[must_use]
    pub fn new(config: ArrayConfig) -> Self
    where
        C: Default,
        A: Default,
    {
        Self::with_parts(config, C::default(), A::default())
    }

    /// Create an empty array ordered by `compare`.
    #[must_use]
    pub fn with_compare(config: ArrayConfig, compare: C) -> Self
    where
        A: Default,
    {
        Self::with_parts(config, compare, A::default())
    }

    /// Create an empty array from every construction-time choice.
    #[must_use]
    pub const fn with_parts(config: ArrayConfig, compare: C, alloc: A) -> Self {
        Self {
            tree: Tree::with_allocator(alloc),
            compare,
            config,
            _key: PhantomData,
        }
    }

    /// The construction-time configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> ArrayConfig {
        self.config
    }

    /// The key comparator.
    #[inline]
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.compare
    }

    /// The underlying positional tree.
    #[inline]
    #[must_use]
    pub const fn as_tree(&self) -> &Tree<T, A> {
        &self.tree
    }

    /// Number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the array is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Number of tree levels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.tree.height()
    }

    /// Element slots held by live leaf blocks.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Largest element count the array could ever hold.
    #[inline]
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.tree.max_size()
    }

    /// Node counts.
    #[must_use]
    pub fn shape(&self) -> TreeShape {
        self.tree.shape()
    }

    /// Verify the tree invariants and, in ordered mode, the element order.
    pub fn check_invariants(&self) -> Result<TreeShape, TreeError> {
        let shape = self.tree.check_invariants()?;
        if self.config.ordered {
            let strict = self.config.rejects_duplicates();
            let sorted = self.tree.iter().zip(self.tree.iter().skip(1)).all(|(a, b)| {
                let (ka, kb) = (KO::key_of(a), KO::key_of(b));
                if strict {
                    self.compare.less(ka, kb)
                } else {
                    !self.compare.less(kb, ka)
                }
            });
            if !sorted {
                return Err(TreeError::Corrupted {
                    what: "elements out of order",
                    depth: shape.height - 1,
                });
            }
        }
        Ok(shape)
    }

    // ========================================================================
    //  Positional access
    // ========================================================================

    /// Element at `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.tree.get(index)
    }

    /// Element at `index`, or [`TreeError::OutOfRange`].
    pub fn at(&self, index: usize) -> Result<&T, TreeError> {
        self.tree.at(index)
    }

    /// Mutable element at `index`.
    ///
    /// In ordered mode, changing the element's key is a logic error; use
    /// [`write`](Self::write) instead.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.tree.get_mut(index)
    }

    /// First element.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.first()
    }

    /// Last element.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.last()
    }

    /// Iterate in logical order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    /// Iterate over a positional range, clamped to the array.
    #[must_use]
    pub fn iter_range<R: RangeBounds<usize>>(&self, range: R) -> Iter<'_, T> {
        self.tree.iter_range(range)
    }

    /// Iterate mutably in logical order. The ordered-mode caveat of
    /// [`get_mut`](Self::get_mut) applies.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.tree.iter_mut()
    }

    /// Fold `f` over the elements in `range`, starting from `init`.
    ///
    /// Unlike [`iter_range`](Self::iter_range) the range is not clamped: an
    /// inverted or out-of-bounds range is [`TreeError::InvalidRange`].
    pub fn accumulate<R, Acc, F>(&self, range: R, init: Acc, f: F) -> Result<Acc, TreeError>
    where
        R: RangeBounds<usize>,
        F: FnMut(Acc, &T) -> Acc,
    {
        let len = self.len();
        let (start, end) = resolve_range(&range, len);
        check_range(start, end, len)?;
        Ok(self.tree.iter_range(start..end).fold(init, f))
    }

    // ========================================================================
    //  Ordered search
    // ========================================================================

    /// First index whose key is not less than `key`.
    #[must_use]
    pub fn lower_bound(&self, key: &KO::Key) -> usize {
        self.tree.partition_point(|v| self.compare.less(KO::key_of(v), key))
    }

    /// First index whose key is greater than `key`.
    #[must_use]
    pub fn upper_bound(&self, key: &KO::Key) -> usize {
        self.tree.partition_point(|v| !self.compare.less(key, KO::key_of(v)))
    }

    /// Index range of the elements equivalent to `key`.
    #[must_use]
    pub fn equal_range(&self, key: &KO::Key) -> Range<usize> {
        let lo = self.lower_bound(key);
        let hi = match self.tree.get(lo) {
            Some(v) if !self.compare.less(key, KO::key_of(v)) => self.upper_bound(key),
            _ => lo,
        };
        lo..hi
    }

    /// Index of the first element equivalent to `key`.
    #[must_use]
    pub fn find(&self, key: &KO::Key) -> Option<usize> {
        let lo = self.lower_bound(key);
        self.tree
            .get(lo)
            .filter(|v| !self.compare.less(key, KO::key_of(v)))
            .map(|_| lo)
    }

    /// The first element equivalent to `key`.
    #[must_use]
    pub fn get_key(&self, key: &KO::Key) -> Option<&T> {
        self.find(key).and_then(|index| self.tree.get(index))
    }

    /// Number of elements equivalent to `key`.
    #[must_use]
    pub fn count(&self, key: &KO::Key) -> usize {
        self.equal_range(key).len()
    }

    /// Whether an element equivalent to `key` is present.
    #[must_use]
    pub fn contains(&self, key: &KO::Key) -> bool {
        self.find(key).is_some()
    }

    // ========================================================================
    //  Insertion
    // ========================================================================

    /// Insert `value` where the configuration places it.
    ///
    /// Returns the element's index and whether it was inserted. A unique
    /// array that already holds an equivalent key is left unchanged and
    /// reports that key's index with `false`.
    pub fn insert(&mut self, value: T) -> (usize, bool) {
        if !self.config.ordered {
            let at = self.len();
            self.tree.push_back(value);
            return (at, true);
        }
        let key = KO::key_of(&value);
        let at = if self.config.multi {
            self.upper_bound(key)
        } else {
            let at = self.lower_bound(key);
            if self.tree.get(at).is_some_and(|v| !self.compare.less(key, KO::key_of(v))) {
                return (at, false);
            }
            at
        };
        self.tree.insert(at, value);
        (at, true)
    }

    /// Insert `value` at `hint` if that keeps the order, otherwise as
    /// [`insert`](Self::insert) does. In sequence mode `hint` is the
    /// position, clamped to the length.
    pub fn insert_hint(&mut self, hint: usize, value: T) -> (usize, bool) {
        let hint = hint.min(self.len());
        if !self.config.ordered {
            self.tree.insert(hint, value);
            return (hint, true);
        }
        let key = KO::key_of(&value);
        let prev = hint.checked_sub(1).and_then(|i| self.tree.get(i));
        if self.fits_between(key, prev, self.tree.get(hint)) {
            self.tree.insert(hint, value);
            (hint, true)
        } else {
            self.insert(value)
        }
    }

    /// Insert every element of `iter`, returning how many were inserted.
    ///
    /// In sequence mode the elements are appended as one spliced subtree.
    /// In ordered mode they are sorted first (and deduplicated in unique
    /// mode); a batch that is small next to the array is inserted one by
    /// one, a larger one is merged in a single pass.
    pub fn insert_iter<I: IntoIterator<Item = T>>(&mut self, iter: I) -> usize {
        if !self.config.ordered {
            return self.tree.insert_iter(self.tree.len(), iter);
        }
        let unique = self.config.rejects_duplicates();
        let mut incoming: Vec<T> = iter.into_iter().collect();
        let compare = &self.compare;
        incoming.sort_by(|a, b| compare.ordering(KO::key_of(a), KO::key_of(b)));
        if unique {
            incoming.dedup_by(|b, a| compare.equivalent(KO::key_of(a), KO::key_of(b)));
        }

        if incoming.len().saturating_mul(MAX_EXT) < self.len() {
            let mut added = 0;
            for value in incoming {
                added += usize::from(self.insert(value).1);
            }
            return added;
        }

        let before = self.len();
        let compare = &self.compare;
        let mut less = |a: &T, b: &T| compare.less(KO::key_of(a), KO::key_of(b));
        let steps = plan_merge(self.tree.iter(), &incoming, unique, &mut less);
        self.tree.merge_span(0, before, incoming, steps);
        self.len() - before
    }

    /// Insert `value` before position `index`, ignoring the order.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_at(&mut self, index: usize, value: T) {
        self.tree.insert(index, value);
    }

    /// Insert `count` clones of `value` before position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_count(&mut self, index: usize, count: usize, value: &T)
    where
        T: Clone,
    {
        self.tree.insert_count(index, count, value);
    }

    /// Append `value`, ignoring the order.
    pub fn push_back(&mut self, value: T) {
        self.tree.push_back(value);
    }

    /// Prepend `value`, ignoring the order.
    pub fn push_front(&mut self, value: T) {
        self.tree.push_front(value);
    }

    /// Grow with clones of `value` or shrink to `new_len`.
    pub fn resize(&mut self, new_len: usize, value: &T)
    where
        T: Clone,
    {
        self.tree.resize(new_len, value);
    }

    /// Replace the element at `index`.
    ///
    /// In sequence mode the value is stored in place. In ordered mode it is
    /// stored in place when its neighbours still bracket it, otherwise the
    /// old element is erased and `value` inserted where it belongs. A unique
    /// array that holds an equivalent key at another index is left
    /// unchanged and reports that index with `false`.
    pub fn write(&mut self, index: usize, value: T) -> Result<(usize, bool), TreeError> {
        let len = self.len();
        if index >= len {
            return Err(TreeError::OutOfRange { index, len });
        }
        if self.config.ordered {
            let key = KO::key_of(&value);
            if self.config.rejects_duplicates() {
                let lo = self.lower_bound(key);
                let taken = self.tree.get(lo).is_some_and(|v| !self.compare.less(key, KO::key_of(v)));
                if taken && lo != index {
                    return Ok((lo, false));
                }
            }
            let prev = index.checked_sub(1).and_then(|i| self.tree.get(i));
            if !self.fits_between(key, prev, self.tree.get(index + 1)) {
                self.tree.remove(index);
                return Ok(self.insert(value));
            }
        }
        if let Some(slot) = self.tree.get_mut(index) {
            *slot = value;
        }
        Ok((index, true))
    }

    /// Whether `key` may sit between `prev` and `next`.
    fn fits_between(&self, key: &KO::Key, prev: Option<&T>, next: Option<&T>) -> bool {
        let strict = self.config.rejects_duplicates();
        let after_prev = prev.is_none_or(|p| {
            let pk = KO::key_of(p);
            if strict {
                self.compare.less(pk, key)
            } else {
                !self.compare.less(key, pk)
            }
        });
        let before_next = next.is_none_or(|n| {
            let nk = KO::key_of(n);
            if strict {
                self.compare.less(key, nk)
            } else {
                !self.compare.less(nk, key)
            }
        });
        after_prev && before_next
    }

    // ========================================================================
    //  Erasure
    // ========================================================================

    /// Remove and return the element at `index`.
    pub fn erase(&mut self, index: usize) -> Option<T> {
        self.tree.remove(index)
    }

    /// Remove a positional range, returning how many elements were dropped.
    pub fn erase_range<R: RangeBounds<usize>>(&mut self, range: R) -> Result<usize, TreeError> {
        self.tree.remove_range(range)
    }

    /// Remove every element equivalent to `key`, returning how many.
    pub fn erase_key(&mut self, key: &KO::Key) -> usize {
        let range = self.equal_range(key);
        let count = range.len();
        self.tree.erase_span(range.start, range.end);
        count
    }

    /// Remove and return the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        self.tree.pop_back()
    }

    /// Remove and return the first element.
    pub fn pop_front(&mut self) -> Option<T> {
        self.tree.pop_front()
    }

    /// Keep only the first `len` elements.
    pub fn truncate(&mut self, len: usize) {
        self.tree.truncate(len);
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Replace the contents with the elements of `iter`, ordered (and
    /// deduplicated in unique mode) the way [`insert_iter`] does.
    /// Returns how many were kept.
    ///
    /// [`insert_iter`]: Self::insert_iter
    pub fn assign<I: IntoIterator<Item = T>>(&mut self, iter: I) -> usize {
        self.tree.clear();
        self.insert_iter(iter)
    }

    /// Exchange contents, comparators and configurations with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    // ========================================================================
    //  Split and splice
    // ========================================================================

    /// Move `at..` into `out`, which must be empty.
    pub fn split_into(&mut self, at: usize, out: &mut Self) -> Result<(), TreeError> {
        self.tree.split_into(at, &mut out.tree)
    }

    /// Split at `at`, returning the tail as a new array with the same
    /// configuration.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`.
    #[must_use = "use `truncate` to drop the tail"]
    pub fn split_off(&mut self, at: usize) -> Self
    where
        C: Clone,
        A: Default,
    {
        Self {
            tree: self.tree.split_off(at),
            compare: self.compare.clone(),
            config: self.config,
            _key: PhantomData,
        }
    }

    /// Move the positional range `range` into `out`, which must be empty.
    pub fn split_range_into<R: RangeBounds<usize>>(&mut self, range: R, out: &mut Self) -> Result<(), TreeError> {
        self.tree.split_range_into(range, &mut out.tree)
    }

    /// Move all of `other` before position `at`. Returns the index just past
    /// the inserted run.
    pub fn splice(&mut self, at: usize, other: &mut Self) -> Result<usize, TreeError> {
        self.tree.splice(at, &mut other.tree)
    }

    /// Move the element at `index` of `other` before position `at`.
    pub fn splice_one(&mut self, at: usize, other: &mut Self, index: usize) -> Result<usize, TreeError> {
        self.tree.splice_one(at, &mut other.tree, index)
    }

    /// Move `range` of `other` before position `at`.
    pub fn splice_range<R: RangeBounds<usize>>(
        &mut self,
        at: usize,
        other: &mut Self,
        range: R,
    ) -> Result<usize, TreeError> {
        self.tree.splice_range(at, &mut other.tree, range)
    }

    /// Move `range` of this array so it starts before position `at`.
    pub fn move_range<R: RangeBounds<usize>>(&mut self, at: usize, range: R) -> Result<usize, TreeError> {
        self.tree.move_range(at, range)
    }

    /// Append all of `other`, leaving it empty.
    pub fn append(&mut self, other: &mut Self) {
        self.tree.append(&mut other.tree);
    }

    // ========================================================================
    //  Whole-array rewrites
    // ========================================================================

    /// Merge the sorted `other` into this sorted array under the key
    /// comparator, leaving `other` empty. Unique arrays drop incoming keys
    /// they already hold. Returns how many elements were added.
    pub fn merge(&mut self, other: &mut Self) -> usize {
        let unique = self.config.rejects_duplicates();
        let compare = &self.compare;
        self.tree
            .merge_by(&mut other.tree, unique, |a, b| compare.less(KO::key_of(a), KO::key_of(b)))
    }

    /// Merge two arrays sorted under `less`, leaving `other` empty.
    pub fn merge_by<F: FnMut(&T, &T) -> bool>(&mut self, other: &mut Self, less: F) -> usize {
        let unique = self.config.rejects_duplicates();
        self.tree.merge_by(&mut other.tree, unique, less)
    }

    /// Stable sort under the key comparator.
    pub fn sort(&mut self) {
        let compare = &self.compare;
        self.tree.sort_by(|a, b| compare.ordering(KO::key_of(a), KO::key_of(b)));
    }

    /// Stable sort with a three-way comparator.
    pub fn sort_by<F: FnMut(&T, &T) -> std::cmp::Ordering>(&mut self, compare: F) {
        self.tree.sort_by(compare);
    }

    /// Stable sort by an extracted key.
    pub fn sort_by_key<K: Ord, F: FnMut(&T) -> K>(&mut self, mut f: F) {
        self.tree.sort_by(|a, b| f(a).cmp(&f(b)));
    }

    /// Drop each element whose key is equivalent to the one kept before it.
    pub fn unique(&mut self) {
        let compare = &self.compare;
        self.tree
            .dedup_by(|kept, candidate| compare.equivalent(KO::key_of(kept), KO::key_of(candidate)));
    }

    /// Drop each element for which `same(kept, candidate)` holds against
    /// the element kept before it.
    pub fn unique_by<F: FnMut(&T, &T) -> bool>(&mut self, same: F) {
        self.tree.dedup_by(same);
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
        let before = self.len();
        self.tree.retain(|v| !pred(v));
        before - self.len()
    }

    /// Keep only the elements matching `keep`.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.tree.retain(keep);
    }

    /// Reverse the element order.
    pub fn reverse(&mut self) {
        self.tree.reverse();
    }
}

// ============================================================================
//  Trait impls
// ============================================================================

impl<T: StdFmt::Debug, KO, C, A> StdFmt::Debug for BpTreeArray<T, KO, C, A> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("BpTreeArray")
            .field("config", &self.config)
            .field("elements", &self.tree)
            .finish_non_exhaustive()
    }
}

impl<T, KO, C, A> Clone for BpTreeArray<T, KO, C, A>
where
    T: Clone,
    C: Clone,
    A: BlockAllocator<T> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            compare: self.compare.clone(),
            config: self.config,
            _key: PhantomData,
        }
    }
}

impl<T: PartialEq, KO, C, A: BlockAllocator<T>> PartialEq for BpTreeArray<T, KO, C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<T: Eq, KO, C, A: BlockAllocator<T>> Eq for BpTreeArray<T, KO, C, A> {}

impl<T: PartialOrd, KO, C, A: BlockAllocator<T>> PartialOrd for BpTreeArray<T, KO, C, A> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.tree.partial_cmp(&other.tree)
    }
}

impl<T: Ord, KO, C, A: BlockAllocator<T>> Ord for BpTreeArray<T, KO, C, A> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.tree.cmp(&other.tree)
    }
}

impl<T, KO, C, A: BlockAllocator<T>> std::ops::Index<usize> for BpTreeArray<T, KO, C, A> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.tree[index]
    }
}

impl<T, KO, C, A> Extend<T> for BpTreeArray<T, KO, C, A>
where
    KO: KeyOf<T>,
    C: Compare<KO::Key>,
    A: BlockAllocator<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_iter(iter);
    }
}

impl<'a, T, KO, C, A: BlockAllocator<T>> IntoIterator for &'a BpTreeArray<T, KO, C, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.iter()
    }
}

impl<T, KO, C, A: BlockAllocator<T>> IntoIterator for BpTreeArray<T, KO, C, A> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.tree.into_iter()
    }
}
