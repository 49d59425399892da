//! Ordered maps: [`Map`] keeps one entry per key, [`MultiMap`] keeps all.
//!
//! Entries are stored as `(K, V)` pairs ordered by key through [`PairKey`].
//! As with the sets, read-only operations come from the wrapped
//! [`BpTreeArray`] through `Deref`; `get(index)` there returns the pair at a
//! position, while [`Map::get`] looks a key up.

use std::fmt as StdFmt;
use std::ops::{Deref, RangeBounds};

use crate::alloc::{BlockAllocator, HeapBlocks};
use crate::array::BpTreeArray;
use crate::config::ArrayConfig;
use crate::ordering::{Compare, Natural, PairKey};
use crate::tree::{IntoIter, Iter, TreeError};

macro_rules! map_common {
    ($name:ident, $config:expr) => {
        impl<K, V, C, A> $name<K, V, C, A>
        where
            C: Compare<K>,
            A: BlockAllocator<(K, V)>,
        {
            /// Create an empty map.
            #[must_use]
            pub fn new() -> Self
            where
                C: Default,
                A: Default,
            {
                Self(BpTreeArray::new($config))
            }

            /// Create an empty map ordered by `compare`.
            #[must_use]
            pub fn with_compare(compare: C) -> Self
            where
                A: Default,
            {
                Self(BpTreeArray::with_compare($config, compare))
            }

            /// Create an empty map ordered by `compare`, drawing blocks from `alloc`.
            #[must_use]
            pub const fn with_parts(compare: C, alloc: A) -> Self {
                Self(BpTreeArray::with_parts($config, compare, alloc))
            }

            /// The wrapped array.
            #[must_use]
            pub fn into_array(self) -> BpTreeArray<(K, V), PairKey, C, A> {
                self.0
            }

            /// Value of the first entry with `key`.
            #[must_use]
            pub fn get(&self, key: &K) -> Option<&V> {
                self.0.get_key(key).map(|entry| &entry.1)
            }

            /// Mutable value of the first entry with `key`.
            pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
                let index = self.0.find(key)?;
                self.0.get_mut(index).map(|entry| &mut entry.1)
            }

            /// Whether an entry with `key` exists.
            #[must_use]
            pub fn contains_key(&self, key: &K) -> bool {
                self.0.contains(key)
            }

            /// Keys in order.
            pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator {
                self.0.iter().map(|entry| &entry.0)
            }

            /// Values in key order.
            pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
                self.0.iter().map(|entry| &entry.1)
            }

            /// Mutable values in key order.
            pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
                self.0.iter_mut().map(|entry| &mut entry.1)
            }

            /// Replace the value of the entry at `index`. The key and position
            /// are unchanged.
            pub fn write(&mut self, index: usize, value: V) -> Result<(), TreeError> {
                let len = self.0.len();
                let entry = self.0.get_mut(index).ok_or(TreeError::OutOfRange { index, len })?;
                entry.1 = value;
                Ok(())
            }

            /// Fold `f` over the values of the entries in `range`.
            pub fn accumulate<R, Acc, F>(&self, range: R, init: Acc, mut f: F) -> Result<Acc, TreeError>
            where
                R: RangeBounds<usize>,
                F: FnMut(Acc, &V) -> Acc,
            {
                self.0.accumulate(range, init, |acc, entry| f(acc, &entry.1))
            }

            /// Insert every entry of `iter`, returning how many were added.
            pub fn insert_iter<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) -> usize {
                self.0.insert_iter(iter)
            }

            /// Remove and return the entry at `index`.
            pub fn erase(&mut self, index: usize) -> Option<(K, V)> {
                self.0.erase(index)
            }

            /// Remove a positional range.
            pub fn erase_range<R: RangeBounds<usize>>(&mut self, range: R) -> Result<usize, TreeError> {
                self.0.erase_range(range)
            }

            /// Remove every entry with `key`, returning how many.
            pub fn erase_key(&mut self, key: &K) -> usize {
                self.0.erase_key(key)
            }

            /// Remove and return the entry with the smallest key.
            pub fn pop_first(&mut self) -> Option<(K, V)> {
                self.0.pop_front()
            }

            /// Remove and return the entry with the largest key.
            pub fn pop_last(&mut self) -> Option<(K, V)> {
                self.0.pop_back()
            }

            /// Move every entry of `other` in, leaving it empty.
            pub fn merge(&mut self, other: &mut Self) -> usize {
                self.0.merge(&mut other.0)
            }

            /// Split at `at`, returning the entries with larger keys.
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
                Self(self.0.split_off(at))
            }

            /// Move `at..` into the empty `out`.
            pub fn split_into(&mut self, at: usize, out: &mut Self) -> Result<(), TreeError> {
                self.0.split_into(at, &mut out.0)
            }

            /// Move the positional range `range` into the empty `out`.
            pub fn split_range_into<R: RangeBounds<usize>>(&mut self, range: R, out: &mut Self) -> Result<(), TreeError> {
                self.0.split_range_into(range, &mut out.0)
            }

            /// Move all of `other` before position `at`. The caller keeps the
            /// keys sorted.
            pub fn splice(&mut self, at: usize, other: &mut Self) -> Result<usize, TreeError> {
                self.0.splice(at, &mut other.0)
            }

            /// Keep only the first `len` entries.
            pub fn truncate(&mut self, len: usize) {
                self.0.truncate(len);
            }

            /// Keep only the entries matching `keep`.
            pub fn retain<F: FnMut(&K, &V) -> bool>(&mut self, mut keep: F) {
                self.0.retain(|entry| keep(&entry.0, &entry.1));
            }

            /// Remove every entry.
            pub fn clear(&mut self) {
                self.0.clear();
            }

            /// Replace the contents with `entries`, returning how many were kept.
            pub fn assign<I: IntoIterator<Item = (K, V)>>(&mut self, entries: I) -> usize {
                self.0.assign(entries)
            }
        }

        impl<K, V, C, A> Deref for $name<K, V, C, A> {
            type Target = BpTreeArray<(K, V), PairKey, C, A>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<K, V, C, A> Default for $name<K, V, C, A>
        where
            C: Compare<K> + Default,
            A: BlockAllocator<(K, V)> + Default,
        {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<K: Clone, V: Clone, C: Clone, A: BlockAllocator<(K, V)> + Clone> Clone for $name<K, V, C, A> {
            fn clone(&self) -> Self {
                Self(self.0.clone())
            }
        }

        impl<K, V, C, A> StdFmt::Debug for $name<K, V, C, A>
        where
            K: StdFmt::Debug,
            V: StdFmt::Debug,
            A: BlockAllocator<(K, V)>,
        {
            fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
                f.debug_map().entries((&self.0).into_iter().map(|(k, v)| (k, v))).finish()
            }
        }

        impl<K: PartialEq, V: PartialEq, C, A: BlockAllocator<(K, V)>> PartialEq for $name<K, V, C, A> {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }

        impl<K: Eq, V: Eq, C, A: BlockAllocator<(K, V)>> Eq for $name<K, V, C, A> {}

        impl<K, V, C, A> FromIterator<(K, V)> for $name<K, V, C, A>
        where
            C: Compare<K> + Default,
            A: BlockAllocator<(K, V)> + Default,
        {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                let mut map = Self::new();
                map.insert_iter(iter);
                map
            }
        }

        impl<K, V, C, A> Extend<(K, V)> for $name<K, V, C, A>
        where
            C: Compare<K>,
            A: BlockAllocator<(K, V)>,
        {
            fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
                self.insert_iter(iter);
            }
        }

        impl<'a, K, V, C, A: BlockAllocator<(K, V)>> IntoIterator for &'a $name<K, V, C, A> {
            type Item = &'a (K, V);
            type IntoIter = Iter<'a, (K, V)>;

            fn into_iter(self) -> Self::IntoIter {
                (&self.0).into_iter()
            }
        }

        impl<K, V, C, A: BlockAllocator<(K, V)>> IntoIterator for $name<K, V, C, A> {
            type Item = (K, V);
            type IntoIter = IntoIter<(K, V)>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }
    };
}

/// Sorted map with unique keys and positional access.
pub struct Map<K, V, C = Natural, A = HeapBlocks>(BpTreeArray<(K, V), PairKey, C, A>);

map_common!(Map, ArrayConfig::UNIQUE);

impl<K, V, C, A> Map<K, V, C, A>
where
    C: Compare<K>,
    A: BlockAllocator<(K, V)>,
{
    /// Insert `(key, value)` unless `key` is present. Returns the entry's
    /// index and whether it was inserted; an existing value is kept.
    pub fn insert(&mut self, key: K, value: V) -> (usize, bool) {
        self.0.insert((key, value))
    }

    /// Insert `(key, value)`, returning the value it replaced.
    pub fn insert_or_replace(&mut self, key: K, value: V) -> Option<V> {
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.insert((key, value));
                None
            }
        }
    }

    /// Value for `key`, inserting `V::default()` first if absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let index = match self.0.find(&key) {
            Some(index) => index,
            None => self.0.insert((key, V::default())).0,
        };
        match self.0.get_mut(index) {
            Some(entry) => &mut entry.1,
            None => unreachable!("entry vanished after insert"),
        }
    }

    /// Remove the entry with `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.0.find(key)?;
        self.0.erase(index).map(|(_, value)| value)
    }
}

/// Sorted map allowing repeated keys. Entries with equal keys keep their
/// insertion order.
pub struct MultiMap<K, V, C = Natural, A = HeapBlocks>(BpTreeArray<(K, V), PairKey, C, A>);

map_common!(MultiMap, ArrayConfig::MULTI);

impl<K, V, C, A> MultiMap<K, V, C, A>
where
    C: Compare<K>,
    A: BlockAllocator<(K, V)>,
{
    /// Insert `(key, value)` after every entry with an equal key, returning
    /// its index.
    pub fn insert(&mut self, key: K, value: V) -> usize {
        self.0.insert((key, value)).0
    }

    /// Values of every entry with `key`, in insertion order.
    pub fn values_of(&self, key: &K) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.0.iter_range(self.0.equal_range(key)).map(|entry| &entry.1)
    }
}
