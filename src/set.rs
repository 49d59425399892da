//! Ordered sets: [`Set`] keeps one element per key, [`MultiSet`] keeps all.
//!
//! Both are thin wrappers over [`BpTreeArray`] with [`Identity`] keys. Every
//! read-only operation (search, positional access, iteration, `accumulate`,
//! invariant checks) is reached through `Deref`; mutation goes through the
//! wrapper so the configuration cannot be bypassed.
//!
//! ```rust
//! use bptarray::set::Set;
//!
//! let mut set: Set<u32> = (0..1000).rev().collect();
//! assert_eq!(set.lower_bound(&500), 500);
//! assert_eq!(set.insert(7), (7, false));
//!
//! let tail = set.split_off(600);
//! assert_eq!(tail.first(), Some(&600));
//! ```

use std::fmt as StdFmt;
use std::ops::{Deref, RangeBounds};

use crate::alloc::{BlockAllocator, HeapBlocks};
use crate::array::BpTreeArray;
use crate::config::ArrayConfig;
use crate::ordering::{Compare, Identity, Natural};
use crate::tree::{IntoIter, Iter, TreeError};

macro_rules! set_common {
    ($name:ident, $config:expr) => {
        impl<T, C, A> $name<T, C, A>
        where
            C: Compare<T>,
            A: BlockAllocator<T>,
        {
            /// Create an empty set.
            #[must_use]
            pub fn new() -> Self
            where
                C: Default,
                A: Default,
            {
                Self(BpTreeArray::new($config))
            }

            /// Create an empty set ordered by `compare`.
            #[must_use]
            pub fn with_compare(compare: C) -> Self
            where
                A: Default,
            {
                Self(BpTreeArray::with_compare($config, compare))
            }

            /// Create an empty set ordered by `compare`, drawing blocks from `alloc`.
            #[must_use]
            pub const fn with_parts(compare: C, alloc: A) -> Self {
                Self(BpTreeArray::with_parts($config, compare, alloc))
            }

            /// The wrapped array.
            #[must_use]
            pub fn into_array(self) -> BpTreeArray<T, Identity, C, A> {
                self.0
            }

            /// Insert `value` before position `hint` if that keeps the order.
            pub fn insert_hint(&mut self, hint: usize, value: T) -> (usize, bool) {
                self.0.insert_hint(hint, value)
            }

            /// Insert every element of `iter`, returning how many were added.
            pub fn insert_iter<I: IntoIterator<Item = T>>(&mut self, iter: I) -> usize {
                self.0.insert_iter(iter)
            }

            /// Remove and return the element at `index`.
            pub fn erase(&mut self, index: usize) -> Option<T> {
                self.0.erase(index)
            }

            /// Remove a positional range.
            pub fn erase_range<R: RangeBounds<usize>>(&mut self, range: R) -> Result<usize, TreeError> {
                self.0.erase_range(range)
            }

            /// Remove every element equivalent to `value`, returning how many.
            pub fn erase_key(&mut self, value: &T) -> usize {
                self.0.erase_key(value)
            }

            /// Remove and return the smallest element.
            pub fn pop_first(&mut self) -> Option<T> {
                self.0.pop_front()
            }

            /// Remove and return the largest element.
            pub fn pop_last(&mut self) -> Option<T> {
                self.0.pop_back()
            }

            /// Replace the element at `index`, moving it if its order changes.
            pub fn write(&mut self, index: usize, value: T) -> Result<(usize, bool), TreeError> {
                self.0.write(index, value)
            }

            /// Move every element of `other` in, leaving it empty.
            pub fn merge(&mut self, other: &mut Self) -> usize {
                self.0.merge(&mut other.0)
            }

            /// Split at `at`, returning the larger elements.
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
            /// result sorted; [`merge`](Self::merge) does not need that.
            pub fn splice(&mut self, at: usize, other: &mut Self) -> Result<usize, TreeError> {
                self.0.splice(at, &mut other.0)
            }

            /// Keep only the first `len` elements.
            pub fn truncate(&mut self, len: usize) {
                self.0.truncate(len);
            }

            /// Keep only the elements matching `keep`.
            pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
                self.0.retain(keep);
            }

            /// Remove every element.
            pub fn clear(&mut self) {
                self.0.clear();
            }

            /// Replace the contents with the elements of `iter`, returning
            /// how many were kept.
            pub fn assign<I: IntoIterator<Item = T>>(&mut self, iter: I) -> usize {
                self.0.assign(iter)
            }
        }

        impl<T, C, A> Deref for $name<T, C, A> {
            type Target = BpTreeArray<T, Identity, C, A>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<T, C, A> Default for $name<T, C, A>
        where
            C: Compare<T> + Default,
            A: BlockAllocator<T> + Default,
        {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T: Clone, C: Clone, A: BlockAllocator<T> + Clone> Clone for $name<T, C, A> {
            fn clone(&self) -> Self {
                Self(self.0.clone())
            }
        }

        impl<T: StdFmt::Debug, C, A: BlockAllocator<T>> StdFmt::Debug for $name<T, C, A> {
            fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
                f.debug_set().entries(&self.0).finish()
            }
        }

        impl<T: PartialEq, C, A: BlockAllocator<T>> PartialEq for $name<T, C, A> {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }

        impl<T: Eq, C, A: BlockAllocator<T>> Eq for $name<T, C, A> {}

        impl<T, C, A> FromIterator<T> for $name<T, C, A>
        where
            C: Compare<T> + Default,
            A: BlockAllocator<T> + Default,
        {
            fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
                let mut set = Self::new();
                set.insert_iter(iter);
                set
            }
        }

        impl<T, C, A> Extend<T> for $name<T, C, A>
        where
            C: Compare<T>,
            A: BlockAllocator<T>,
        {
            fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
                self.insert_iter(iter);
            }
        }

        impl<'a, T, C, A: BlockAllocator<T>> IntoIterator for &'a $name<T, C, A> {
            type Item = &'a T;
            type IntoIter = Iter<'a, T>;

            fn into_iter(self) -> Self::IntoIter {
                (&self.0).into_iter()
            }
        }

        impl<T, C, A: BlockAllocator<T>> IntoIterator for $name<T, C, A> {
            type Item = T;
            type IntoIter = IntoIter<T>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }
    };
}

/// Sorted set of unique elements with positional access.
pub struct Set<T, C = Natural, A = HeapBlocks>(BpTreeArray<T, Identity, C, A>);

set_common!(Set, ArrayConfig::UNIQUE);

impl<T, C, A> Set<T, C, A>
where
    C: Compare<T>,
    A: BlockAllocator<T>,
{
    /// Insert `value` unless an equivalent element is present. Returns the
    /// element's index and whether it was inserted.
    pub fn insert(&mut self, value: T) -> (usize, bool) {
        self.0.insert(value)
    }

    /// Remove the element equivalent to `value`.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let index = self.0.find(value)?;
        self.0.erase(index)
    }
}

/// Sorted multiset with positional access. Equivalent elements keep their
/// insertion order.
pub struct MultiSet<T, C = Natural, A = HeapBlocks>(BpTreeArray<T, Identity, C, A>);

set_common!(MultiSet, ArrayConfig::MULTI);

impl<T, C, A> MultiSet<T, C, A>
where
    C: Compare<T>,
    A: BlockAllocator<T>,
{
    /// Insert `value` after every equivalent element, returning its index.
    pub fn insert(&mut self, value: T) -> usize {
        self.0.insert(value).0
    }

    /// Remove one element equivalent to `value`, the first inserted.
    pub fn remove_one(&mut self, value: &T) -> Option<T> {
        let index = self.0.find(value)?;
        self.0.erase(index)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Fail fast in tests")]
mod tests {
    use super::*;
    use crate::ordering::Reverse;

    #[test]
    fn test_set_basics() {
        let mut set: Set<u32> = [5, 1, 4, 1, 3].into_iter().collect();
        assert_eq!(set.len(), 4);
        assert_eq!(set.insert(2), (1, true));
        assert_eq!(set.insert(2), (1, false));
        assert!(set.contains(&4));
        assert_eq!(set.remove(&4), Some(4));
        assert_eq!(set.remove(&4), None);
        assert_eq!(format!("{set:?}"), "{1, 2, 3, 5}");
        assert_eq!(set.pop_first(), Some(1));
        assert_eq!(set.pop_last(), Some(5));
        set.check_invariants().unwrap();
    }

    #[test]
    fn test_set_assign() {
        let mut set: Set<u32> = (0..1000).collect();
        assert_eq!(set.assign([8, 2, 8, 5]), 3);
        assert!(set.iter().copied().eq([2, 5, 8]));
        let mut bag: MultiSet<u32> = MultiSet::new();
        assert_eq!(bag.assign([8, 2, 8, 5]), 4);
        assert_eq!(bag.count(&8), 2);
        bag.check_invariants().unwrap();
    }

    #[test]
    fn test_set_reverse_order() {
        let mut set: Set<u32, Reverse<Natural>> = Set::new();
        set.insert_iter(0..300);
        assert_eq!(set.first(), Some(&299));
        assert_eq!(set.find(&0), Some(299));
        set.check_invariants().unwrap();
    }

    #[test]
    fn test_multiset_counts() {
        let mut bag: MultiSet<u32> = MultiSet::new();
        for round in 0..10 {
            for key in 0..20 {
                assert_eq!(bag.insert(key * 10), (key as usize + 1) * (round + 1) - 1);
            }
        }
        assert_eq!(bag.len(), 200);
        assert_eq!(bag.count(&70), 10);
        assert_eq!(bag.remove_one(&70), Some(70));
        assert_eq!(bag.count(&70), 9);
        assert_eq!(bag.erase_key(&70), 9);
        assert_eq!(bag.count(&70), 0);
        bag.check_invariants().unwrap();
    }

    #[test]
    fn test_set_merge_and_split() {
        let mut a: Set<u32> = (0..2000).filter(|v| v % 3 == 0).collect();
        let mut b: Set<u32> = (0..2000).filter(|v| v % 2 == 0).collect();
        a.merge(&mut b);
        assert!(b.is_empty());
        let expected: Vec<u32> = (0..2000).filter(|v| v % 3 == 0 || v % 2 == 0).collect();
        assert!(a.iter().eq(expected.iter()));
        a.check_invariants().unwrap();

        let mut tail = Set::new();
        a.split_into(100, &mut tail).unwrap();
        assert_eq!(a.len(), 100);
        assert_eq!(tail.first(), Some(&expected[100]));
        a.splice(100, &mut tail).unwrap();
        assert!(a.iter().eq(expected.iter()));
    }

    #[test]
    fn test_set_write_moves_element() {
        let mut set: Set<u32> = (0..100).map(|v| v * 2).collect();
        assert_eq!(set.write(0, 7).unwrap(), (3, true));
        assert_eq!(set.write(0, 4).unwrap(), (1, false));
        set.check_invariants().unwrap();
    }
}
