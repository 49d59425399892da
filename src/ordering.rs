//! Comparison and key-extraction policies.
//!
//! A [`Compare`] is a strict weak "less than" predicate over keys. A
//! [`KeyOf`] policy tells the tree which part of a stored element is the key:
//! the whole value for sets ([`Identity`]) or the first half of a pair for
//! maps ([`PairKey`]).

use std::cmp::Ordering;
use std::fmt as StdFmt;

/// Strict weak ordering over keys of type `K`.
pub trait Compare<K: ?Sized> {
    /// Whether `a` sorts strictly before `b`.
    fn less(&self, a: &K, b: &K) -> bool;

    /// Whether neither key sorts before the other.
    #[inline]
    fn equivalent(&self, a: &K, b: &K) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }

    /// Three-way form of [`Compare::less`].
    #[inline]
    fn ordering(&self, a: &K, b: &K) -> Ordering {
        if self.less(a, b) {
            Ordering::Less
        } else if self.less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// Order keys by their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Natural;

impl<K: Ord + ?Sized> Compare<K> for Natural {
    #[inline(always)]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

/// Order keys with a caller-supplied "less than" closure.
#[derive(Clone, Copy)]
pub struct CompareFn<F>(pub F);

impl<K: ?Sized, F: Fn(&K, &K) -> bool> Compare<K> for CompareFn<F> {
    #[inline(always)]
    fn less(&self, a: &K, b: &K) -> bool {
        (self.0)(a, b)
    }
}

impl<F> StdFmt::Debug for CompareFn<F> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("CompareFn").finish_non_exhaustive()
    }
}

/// Reverse another comparator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Reverse<C>(pub C);

impl<K: ?Sized, C: Compare<K>> Compare<K> for Reverse<C> {
    #[inline(always)]
    fn less(&self, a: &K, b: &K) -> bool {
        self.0.less(b, a)
    }
}

/// Extract the ordering key from a stored element.
pub trait KeyOf<T> {
    /// The key type.
    type Key: ?Sized;

    /// Borrow the key of `value`.
    fn key_of(value: &T) -> &Self::Key;
}

/// The whole element is the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Identity;

impl<T> KeyOf<T> for Identity {
    type Key = T;

    #[inline(always)]
    fn key_of(value: &T) -> &T {
        value
    }
}

/// The first field of a `(key, value)` pair is the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PairKey;

impl<K, V> KeyOf<(K, V)> for PairKey {
    type Key = K;

    #[inline(always)]
    fn key_of(value: &(K, V)) -> &K {
        &value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural() {
        assert!(Natural.less(&1, &2));
        assert!(!Natural.less(&2, &2));
        assert!(Natural.equivalent("a", "a"));
        assert_eq!(Natural.ordering(&3, &1), Ordering::Greater);
    }

    #[test]
    fn test_compare_fn_case_insensitive() {
        let cmp = CompareFn(|a: &str, b: &str| a.to_lowercase() < b.to_lowercase());
        assert!(cmp.equivalent("Abc", "aBC"));
        assert!(cmp.less("abc", "ABD"));
    }

    #[test]
    fn test_reverse() {
        let cmp = Reverse(Natural);
        assert!(cmp.less(&5, &1));
        assert_eq!(cmp.ordering(&1, &5), Ordering::Greater);
    }

    #[test]
    fn test_key_of() {
        assert_eq!(*Identity::key_of(&7), 7);
        assert_eq!(*PairKey::key_of(&("k", 1)), "k");
    }
}
