//! Merging sorted trees.
//!
//! Only the span of the receiver that overlaps the incoming keys is drained
//! and rebuilt. Everything before and after it stays in place, so merging
//! disjoint trees is a plain splice.
//!
//! The merge runs in two passes. [`plan`] walks both sides by reference and
//! is the only place the caller's ordering is consulted. Elements move only
//! once the plan is complete, so an ordering that panics leaves both trees
//! untouched.

use crate::alloc::BlockAllocator;
use crate::tracing_helpers::debug_log;

use super::build::build_subtree;
use super::{IntoIter, Tree};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Left,
    Right,
    DropRight,
}

/// Decide the interleaving of two sorted streams. Ties take the left element
/// first; with `unique`, a right element equivalent to the next left one is
/// dropped. Trailing elements of either side are implied and not recorded.
pub(crate) fn plan<'a, T, L, R, F>(left: L, right: R, unique: bool, less: &mut F) -> Vec<Step>
where
    T: 'a,
    L: IntoIterator<Item = &'a T>,
    R: IntoIterator<Item = &'a T>,
    F: FnMut(&T, &T) -> bool,
{
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    let mut steps = Vec::new();
    while let (Some(&l), Some(&r)) = (left.peek(), right.peek()) {
        let step = if less(r, l) {
            right.next();
            Step::Right
        } else if unique && !less(l, r) {
            right.next();
            Step::DropRight
        } else {
            left.next();
            Step::Left
        };
        steps.push(step);
    }
    steps
}

/// Replays a [`plan`] over owned streams. Infallible.
struct Replay<L, R> {
    steps: std::vec::IntoIter<Step>,
    left: L,
    right: R,
}

impl<T, L, R> Iterator for Replay<L, R>
where
    L: Iterator<Item = T>,
    R: Iterator<Item = T>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            match self.steps.next() {
                Some(Step::Left) => return self.left.next(),
                Some(Step::Right) => return self.right.next(),
                Some(Step::DropRight) => {
                    self.right.next();
                }
                None => return self.left.next().or_else(|| self.right.next()),
            }
        }
    }
}

impl<T, A: BlockAllocator<T>> Tree<T, A> {
    /// Move every element of `other` into this tree, both sorted under
    /// `less`. With `unique`, elements of `other` equivalent to one already
    /// here are dropped. `other` is left empty.
    ///
    /// If `less` panics, both trees keep their elements.
    ///
    /// Returns how many elements were added.
    pub fn merge_by<F: FnMut(&T, &T) -> bool>(&mut self, other: &mut Self, unique: bool, mut less: F) -> usize {
        let (Some(first), Some(last)) = (other.first(), other.last()) else {
            return 0;
        };
        let before = self.len();
        let (Some(head), Some(tail)) = (self.first(), self.last()) else {
            self.append(other);
            return self.len();
        };

        if less(last, head) {
            let moved = other.take_subtree();
            self.attach(0, moved);
        } else if (unique && less(tail, first)) || (!unique && !less(first, tail)) {
            self.append(other);
        } else {
            let lo = self.partition_point(|v| less(v, first));
            let hi = self.partition_point(|v| !less(last, v));
            let steps = plan(self.iter_range(lo..hi), other.iter(), unique, &mut less);
            let incoming = other.take_subtree().map(|sub| IntoIter::from_root(sub.node));
            self.merge_span(lo, hi, incoming.into_iter().flatten(), steps);
        }
        self.len() - before
    }

    /// Interleave the `incoming` stream into the span `lo..hi` following
    /// `steps`, rebuilding only that span.
    pub(crate) fn merge_span<I>(&mut self, lo: usize, hi: usize, incoming: I, steps: Vec<Step>)
    where
        I: IntoIterator<Item = T>,
    {
        let middle = self.detach_range(lo, hi);
        let existing = middle.map(|sub| IntoIter::from_root(sub.node));
        let merged = Replay {
            steps: steps.into_iter(),
            left: existing.into_iter().flatten(),
            right: incoming.into_iter(),
        };
        let built = build_subtree(merged, &mut self.alloc);
        debug_log!(lo, hi, rebuilt = built.as_ref().map_or(0, |sub| sub.len()), "merged span");
        self.attach(lo, built);
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Fail fast in tests")]
mod tests {
    use super::*;

    fn lt(a: &usize, b: &usize) -> bool {
        a < b
    }

    #[test]
    fn test_merge_interleaved_multi() {
        let mut evens: Tree<usize> = (0..3000).map(|v| v * 2).collect();
        let mut odds: Tree<usize> = (0..3000).map(|v| v * 2 + 1).collect();
        assert_eq!(evens.merge_by(&mut odds, false, lt), 3000);
        assert!(odds.is_empty());
        assert!(evens.iter().copied().eq(0..6000));
        evens.check_invariants().unwrap();
    }

    #[test]
    fn test_merge_unique_drops_duplicates() {
        let mut a: Tree<usize> = (0..1000).collect();
        let mut b: Tree<usize> = (500..1500).collect();
        assert_eq!(a.merge_by(&mut b, true, lt), 500);
        assert!(b.is_empty());
        assert!(a.iter().copied().eq(0..1500));
        a.check_invariants().unwrap();
    }

    #[test]
    fn test_merge_multi_keeps_existing_first() {
        let mut a: Tree<(u8, char)> = [(1, 'a'), (2, 'a'), (3, 'a')].into_iter().collect();
        let mut b: Tree<(u8, char)> = [(2, 'b'), (3, 'b')].into_iter().collect();
        a.merge_by(&mut b, false, |x, y| x.0 < y.0);
        let got: Vec<_> = a.iter().copied().collect();
        assert_eq!(got, vec![(1, 'a'), (2, 'a'), (2, 'b'), (3, 'a'), (3, 'b')]);
    }

    #[test]
    fn test_merge_fast_paths() {
        let mut a: Tree<usize> = (1000..2000).collect();
        let mut before: Tree<usize> = (0..1000).collect();
        assert_eq!(a.merge_by(&mut before, true, lt), 1000);
        let mut after: Tree<usize> = (2000..2500).collect();
        assert_eq!(a.merge_by(&mut after, false, lt), 500);
        assert!(a.iter().copied().eq(0..2500));
        let mut empty: Tree<usize> = Tree::new();
        assert_eq!(a.merge_by(&mut empty, false, lt), 0);
        assert_eq!(empty.merge_by(&mut a, false, lt), 2500);
        assert!(a.is_empty());
        empty.check_invariants().unwrap();
    }

    #[test]
    fn test_plan_records_interleaving_only() {
        let left = [1_usize, 3, 5, 7];
        let right = [2_usize, 3, 9];
        let steps = plan(&left, &right, true, &mut lt);
        assert_eq!(steps, vec![Step::Left, Step::Right, Step::DropRight, Step::Left, Step::Left, Step::Left]);
        let steps = plan(&left, &right, false, &mut lt);
        assert_eq!(steps, vec![Step::Left, Step::Right, Step::Left, Step::Right, Step::Left, Step::Left]);
        assert!(plan(&left, &[], false, &mut lt).is_empty());
    }

    #[test]
    fn test_merge_touching_ends() {
        let mut a: Tree<usize> = (0..=100).collect();
        let mut b: Tree<usize> = (100..200).collect();
        assert_eq!(a.merge_by(&mut b, true, lt), 99);
        assert!(a.iter().copied().eq(0..200));
        let mut c: Tree<usize> = (199..300).collect();
        assert_eq!(a.merge_by(&mut c, false, lt), 101);
        assert_eq!(a.len(), 301);
        assert_eq!(a.get(199), Some(&199));
        assert_eq!(a.get(200), Some(&199));
    }
}
