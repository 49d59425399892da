//! Split and splice.
//!
//! Two primitives carry every relocation:
//!
//! - [`cut`] separates a subtree at a logical position. Descending toward
//!   the position, each internode's children are divided into the run left
//!   of the path and the run right of it; the leaf on the path is split in
//!   two. Both sets of runs are joined back starting from the deepest, which
//!   keeps the whole cut at `O(height)`.
//!
//! - [`join`] concatenates two subtrees. Equal heights pair the two roots
//!   under a temporary parent and balance them. Otherwise the shorter tree
//!   is attached along the facing spine of the taller one at its own height,
//!   balanced against its new neighbour, and any overflow is split upward
//!   along the spine.
//!
//! ```text
//!   cut at |:        [ a b | c d ]            join:   tall       short
//!                    /  |   |   \                     /  \   +    |
//!                  ..  [x|y]  ..                    ..    ..     ..
//! ```
//!
//! Both touch `O(height)` nodes, so moving any range costs `O(log n)`
//! regardless of its size.

use std::cmp::Ordering;
use std::ops::RangeBounds;

use crate::alloc::BlockAllocator;
use crate::config::MAX_INT;
use crate::internode::Internode;
use crate::node::{self, Node, Path, Subtree};
use crate::tracing_helpers::{debug_log, trace_log};

use super::{Tree, TreeError, check_range, resolve_range};

// ============================================================================
//  Primitives
// ============================================================================

/// Which spine of the taller tree receives the shorter one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Spine {
    Left,
    Right,
}

/// Concatenate `left` and `right`, in that order.
pub(crate) fn join<T, A: BlockAllocator<T>>(left: Subtree<T>, right: Subtree<T>, alloc: &mut A) -> Subtree<T> {
    trace_log!(left_height = left.height, right_height = right.height, "join");
    match left.height.cmp(&right.height) {
        Ordering::Equal => {
            let height = left.height;
            let mut children = Vec::with_capacity(MAX_INT + 1);
            children.push(left.node);
            children.push(right.node);
            let mut top = Internode::from_children(children);
            top.fix_pair(0, alloc);
            if top.width() == 1 {
                match top.children.pop() {
                    Some(only) => Subtree::new(only, height),
                    None => unreachable!("merged pair left no child"),
                }
            } else {
                Subtree::new(Node::Internode(top), height + 1)
            }
        }
        Ordering::Greater => graft(left, right, Spine::Right, alloc),
        Ordering::Less => graft(right, left, Spine::Left, alloc),
    }
}

/// Attach `short` along one spine of the strictly taller `tall`.
fn graft<T, A: BlockAllocator<T>>(mut tall: Subtree<T>, short: Subtree<T>, spine: Spine, alloc: &mut A) -> Subtree<T> {
    debug_assert!(tall.height > short.height);
    let added = short.len();
    let Subtree {
        node: short,
        height: short_height,
    } = short;
    let mut path = Path::new();
    let mut cur = &mut tall.node;
    let mut level = tall.height;
    loop {
        let Node::Internode(inner) = cur else {
            unreachable!("spine ended above the graft level");
        };
        inner.len += added;
        if level == short_height + 1 {
            match spine {
                Spine::Right => {
                    inner.children.push(short);
                    let left = inner.width() - 2;
                    inner.fix_pair(left, alloc);
                }
                Spine::Left => {
                    inner.children.insert(0, short);
                    inner.fix_pair(0, alloc);
                }
            }
            break;
        }
        let slot = match spine {
            Spine::Right => inner.width() - 1,
            Spine::Left => 0,
        };
        path.push(slot);
        level -= 1;
        cur = &mut inner.children[slot];
    }

    if node::split_upward(&mut tall.node, &path, alloc) {
        node::grow(&mut tall.node, alloc);
        tall.height += 1;
    }
    tall
}

/// Join two optional subtrees.
pub(crate) fn join_opt<T, A: BlockAllocator<T>>(
    left: Option<Subtree<T>>,
    right: Option<Subtree<T>>,
    alloc: &mut A,
) -> Option<Subtree<T>> {
    match (left, right) {
        (Some(left), Some(right)) => Some(join(left, right, alloc)),
        (left, None) => left,
        (None, right) => right,
    }
}

/// Separate `sub` into the first `at` elements and the rest.
pub(crate) fn cut<T, A: BlockAllocator<T>>(
    sub: Subtree<T>,
    at: usize,
    alloc: &mut A,
) -> (Option<Subtree<T>>, Option<Subtree<T>>) {
    if at == 0 {
        return (None, Some(sub));
    }
    if at >= sub.len() {
        return (Some(sub), None);
    }

    // `lefts` is in sequence order; `rights` is in reverse sequence order.
    let mut lefts: Vec<Subtree<T>> = Vec::with_capacity(sub.height);
    let mut rights: Vec<Subtree<T>> = Vec::with_capacity(sub.height);
    let mut cur = sub.node;
    let mut height = sub.height;
    let mut at = at;
    loop {
        match cur {
            Node::Leaf(mut leaf) => {
                let right = leaf.split_off(at, alloc);
                lefts.push(Subtree::new(Node::Leaf(leaf), 1));
                rights.push(Subtree::new(Node::Leaf(right), 1));
                break;
            }
            Node::Internode(mut inner) => {
                let (slot, offset) = inner.locate(at);
                let mut tail = inner.children.split_off(slot);
                let head = std::mem::take(&mut inner.children);
                lefts.extend(Subtree::from_siblings(head, height - 1));
                if offset == 0 {
                    rights.extend(Subtree::from_siblings(tail, height - 1));
                    break;
                }
                let middle = tail.remove(0);
                rights.extend(Subtree::from_siblings(tail, height - 1));
                cur = middle;
                height -= 1;
                at = offset;
            }
        }
    }

    // Both sides join shortest first, so each join only climbs the height
    // difference to the next piece.
    let mut prefix = None;
    while let Some(piece) = lefts.pop() {
        prefix = join_opt(Some(piece), prefix, alloc);
    }
    let mut suffix = None;
    while let Some(piece) = rights.pop() {
        suffix = join_opt(suffix, Some(piece), alloc);
    }
    (prefix, suffix)
}

/// [`cut`] over an optional subtree.
fn cut_opt<T, A: BlockAllocator<T>>(
    sub: Option<Subtree<T>>,
    at: usize,
    alloc: &mut A,
) -> (Option<Subtree<T>>, Option<Subtree<T>>) {
    match sub {
        Some(sub) => cut(sub, at, alloc),
        None => (None, None),
    }
}

// ============================================================================
//  Tree operations
// ============================================================================

impl<T, A: BlockAllocator<T>> Tree<T, A> {
    /// Move `at..` into `out`, which must be empty.
    ///
    /// `at == 0` hands the whole tree over in `O(1)`.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(at = at, len = self.len())))]
    pub fn split_into(&mut self, at: usize, out: &mut Self) -> Result<(), TreeError> {
        if !out.is_empty() {
            return Err(TreeError::NonEmptyTarget { len: out.len() });
        }
        let len = self.len();
        if at > len {
            return Err(TreeError::OutOfRange { index: at, len });
        }
        self.split_unchecked(at, out);
        Ok(())
    }

    /// Split at `at`, returning everything from `at` on as a new tree.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`.
    #[must_use = "use `truncate` to drop the tail"]
    pub fn split_off(&mut self, at: usize) -> Self
    where
        A: Default,
    {
        let len = self.len();
        assert!(at <= len, "split index {at} out of range for length {len}");
        let mut out = Self::new();
        self.split_unchecked(at, &mut out);
        out
    }

    /// Move the positional range `range` into `out`, which must be empty.
    pub fn split_range_into<R: RangeBounds<usize>>(&mut self, range: R, out: &mut Self) -> Result<(), TreeError> {
        if !out.is_empty() {
            return Err(TreeError::NonEmptyTarget { len: out.len() });
        }
        let len = self.len();
        let (start, end) = resolve_range(&range, len);
        check_range(start, end, len)?;
        let middle = self.detach_range(start, end);
        out.install(middle);
        Ok(())
    }

    /// Move every element of `other` into `self` before position `at`.
    ///
    /// Returns the position just past the inserted run.
    pub fn splice(&mut self, at: usize, other: &mut Self) -> Result<usize, TreeError> {
        self.splice_range(at, other, ..)
    }

    /// Move the element at `index` of `other` into `self` before `at`.
    pub fn splice_one(&mut self, at: usize, other: &mut Self, index: usize) -> Result<usize, TreeError> {
        if index >= other.len() {
            return Err(TreeError::OutOfRange {
                index,
                len: other.len(),
            });
        }
        self.splice_range(at, other, index..=index)
    }

    /// Move `range` of `other` into `self` before position `at`.
    ///
    /// Returns the position just past the inserted run. An empty range is a
    /// no-op.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(at = at, len = self.len(), other_len = other.len())))]
    pub fn splice_range<R: RangeBounds<usize>>(
        &mut self,
        at: usize,
        other: &mut Self,
        range: R,
    ) -> Result<usize, TreeError> {
        let len = self.len();
        if at > len {
            return Err(TreeError::OutOfRange { index: at, len });
        }
        let other_len = other.len();
        let (start, end) = resolve_range(&range, other_len);
        check_range(start, end, other_len)?;
        if start == end {
            return Ok(at);
        }

        let middle = other.detach_range(start, end);
        self.attach(at, middle);
        debug_log!(moved = end - start, len = self.len(), "spliced range");
        Ok(at + (end - start))
    }

    /// Append every element of `other`, leaving it empty.
    pub fn append(&mut self, other: &mut Self) {
        let moved = other.take_subtree();
        self.attach(self.len(), moved);
    }

    /// Move `range` of this tree so that it starts before position `at`.
    ///
    /// A destination inside the range (or an empty range) is a no-op.
    /// Returns the position just past the moved run.
    pub fn move_range<R: RangeBounds<usize>>(&mut self, at: usize, range: R) -> Result<usize, TreeError> {
        let len = self.len();
        if at > len {
            return Err(TreeError::OutOfRange { index: at, len });
        }
        let (start, end) = resolve_range(&range, len);
        check_range(start, end, len)?;
        if start == end || (start <= at && at <= end) {
            return Ok(at);
        }

        let whole = self.take_subtree();
        let alloc = &mut self.alloc;

        let rejoined = if at < start {
            // [0,at) [at,start) [start,end) [end,len)  ->  0 2 1 3
            let (rest, d) = cut_opt(whole, end, alloc);
            let (rest, c) = cut_opt(rest, start, alloc);
            let (a, b) = cut_opt(rest, at, alloc);
            let front = join_opt(a, c, alloc);
            let front = join_opt(front, b, alloc);
            join_opt(front, d, alloc)
        } else {
            // [0,start) [start,end) [end,at) [at,len)  ->  0 2 1 3
            let (rest, d) = cut_opt(whole, at, alloc);
            let (rest, c) = cut_opt(rest, end, alloc);
            let (a, b) = cut_opt(rest, start, alloc);
            let front = join_opt(a, c, alloc);
            let front = join_opt(front, b, alloc);
            join_opt(front, d, alloc)
        };
        self.install(rejoined);

        Ok(if at < start { at + (end - start) } else { at })
    }

    /// Cut `start..end` out as a subtree, closing the gap.
    pub(crate) fn detach_range(&mut self, start: usize, end: usize) -> Option<Subtree<T>> {
        debug_assert!(start <= end && end <= self.len());
        if start == end {
            return None;
        }
        let whole = self.take_subtree();
        let (head, tail) = cut_opt(whole, end, &mut self.alloc);
        let (prefix, middle) = cut_opt(head, start, &mut self.alloc);
        let rest = join_opt(prefix, tail, &mut self.alloc);
        self.install(rest);
        middle
    }

    /// Insert a detached subtree before position `at`.
    pub(crate) fn attach(&mut self, at: usize, sub: Option<Subtree<T>>) {
        debug_assert!(at <= self.len());
        if sub.is_none() {
            return;
        }
        let whole = self.take_subtree();
        let (prefix, suffix) = cut_opt(whole, at, &mut self.alloc);
        let front = join_opt(prefix, sub, &mut self.alloc);
        let joined = join_opt(front, suffix, &mut self.alloc);
        self.install(joined);
    }

    fn split_unchecked(&mut self, at: usize, out: &mut Self) {
        debug_assert!(out.is_empty() && at <= self.len());
        if at == 0 {
            std::mem::swap(&mut self.root, &mut out.root);
            std::mem::swap(&mut self.height, &mut out.height);
            return;
        }
        if at == self.len() {
            return;
        }
        let whole = self.take_subtree();
        let (prefix, suffix) = cut_opt(whole, at, &mut self.alloc);
        self.install(prefix);
        out.install(suffix);
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Fail fast in tests")]
mod tests {
    use super::*;

    fn seq(range: std::ops::Range<usize>) -> Tree<usize> {
        range.collect()
    }

    #[test]
    fn test_split_every_position_small() {
        for n in [0, 1, 63, 64, 128, 129, 300] {
            for at in 0..=n {
                let mut tree = seq(0..n);
                let tail = tree.split_off(at);
                tree.check_invariants().unwrap();
                tail.check_invariants().unwrap();
                assert!(tree.iter().copied().eq(0..at));
                assert!(tail.iter().copied().eq(at..n));
            }
        }
    }

    #[test]
    fn test_split_large_tree() {
        for at in [1, 64, 127, 5000, 99_999, 12_345, 65_536] {
            let mut tree = seq(0..100_000);
            let tail = tree.split_off(at);
            tree.check_invariants().unwrap();
            tail.check_invariants().unwrap();
            assert_eq!(tree.len(), at);
            assert_eq!(tail.get(0), Some(&at));
            assert_eq!(tree.last(), Some(&(at - 1)));
        }
    }

    #[test]
    fn test_cut_pieces_stay_shallow() {
        let whole = crate::tree::build::build_subtree(0..200_000_usize, &mut crate::alloc::HeapBlocks).unwrap();
        let height = whole.height;
        assert!(height >= 3);
        let mut sub = Some(whole);
        for at in [100, 130, 8_000, 100_000, 199_990] {
            let (prefix, suffix) = cut(sub.take().unwrap(), at, &mut crate::alloc::HeapBlocks);
            let (prefix, suffix) = (prefix.unwrap(), suffix.unwrap());
            assert_eq!(prefix.len(), at);
            assert_eq!(suffix.len(), 200_000 - at);
            assert!(prefix.height <= height && suffix.height <= height, "cut at {at}");
            if at < crate::config::MAX_EXT {
                assert_eq!(prefix.height, 1);
            }
            sub = Some(join(prefix, suffix, &mut crate::alloc::HeapBlocks));
        }
        let mut tree: Tree<usize> = Tree::new();
        tree.install(sub);
        tree.check_invariants().unwrap();
        assert!(tree.iter().copied().eq(0..200_000));
    }

    #[test]
    fn test_split_into_requires_empty_target() {
        let mut tree = seq(0..10);
        let mut out = seq(0..1);
        assert_eq!(tree.split_into(5, &mut out), Err(TreeError::NonEmptyTarget { len: 1 }));
        let mut out = Tree::new();
        assert_eq!(tree.split_into(11, &mut out), Err(TreeError::OutOfRange { index: 11, len: 10 }));
        tree.split_into(0, &mut out).unwrap();
        assert!(tree.is_empty());
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn test_join_mismatched_heights() {
        for (a, b) in [(5, 100_000), (100_000, 5), (130, 20_000), (20_000, 130), (64, 64), (1, 1)] {
            let mut left = seq(0..a);
            let mut right = seq(a..a + b);
            left.append(&mut right);
            left.check_invariants().unwrap();
            assert!(right.is_empty());
            assert!(left.iter().copied().eq(0..a + b));
        }
    }

    #[test]
    fn test_splice_range_between_trees() {
        let mut dst = seq(0..1000);
        let mut src = seq(10_000..15_000);
        let next = dst.splice_range(500, &mut src, 1000..3000).unwrap();
        assert_eq!(next, 2500);
        assert_eq!(dst.len(), 3000);
        assert_eq!(src.len(), 3000);
        assert_eq!(dst.get(499), Some(&499));
        assert_eq!(dst.get(500), Some(&11_000));
        assert_eq!(dst.get(2500), Some(&500));
        assert_eq!(src.get(1000), Some(&13_000));
        dst.check_invariants().unwrap();
        src.check_invariants().unwrap();
    }

    #[test]
    fn test_splice_one_and_empty_range() {
        let mut dst = seq(0..10);
        let mut src = seq(100..110);
        assert_eq!(dst.splice_range(3, &mut src, 4..4).unwrap(), 3);
        assert_eq!(dst.splice_one(0, &mut src, 9).unwrap(), 1);
        assert_eq!(dst.get(0), Some(&109));
        assert_eq!(src.len(), 9);
        assert!(dst.splice_one(0, &mut src, 9).is_err());
    }

    #[test]
    fn test_move_range_forward_and_back() {
        let mut oracle: Vec<usize> = (0..2000).collect();
        let mut tree = seq(0..2000);

        assert_eq!(tree.move_range(100, 1500..1800).unwrap(), 400);
        let moved: Vec<usize> = oracle.drain(1500..1800).collect();
        oracle.splice(100..100, moved);
        assert!(tree.iter().eq(oracle.iter()));
        tree.check_invariants().unwrap();

        assert_eq!(tree.move_range(1900, 10..700).unwrap(), 1900);
        let moved: Vec<usize> = oracle.drain(10..700).collect();
        let at = 1900 - moved.len();
        oracle.splice(at..at, moved);
        assert!(tree.iter().eq(oracle.iter()));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_move_range_noops() {
        let mut tree = seq(0..500);
        assert_eq!(tree.move_range(150, 100..200).unwrap(), 150);
        assert_eq!(tree.move_range(200, 100..200).unwrap(), 200);
        assert_eq!(tree.move_range(0, 7..7).unwrap(), 0);
        assert!(tree.iter().copied().eq(0..500));
    }

    #[test]
    fn test_split_range_into() {
        let mut tree = seq(0..5000);
        let mut out = Tree::new();
        tree.split_range_into(1000..4000, &mut out).unwrap();
        assert!(out.iter().copied().eq(1000..4000));
        assert!(tree.iter().copied().eq((0..1000).chain(4000..5000)));
        tree.check_invariants().unwrap();
        out.check_invariants().unwrap();
    }
}
