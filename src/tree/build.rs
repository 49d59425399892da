//! Bulk construction.
//!
//! Leaves are filled to `MAX_EXT - 1` cells, leaving one free slot so the
//! next insert does not split immediately. A short trailing leaf is merged
//! into or balanced against its predecessor. Each upper level groups the
//! level below into evenly sized internodes. The result is spliced into the
//! receiving tree as one subtree, so bulk insertion costs `O(m + log n)`.
//!
//! Whole-sequence rewrites (sort, dedup, retain, reverse) drain the tree
//! into a vector, edit it in place, and rebuild.

use crate::alloc::BlockAllocator;
use crate::config::{MAX_EXT, MAX_INT};
use crate::internode::Internode;
use crate::leaf::LeafBlock;
use crate::node::{Node, Subtree};
use crate::tracing_helpers::debug_log;

use super::{IntoIter, Tree};

/// Cells per leaf when bulk filling.
const FILL: usize = MAX_EXT - 1;

/// Build a subtree holding `iter` in order, or `None` if it is empty.
pub(crate) fn build_subtree<T, A, I>(iter: I, alloc: &mut A) -> Option<Subtree<T>>
where
    A: BlockAllocator<T>,
    I: IntoIterator<Item = T>,
{
    let mut iter = iter.into_iter();
    let mut level: Vec<Node<T>> = Vec::new();
    loop {
        let mut block = alloc.allocate();
        block.extend(iter.by_ref().take(FILL));
        if block.is_empty() {
            alloc.release(block);
            break;
        }
        let short = block.len() < FILL;
        level.push(Node::Leaf(LeafBlock::from_block(block)));
        if short {
            break;
        }
    }
    settle_tail(&mut level, alloc);

    let mut height = 1;
    while level.len() > MAX_INT {
        level = group(level);
        height += 1;
    }
    debug_log!(height, nodes = level.len(), "built subtree");
    Subtree::from_siblings(level, height)
}

/// Make the last leaf of a freshly filled level meet the minimum.
fn settle_tail<T, A: BlockAllocator<T>>(level: &mut Vec<Node<T>>, alloc: &mut A) {
    let n = level.len();
    if n < 2 || !level[n - 1].is_underfull() {
        return;
    }
    if level[n - 2].degree() + level[n - 1].degree() <= MAX_EXT {
        if let (Some(Node::Leaf(last)), Some(Node::Leaf(prev))) = (level.pop(), level.last_mut()) {
            prev.absorb(last, alloc);
        }
    } else if let [.., Node::Leaf(prev), Node::Leaf(last)] = level.as_mut_slice() {
        let count = (prev.len() - last.len()) / 2;
        prev.give_back_to(last, count);
    }
}

/// Group one level into internodes of near-equal width.
///
/// With more than `MAX_INT` nodes, `ceil(n / MAX_INT)` groups of at least
/// `floor(n / groups)` children each never fall below `MIN_INT`.
fn group<T>(level: Vec<Node<T>>) -> Vec<Node<T>> {
    let n = level.len();
    let groups = n.div_ceil(MAX_INT);
    let mut nodes = level.into_iter();
    let mut out = Vec::with_capacity(groups);
    for g in 0..groups {
        let width = n / groups + usize::from(g < n % groups);
        let mut children = Vec::with_capacity(MAX_INT + 1);
        children.extend(nodes.by_ref().take(width));
        out.push(Node::Internode(Internode::from_children(children)));
    }
    out
}

impl<T, A: BlockAllocator<T>> Tree<T, A> {
    /// Append every element of `iter` at the end.
    pub fn extend_back<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_iter(self.len(), iter);
    }

    /// Insert every element of `iter` before position `index`, returning how
    /// many were inserted.
    ///
    /// The elements are assembled into a side tree first and spliced in.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_iter<I: IntoIterator<Item = T>>(&mut self, index: usize, iter: I) -> usize {
        let len = self.len();
        assert!(index <= len, "insertion index {index} out of range for length {len}");
        let side = build_subtree(iter, &mut self.alloc);
        let added = side.as_ref().map_or(0, Subtree::len);
        self.attach(index, side);
        added
    }

    /// Drain every element into a vector, let `rewrite` edit it in place,
    /// and rebuild from what is left.
    ///
    /// The vector is reinstalled even if `rewrite` unwinds, so a panicking
    /// comparator or predicate leaves the tree holding the elements the
    /// vector held at that point.
    pub(crate) fn rebuild<F: FnOnce(&mut Vec<T>)>(&mut self, rewrite: F) {
        let Some(whole) = self.take_subtree() else {
            return;
        };
        let items = IntoIter::from_root(whole.node).collect();
        let mut restore = Restore { tree: self, items };
        rewrite(&mut restore.items);
    }

    /// Keep only the elements for which `keep` returns `true`.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) {
        self.rebuild(|items| items.retain(|v| keep(v)));
    }

    /// Reverse the element order.
    pub fn reverse(&mut self) {
        self.rebuild(|items| items.reverse());
    }

    /// Stable sort with a three-way comparator.
    pub fn sort_by<F: FnMut(&T, &T) -> std::cmp::Ordering>(&mut self, compare: F) {
        self.rebuild(|items| items.sort_by(compare));
    }

    /// Drop every element that `same` reports equal to the element kept
    /// just before it. `same(kept, candidate)`.
    pub fn dedup_by<F: FnMut(&T, &T) -> bool>(&mut self, mut same: F) {
        self.rebuild(|items| items.dedup_by(|candidate, kept| same(kept, candidate)));
    }
}

/// Rebuilds the tree from `items` on drop, including during unwinding.
struct Restore<'a, T, A: BlockAllocator<T>> {
    tree: &'a mut Tree<T, A>,
    items: Vec<T>,
}

impl<T, A: BlockAllocator<T>> Drop for Restore<'_, T, A> {
    fn drop(&mut self) {
        let items = std::mem::take(&mut self.items);
        let rebuilt = build_subtree(items, &mut self.tree.alloc);
        self.tree.install(rebuilt);
    }
}
