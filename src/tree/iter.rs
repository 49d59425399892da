//! Element iterators.
//!
//! - [`Iter`]: shared, double-ended, built from two cursors.
//! - [`IterMut`]: exclusive, walks the tree with a stack of child iterators.
//! - [`IntoIter`]: owning, unpacks nodes from both ends of a work list.

use std::collections::VecDeque;
use std::fmt as StdFmt;
use std::iter::FusedIterator;
use std::ops::RangeBounds;

use crate::alloc::BlockAllocator;
use crate::node::Node;

use super::{Cursor, Tree, resolve_range};

// ============================================================================
//  Iter
// ============================================================================

/// Shared iterator over a contiguous range of a [`Tree`].
pub struct Iter<'a, T> {
    front: Cursor<'a, T>,
    back: Cursor<'a, T>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) const fn new(front: Cursor<'a, T>, back: Cursor<'a, T>) -> Self {
        Self { front, back }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.front.index() >= self.back.index() {
            return None;
        }
        let value = self.front.get();
        self.front.move_next();
        value
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back.index().saturating_sub(self.front.index());
        (n, Some(n))
    }

    fn nth(&mut self, n: usize) -> Option<&'a T> {
        let target = self.front.index().saturating_add(n).min(self.back.index());
        self.front.seek(target);
        self.next()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front.index() >= self.back.index() {
            return None;
        }
        self.back.move_prev();
        self.back.get()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front,
            back: self.back,
        }
    }
}

impl<T> StdFmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("Iter")
            .field("front", &self.front.index())
            .field("back", &self.back.index())
            .finish()
    }
}

// ============================================================================
//  IterMut
// ============================================================================

/// Exclusive iterator over every element of a [`Tree`].
pub struct IterMut<'a, T> {
    stack: Vec<std::slice::IterMut<'a, Node<T>>>,
    leaf: std::slice::IterMut<'a, T>,
    remaining: usize,
}

impl<'a, T> IterMut<'a, T> {
    fn new(root: &'a mut Node<T>) -> Self {
        let remaining = root.len();
        match root {
            Node::Leaf(leaf) => Self {
                stack: Vec::new(),
                leaf: leaf.cells.iter_mut(),
                remaining,
            },
            Node::Internode(inner) => Self {
                stack: vec![inner.children.iter_mut()],
                leaf: <&mut [T]>::default().iter_mut(),
                remaining,
            },
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        loop {
            if let Some(value) = self.leaf.next() {
                self.remaining -= 1;
                return Some(value);
            }
            loop {
                let top = self.stack.last_mut()?;
                match top.next() {
                    Some(Node::Leaf(leaf)) => {
                        self.leaf = leaf.cells.iter_mut();
                        break;
                    }
                    Some(Node::Internode(inner)) => self.stack.push(inner.children.iter_mut()),
                    None => {
                        self.stack.pop();
                    }
                }
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

impl<T> StdFmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.remaining).finish_non_exhaustive()
    }
}

// ============================================================================
//  IntoIter
// ============================================================================

/// Owning iterator over the elements of a [`Tree`].
pub struct IntoIter<T> {
    pending: VecDeque<Node<T>>,
    front: std::vec::IntoIter<T>,
    back: std::vec::IntoIter<T>,
    remaining: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn from_root(root: Node<T>) -> Self {
        let remaining = root.len();
        let mut pending = VecDeque::new();
        pending.push_back(root);
        Self {
            pending,
            front: Vec::new().into_iter(),
            back: Vec::new().into_iter(),
            remaining,
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            if let Some(value) = self.front.next() {
                self.remaining -= 1;
                return Some(value);
            }
            match self.pending.pop_front() {
                Some(Node::Leaf(leaf)) => self.front = leaf.cells.into_iter(),
                Some(Node::Internode(inner)) => {
                    for child in inner.children.into_iter().rev() {
                        self.pending.push_front(child);
                    }
                }
                None => {
                    let value = self.back.next()?;
                    self.remaining -= 1;
                    return Some(value);
                }
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        loop {
            if let Some(value) = self.back.next_back() {
                self.remaining -= 1;
                return Some(value);
            }
            match self.pending.pop_back() {
                Some(Node::Leaf(leaf)) => self.back = leaf.cells.into_iter(),
                Some(Node::Internode(inner)) => self.pending.extend(inner.children),
                None => {
                    let value = self.front.next_back()?;
                    self.remaining -= 1;
                    return Some(value);
                }
            }
        }
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> StdFmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("IntoIter").field("remaining", &self.remaining).finish_non_exhaustive()
    }
}

// ============================================================================
//  Tree entry points
// ============================================================================

impl<T, A: BlockAllocator<T>> Tree<T, A> {
    /// Iterate over every element in logical order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.begin(), self.end())
    }

    /// Iterate over a positional range, clamped to the tree.
    #[must_use]
    pub fn iter_range<R: RangeBounds<usize>>(&self, range: R) -> Iter<'_, T> {
        let len = self.len();
        let (start, end) = resolve_range(&range, len);
        let end = end.min(len);
        Iter::new(self.cursor(start.min(end)), self.cursor(end))
    }

    /// Iterate mutably over every element in logical order.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(&mut self.root)
    }
}

impl<'a, T, A: BlockAllocator<T>> IntoIterator for &'a Tree<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: BlockAllocator<T>> IntoIterator for &'a mut Tree<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, A: BlockAllocator<T>> IntoIterator for Tree<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::from_root(self.root)
    }
}
