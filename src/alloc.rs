//! Block allocation capability.
//!
//! Leaf blocks are the only storage whose size depends on the element count,
//! so they are the only storage routed through an allocator. Internodes are
//! small fixed-fanout records and come straight from the global allocator.
//!
//! [`HeapBlocks`] is the default and simply asks the global allocator for a
//! fresh vector each time. [`PooledBlocks`] keeps released blocks on a free
//! list so that split/merge-heavy workloads stop hitting the allocator.

use std::fmt as StdFmt;

use crate::config::MAX_EXT;

/// Capacity every leaf block is allocated with.
///
/// One spare slot lets a full block accept the insert that triggers its split
/// without reallocating.
pub const BLOCK_CAPACITY: usize = MAX_EXT + 1;

/// Source and sink of leaf blocks.
///
/// Implementations must hand out empty vectors. A released block may still
/// hold elements; the allocator is responsible for dropping them.
pub trait BlockAllocator<T> {
    /// Obtain an empty block able to hold at least [`BLOCK_CAPACITY`] elements.
    fn allocate(&mut self) -> Vec<T>;

    /// Return a block that is no longer referenced by any tree.
    fn release(&mut self, block: Vec<T>);
}

// ============================================================================
//  HeapBlocks
// ============================================================================

/// Allocate every block from the global allocator and free it on release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapBlocks;

impl<T> BlockAllocator<T> for HeapBlocks {
    #[inline]
    fn allocate(&mut self) -> Vec<T> {
        Vec::with_capacity(BLOCK_CAPACITY)
    }

    #[inline]
    fn release(&mut self, block: Vec<T>) {
        drop(block);
    }
}

// ============================================================================
//  PooledBlocks
// ============================================================================

/// Recycle released blocks through a bounded free list.
///
/// Cloning a pool yields a new, empty pool with the same limit; blocks are
/// never shared between pools.
pub struct PooledBlocks<T> {
    free: Vec<Vec<T>>,
    limit: usize,
    fresh: usize,
    reused: usize,
    released: usize,
}

impl<T> PooledBlocks<T> {
    /// Default number of blocks kept on the free list.
    pub const DEFAULT_LIMIT: usize = 64;

    /// Create an empty pool keeping up to [`Self::DEFAULT_LIMIT`] blocks.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_limit(Self::DEFAULT_LIMIT)
    }

    /// Create an empty pool keeping up to `limit` blocks.
    #[must_use]
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            free: Vec::new(),
            limit,
            fresh: 0,
            reused: 0,
            released: 0,
        }
    }

    /// Number of blocks obtained from the global allocator.
    #[must_use]
    pub const fn fresh_count(&self) -> usize {
        self.fresh
    }

    /// Number of allocations served from the free list.
    #[must_use]
    pub const fn reused_count(&self) -> usize {
        self.reused
    }

    /// Number of blocks handed back by trees.
    #[must_use]
    pub const fn released_count(&self) -> usize {
        self.released
    }

    /// Number of blocks currently waiting on the free list.
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.free.len()
    }
}

impl<T> Default for PooledBlocks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for PooledBlocks<T> {
    fn clone(&self) -> Self {
        Self::with_limit(self.limit)
    }
}

impl<T> StdFmt::Debug for PooledBlocks<T> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("PooledBlocks")
            .field("pooled", &self.free.len())
            .field("limit", &self.limit)
            .field("fresh", &self.fresh)
            .field("reused", &self.reused)
            .field("released", &self.released)
            .finish()
    }
}

impl<T> BlockAllocator<T> for PooledBlocks<T> {
    fn allocate(&mut self) -> Vec<T> {
        if let Some(block) = self.free.pop() {
            self.reused += 1;
            block
        } else {
            self.fresh += 1;
            Vec::with_capacity(BLOCK_CAPACITY)
        }
    }

    fn release(&mut self, mut block: Vec<T>) {
        self.released += 1;
        if self.free.len() < self.limit && block.capacity() >= BLOCK_CAPACITY {
            block.clear();
            self.free.push(block);
        }
    }
}
