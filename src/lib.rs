//! # `bptarray`
//!
//! An augmented B+tree that is at once a random-access sequence and an
//! ordered container.
//!
//! Every internode caches the element count of its subtree, which gives:
//!
//! | Operation | Cost |
//! |-----------|------|
//! | Positional get, insert, erase | `O(log n)` |
//! | Ordered `lower_bound` / `upper_bound` / `find` | `O(log n)` |
//! | Split at a position, splice a range between trees | `O(log n)` regardless of range size |
//! | Bulk build from an iterator | `O(n)` |
//!
//! Leaves are blocks of 64..=128 elements; internodes have 8..=16 children.
//! Relocation moves whole subtrees between owners and rebalances only the
//! nodes along the cut, so no element is copied.
//!
//! ## Containers
//!
//! - [`Sequence`]: positional only, with list algorithms (`sort`, `unique`, `merge`).
//! - [`Set`] / [`MultiSet`]: sorted elements, unique or repeated.
//! - [`Map`] / [`MultiMap`]: sorted `(key, value)` entries.
//! - [`BpTreeArray`]: the configurable container behind all of them.
//! - [`Tree`]: the positional engine itself.
//!
//! ```rust
//! use bptarray::{Sequence, Set};
//!
//! let set: Set<u32> = (0..1000).rev().collect();
//! assert_eq!(set.lower_bound(&500), 500);
//!
//! let mut a: Sequence<u32> = (0..256).collect();
//! let mut b: Sequence<u32> = (1000..1256).collect();
//! a.splice(256, &mut b).unwrap();
//! assert_eq!((a.len(), a[256], b.is_empty()), (512, 1000, true));
//! ```
//!
//! ## Thread Safety
//!
//! Containers are plain owned values with no interior mutability: they are
//! `Send`/`Sync` whenever the element type is, and mutation needs `&mut`.
//!
//! ## Logging
//!
//! With the `tracing` feature, structural events (splits, level changes,
//! joins, range releases, bulk builds) are emitted through `tracing`.
//! Without it the logging macros compile to nothing.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Hot-path accessors are small and benchmarked; see benches/tree.rs.
#![allow(clippy::inline_always)]

pub mod alloc;
pub mod array;
pub mod config;
mod internode;
mod leaf;
pub mod map;
mod node;
pub mod ordering;
pub mod sequence;
pub mod set;
mod tracing_helpers;
pub mod tree;

// Re-export main types for convenience
pub use alloc::{BlockAllocator, HeapBlocks, PooledBlocks};
pub use array::BpTreeArray;
pub use config::ArrayConfig;
pub use map::{Map, MultiMap};
pub use ordering::{Compare, CompareFn, Natural};
pub use sequence::Sequence;
pub use set::{MultiSet, Set};
pub use tree::{Tree, TreeError};
