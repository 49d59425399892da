//! Logging macros that vanish without the `tracing` feature.
//!
//! With `--features tracing` they forward to the `tracing` crate; otherwise
//! they expand to nothing and their arguments are never evaluated.
//!
//! ```bash
//! # Structural events (splits, new levels, range releases)
//! RUST_LOG=bptarray=debug cargo test --features tracing --test scenarios
//!
//! # Every rebalance and join
//! RUST_LOG=bptarray::tree=trace cargo test --features tracing
//! ```
//!
//! Relocation entry points carry
//! `#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all, fields(...)))]`
//! so their events nest under a span naming the operation.

#![allow(unused_macros, unused_imports)]

/// Trace-level event: per-node rebalancing detail.
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Debug-level event: height changes and bulk work.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub(crate) use debug_log;
pub(crate) use trace_log;
