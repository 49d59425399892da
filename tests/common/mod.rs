//! Shared helpers for integration tests.
//!
//! `init_tracing` installs a compact console subscriber filtered by
//! `RUST_LOG`. Setting `BPTARRAY_LOG_DIR` additionally writes JSON lines to
//! `$BPTARRAY_LOG_DIR/bptarray.jsonl`. Events only exist when the crate is
//! built with the `tracing` feature:
//!
//! ```bash
//! RUST_LOG=bptarray=debug cargo test --features tracing --test scenarios
//! ```

#![allow(dead_code)]

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Mutex, Once};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

static INIT: Once = Once::new();

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the test subscriber once per process.
pub fn init_tracing() {
    INIT.call_once(|| {
        let console = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .compact()
            .with_filter(filter());

        let file = std::env::var_os("BPTARRAY_LOG_DIR").and_then(|dir| {
            let dir = Path::new(&dir);
            fs::create_dir_all(dir).ok()?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("bptarray.jsonl"))
                .ok()?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .json()
                    .with_filter(filter()),
            )
        });

        let _ = Registry::default().with(console).with(file).try_init();
    });
}

/// Deterministic permutation of `0..n` (`n` must not share a factor with 7919).
pub fn scrambled(n: u32) -> Vec<u32> {
    (0..n).map(|i| (u64::from(i) * 7919 % u64::from(n)) as u32).collect()
}
