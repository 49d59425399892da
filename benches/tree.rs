//! Benchmarks for `Tree`, `Set` and `Sequence` using Divan.
//!
//! Run with: `cargo bench --bench tree`
//! With mimalloc: `cargo bench --bench tree --features mimalloc`

use bptarray::{Sequence, Set, Tree};
use divan::{Bencher, black_box};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const SIZES: &[usize] = &[1_000, 100_000, 1_000_000];

fn main() {
    divan::main();
}

fn scrambled(n: usize) -> Vec<u64> {
    (0..n as u64).map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15) % (n as u64 * 4)).collect()
}

// =============================================================================
// Construction
// =============================================================================

#[divan::bench_group]
mod build {
    use super::{Bencher, SIZES, Sequence, Set, Tree, scrambled};

    #[divan::bench(args = SIZES)]
    fn collect_tree(bencher: Bencher, n: usize) {
        bencher.bench_local(|| (0..n as u64).collect::<Tree<u64>>());
    }

    #[divan::bench(args = SIZES)]
    fn push_back_one_by_one(bencher: Bencher, n: usize) {
        bencher.bench_local(|| {
            let mut seq = Sequence::<u64>::new();
            for i in 0..n as u64 {
                seq.push_back(i);
            }
            seq
        });
    }

    #[divan::bench(args = SIZES)]
    fn set_from_unsorted(bencher: Bencher, n: usize) {
        let keys = scrambled(n);
        bencher.bench_local(|| keys.iter().copied().collect::<Set<u64>>());
    }
}

// =============================================================================
// Positional access
// =============================================================================

#[divan::bench_group]
mod positional {
    use super::{Bencher, SIZES, Tree, black_box};

    #[divan::bench(args = SIZES)]
    fn get_strided(bencher: Bencher, n: usize) {
        let tree: Tree<u64> = (0..n as u64).collect();
        let mut at = 0_usize;
        bencher.bench_local(|| {
            at = (at + 7919) % n;
            black_box(tree.get(black_box(at)))
        });
    }

    #[divan::bench(args = SIZES)]
    fn iterate_all(bencher: Bencher, n: usize) {
        let tree: Tree<u64> = (0..n as u64).collect();
        bencher.bench_local(|| tree.iter().copied().sum::<u64>());
    }

    #[divan::bench(args = SIZES)]
    fn insert_remove_middle(bencher: Bencher, n: usize) {
        let mut tree: Tree<u64> = (0..n as u64).collect();
        bencher.bench_local(|| {
            tree.insert(n / 2, black_box(7));
            black_box(tree.remove(n / 2))
        });
    }
}

// =============================================================================
// Ordered search and insert
// =============================================================================

#[divan::bench_group]
mod ordered {
    use super::{Bencher, SIZES, Set, black_box, scrambled};

    #[divan::bench(args = SIZES)]
    fn lower_bound(bencher: Bencher, n: usize) {
        let set: Set<u64> = scrambled(n).into_iter().collect();
        let mut probe = 0_u64;
        bencher.bench_local(|| {
            probe = probe.wrapping_add(104_729) % (n as u64 * 4);
            black_box(set.lower_bound(black_box(&probe)))
        });
    }

    #[divan::bench(args = SIZES)]
    fn insert_scrambled(bencher: Bencher, n: usize) {
        let keys = scrambled(n);
        bencher.bench_local(|| {
            let mut set = Set::<u64>::new();
            for &k in &keys {
                set.insert(k);
            }
            set
        });
    }
}

// =============================================================================
// Relocation: splice vs element-wise move
// =============================================================================

#[divan::bench_group]
mod relocate {
    use super::{Bencher, SIZES, Tree};

    #[divan::bench(args = SIZES)]
    fn splice_half(bencher: Bencher, n: usize) {
        bencher
            .with_inputs(|| ((0..n as u64).collect::<Tree<u64>>(), (0..n as u64).collect::<Tree<u64>>()))
            .bench_local_values(|(mut dst, mut src)| {
                let half = src.len() / 2;
                let _ = dst.splice_range(dst.len() / 2, &mut src, half..);
                (dst, src)
            });
    }

    #[divan::bench(args = SIZES)]
    fn move_half_elementwise(bencher: Bencher, n: usize) {
        bencher
            .with_inputs(|| ((0..n as u64).collect::<Tree<u64>>(), (0..n as u64).collect::<Tree<u64>>()))
            .bench_local_values(|(mut dst, mut src)| {
                let at = dst.len() / 2;
                let half = src.len() / 2;
                while src.len() > half {
                    if let Some(v) = src.pop_back() {
                        dst.insert(at, v);
                    }
                }
                (dst, src)
            });
    }

    #[divan::bench(args = SIZES)]
    fn split_and_rejoin(bencher: Bencher, n: usize) {
        let mut tree: Tree<u64> = (0..n as u64).collect();
        bencher.bench_local(|| {
            let mut tail = tree.split_off(n / 3);
            tree.append(&mut tail);
        });
    }
}
