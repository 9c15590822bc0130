//! Service hot-path benchmarks.
//!
//! The service spends nearly all of its time asleep, so these measure only
//! the work done between waits: drawing a delay and formatting a result.
//!
//! # Groups
//!
//! | Group | What it measures |
//! |-------|-----------------|
//! | `jitter` | One delay draw from the thread RNG and from a seeded RNG |
//! | `results` | Unary and streamed result formatting at several query sizes |
//!
//! # Viewing results
//!
//! ```sh
//! cargo bench --bench service_bench
//! open target/criterion/report/index.html
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fauxsearch_core::{results, BackendId, Jitter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Jitter
// ---------------------------------------------------------------------------

fn jitter_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("jitter");
    let jitter = Jitter::new(Duration::from_millis(100));

    group.bench_function("thread_rng", |b| b.iter(|| black_box(jitter.sample())));

    let mut rng = StdRng::seed_from_u64(7);
    group.bench_function("seeded", |b| {
        b.iter(|| black_box(jitter.sample_with(&mut rng)))
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Result generation
// ---------------------------------------------------------------------------

fn results_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("results");
    let backend = BackendId::new("bench-backend");

    for len in [4usize, 64, 1024] {
        let query = "q".repeat(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::new("unary", len), &query, |b, q| {
            b.iter(|| black_box(results::unary(q, &backend)))
        });
        group.bench_with_input(BenchmarkId::new("streamed", len), &query, |b, q| {
            b.iter(|| black_box(results::streamed(42, q, &backend)))
        });
    }

    group.finish();
}

criterion_group!(benches, jitter_bench, results_bench);
criterion_main!(benches);
