//! # Tick Performance Benchmark
//!
//! REQUIREMENTS:
//! - 192x108 grid (default session)
//! - Well under the 100ms tick interval
//! - 0 handle placements during steady-state ticks
//!
//! Run with: `cargo bench --package lifegrid_core`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lifegrid_core::{LifeEngine, NullView, SeedParams};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const WIDTH: usize = 192;
const HEIGHT: usize = 108;

fn engine(pool_size: usize) -> LifeEngine<NullView> {
    let params = SeedParams {
        width: WIDTH,
        height: HEIGHT,
        cell_size: 0.1,
        live_probability: 0.3,
    };
    LifeEngine::with_rng(pool_size, params, NullView, ChaCha8Rng::seed_from_u64(0x5EED))
        .expect("valid benchmark session")
}

/// Benchmark: one generation on the default grid.
fn bench_tick(c: &mut Criterion) {
    let mut engine = engine(WIDTH * HEIGHT);
    c.bench_function("tick_192x108", |b| {
        b.iter(|| black_box(engine.tick()));
    });
}

/// Benchmark: ticks with a pool smaller than the population.
fn bench_tick_undersized_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_pool_size");

    for pool_size in [500, 5000, WIDTH * HEIGHT] {
        group.bench_with_input(
            BenchmarkId::from_parameter(pool_size),
            &pool_size,
            |b, &pool_size| {
                let mut engine = engine(pool_size);
                b.iter(|| black_box(engine.tick()));
            },
        );
    }

    group.finish();
}

/// Benchmark: full restart (release everything, reseed).
fn bench_restart(c: &mut Criterion) {
    let mut engine = engine(5000);
    let params = engine.params();
    c.bench_function("restart_192x108", |b| {
        b.iter(|| engine.restart(black_box(params)));
    });
}

criterion_group!(benches, bench_tick, bench_tick_undersized_pool, bench_restart);
criterion_main!(benches);
