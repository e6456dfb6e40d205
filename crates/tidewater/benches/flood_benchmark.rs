//! Benchmark for sea-level passes.
//!
//! TARGET: flood + drain of a 9x9 chunk ocean well inside one 50 ms tick
//!
//! Run with: cargo bench --package tidewater --bench flood_benchmark

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use tidewater_core::snapshot::{decode, encode};
use tidewater_core::{
    apply_region, Distribution, RegionKey, SeaChange, SeaLevelEngine, SeaLevelSettings,
    SeaLevelState, WorldId, WorldView,
};
use tidewater_world::{ChunkGenerator, VoxelWorld};

const W: WorldId = WorldId(1);

fn settings() -> SeaLevelSettings {
    SeaLevelSettings {
        distribution: Distribution::new(&[0.0, 10.0], &[0.0, 10.0]).unwrap(),
        interval_ticks: 200,
    }
}

fn ocean(radius: i32) -> VoxelWorld {
    let mut world = VoxelWorld::new(W, ChunkGenerator::flat(58));
    world.ensure_loaded_around(0, 0, radius);
    world
}

fn benchmark_region_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_pass");
    group.throughput(Throughput::Elements(3 * 256));

    group.bench_function("flood_one_chunk", |b| {
        b.iter_batched(
            || {
                let mut state = SeaLevelState::new();
                state.observe_baseline(62);
                (ocean(0), state)
            },
            |(mut world, mut state)| {
                let region = world.region_mut(RegionKey::new(W, 0, 0)).unwrap();
                black_box(apply_region(region, SeaChange::Up, 65, &mut state))
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn benchmark_world_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_tick");
    // 9x9 chunks, three layers each
    group.throughput(Throughput::Elements(81 * 256 * 3));

    group.bench_function("flood_then_drain_81_chunks", |b| {
        b.iter_batched(
            || (ocean(4), SeaLevelEngine::new(W, settings())),
            |(mut world, mut engine)| {
                black_box(engine.tick(&mut world, 3.0));
                black_box(engine.tick(&mut world, 0.0))
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("unchanged_tick", |b| {
        let mut world = ocean(4);
        let mut engine = SeaLevelEngine::new(W, settings());
        engine.tick(&mut world, 3.0);
        b.iter(|| black_box(engine.tick(&mut world, 3.0)));
    });

    group.finish();
}

fn benchmark_snapshot(c: &mut Criterion) {
    let mut world = ocean(4);
    let mut engine = SeaLevelEngine::new(W, settings());
    engine.tick(&mut world, 3.0);
    let bytes = encode(engine.state());

    c.bench_function("snapshot_encode_62k_records", |b| {
        b.iter(|| black_box(encode(engine.state())));
    });
    c.bench_function("snapshot_decode_62k_records", |b| {
        b.iter(|| black_box(decode(&bytes).unwrap()));
    });
}

criterion_group!(
    benches,
    benchmark_region_pass,
    benchmark_world_tick,
    benchmark_snapshot
);
criterion_main!(benches);
