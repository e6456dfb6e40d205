//! # Sea-Level Scenarios
//!
//! Drives the engine against a real chunked world: flood, drain, thaw,
//! player edits, fluid spread and chunk unload/reload.

use tidewater_core::{
    BlockFace, CellKey, Distribution, Environment, FlowVerdict, Material, MutationEvent,
    SeaChange, SeaLevelEngine, SeaLevelSettings, TickOutcome, WorldId,
};
use tidewater_world::{ChunkGenerator, VoxelWorld, CHUNK_SIZE};

const W: WorldId = WorldId(1);
const COLUMNS: usize = CHUNK_SIZE * CHUNK_SIZE;

/// Signal `s` raises the sea by `s` cells.
fn engine() -> SeaLevelEngine {
    let settings = SeaLevelSettings {
        distribution: Distribution::new(&[0.0, 10.0], &[0.0, 10.0]).unwrap(),
        interval_ticks: 20,
    };
    SeaLevelEngine::new(W, settings)
}

/// Sea floor at 58, native sea level 63: water fills y = 59..=62.
fn ocean(radius: i32) -> VoxelWorld {
    let mut world = VoxelWorld::new(W, ChunkGenerator::flat(58));
    world.ensure_loaded_around(0, 0, radius);
    world
}

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "tidewater_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn test_flood_fills_three_layers() {
    let mut world = ocean(0);
    let mut engine = engine();

    let outcome = engine.tick(&mut world, 3.0);

    match outcome {
        TickOutcome::Raised { from, to, regions, report } => {
            assert_eq!((from, to, regions), (62, 65, 1));
            assert_eq!(report.created(), 3 * COLUMNS);
        }
        other => panic!("expected a rise, got {other:?}"),
    }
    assert_eq!(engine.state().default_level(), Some(62));
    assert_eq!(engine.state().current_level(), Some(65));
    assert_eq!(engine.state().last_change(), SeaChange::Up);
    assert_eq!(engine.state().tracked().len(), 3 * COLUMNS);

    for y in 63..=65 {
        assert_eq!(world.get_block(7, y, 9), Some(Material::WATER));
        let record = engine.state().tracked().get(&CellKey::new(W, 7, y, 9)).unwrap();
        assert_eq!(record.original, Material::AIR);
        assert_eq!(record.applied, Material::WATER);
    }
    assert_eq!(world.get_block(7, 66, 9), Some(Material::AIR));
}

#[test]
fn test_drain_restores_world() {
    let mut world = ocean(1);
    let mut engine = engine();

    engine.tick(&mut world, 3.0);
    assert_eq!(engine.state().tracked().len(), 9 * 3 * COLUMNS);

    let outcome = engine.tick(&mut world, 0.0);

    assert!(matches!(outcome, TickOutcome::Lowered { from: 65, to: 62, .. }));
    assert!(engine.state().tracked().is_empty());
    assert_eq!(engine.state().current_level(), Some(62));
    assert_eq!(engine.state().last_change(), SeaChange::Down);
    for y in 63..=65 {
        assert_eq!(world.get_block(-5, y, 12), Some(Material::AIR));
    }
    assert_eq!(world.get_block(-5, 62, 12), Some(Material::WATER));
}

#[test]
fn test_partial_drain_keeps_submerged_records() {
    let mut world = ocean(0);
    let mut engine = engine();

    engine.tick(&mut world, 3.0);
    engine.tick(&mut world, 1.0);

    assert_eq!(engine.state().current_level(), Some(63));
    assert_eq!(engine.state().tracked().len(), COLUMNS);
    assert_eq!(world.get_block(0, 63, 0), Some(Material::WATER));
    assert_eq!(world.get_block(0, 64, 0), Some(Material::AIR));
}

#[test]
fn test_frozen_base_thaws_and_floods() {
    let mut world = ocean(0);
    world.set_block(3, 62, 3, Material::ICE);
    let mut engine = engine();

    engine.tick(&mut world, 1.0);

    let tracked = engine.state().tracked();
    assert_eq!(tracked.len(), COLUMNS + 1);
    assert_eq!(tracked.get(&CellKey::new(W, 3, 62, 3)).unwrap().original, Material::ICE);
    assert_eq!(tracked.get(&CellKey::new(W, 3, 63, 3)).unwrap().original, Material::AIR);
    assert_eq!(world.get_block(3, 62, 3), Some(Material::WATER));
    assert_eq!(world.get_block(3, 63, 3), Some(Material::WATER));
}

#[test]
fn test_frozen_base_refreezes_only_below_default() {
    let mut world = ocean(0);
    world.set_block(3, 62, 3, Material::ICE);
    // Signal `s` moves the sea by `s` cells either way.
    let settings = SeaLevelSettings {
        distribution: Distribution::new(&[-10.0, 10.0], &[-10.0, 10.0]).unwrap(),
        interval_ticks: 20,
    };
    let mut engine = SeaLevelEngine::new(W, settings);
    let base = CellKey::new(W, 3, 62, 3);

    engine.tick(&mut world, 3.0);
    assert_eq!(engine.state().tracked().len(), 3 * COLUMNS + 1);

    // Back to the default level: the flood drains, the thawed base stays.
    let outcome = engine.tick(&mut world, 0.0);
    assert!(matches!(outcome, TickOutcome::Lowered { from: 65, to: 62, .. }));
    assert_eq!(engine.state().tracked().len(), 1);
    assert_eq!(engine.state().tracked().get(&base).unwrap().original, Material::ICE);
    assert_eq!(world.get_block(3, 62, 3), Some(Material::WATER));
    assert_eq!(world.get_block(3, 63, 3), Some(Material::AIR));

    // Below the default level the base refreezes and tracking empties.
    let outcome = engine.tick(&mut world, -1.0);
    assert!(matches!(outcome, TickOutcome::Lowered { from: 62, to: 61, .. }));
    assert!(engine.state().tracked().is_empty());
    assert_eq!(world.get_block(3, 62, 3), Some(Material::ICE));
    assert_eq!(world.get_block(4, 62, 4), Some(Material::WATER));
}

#[test]
fn test_repeat_tick_is_unchanged() {
    let mut world = ocean(0);
    let mut engine = engine();

    engine.tick(&mut world, 3.0);
    let before = engine.state().tracked().clone();

    assert_eq!(engine.tick(&mut world, 3.4), TickOutcome::Unchanged { level: 65 });
    assert_eq!(engine.state().tracked(), &before);
    assert_eq!(engine.state().last_change(), SeaChange::None);
}

#[test]
fn test_placed_block_survives_drain() {
    let mut world = ocean(0);
    let mut engine = engine();
    engine.tick(&mut world, 3.0);

    let event = world.place_block(1, 64, 1, Material::STONE).unwrap();
    engine.handle(event);

    assert_eq!(engine.state().tracked().len(), 3 * COLUMNS - 1);
    assert!(!engine.state().tracked().contains(&CellKey::new(W, 1, 64, 1)));

    engine.tick(&mut world, 0.0);

    assert!(engine.state().tracked().is_empty());
    assert_eq!(world.get_block(1, 64, 1), Some(Material::STONE));
    assert_eq!(world.get_block(1, 63, 1), Some(Material::AIR));
}

#[test]
fn test_bucket_claims_neighbour() {
    let mut world = ocean(0);
    let mut engine = engine();
    engine.tick(&mut world, 3.0);

    // Both cells are flooded; the bucket lands on the east neighbour.
    let clicked = CellKey::new(W, 4, 64, 4);
    let event = world.empty_bucket(clicked, BlockFace::East).unwrap();
    assert_eq!(event.cell(), Some(CellKey::new(W, 5, 64, 4)));

    engine.handle(event);

    assert!(!engine.state().tracked().contains(&CellKey::new(W, 5, 64, 4)));
    assert!(engine.state().tracked().contains(&clicked));
}

#[test]
fn test_fluid_spread_follows_direction() {
    let mut world = ocean(0);
    let mut engine = engine();
    engine.tick(&mut world, 3.0);

    // Rising: spread is tracked.
    let flow = world.propose_flow(CellKey::new(W, 2, 65, 2), BlockFace::Up).unwrap();
    assert_eq!(engine.handle(MutationEvent::FluidFlow(flow)), FlowVerdict::Allow);
    assert!(world.apply_flow(&flow));
    assert!(engine.state().tracked().contains(&CellKey::new(W, 2, 66, 2)));

    engine.tick(&mut world, 0.0);
    assert_eq!(world.get_block(2, 66, 2), Some(Material::AIR));
    assert!(engine.state().tracked().is_empty());

    // Draining: spread is vetoed and never tracked.
    let flow = world.propose_flow(CellKey::new(W, 2, 62, 2), BlockFace::Up).unwrap();
    assert_eq!(engine.on_fluid_flow(flow), FlowVerdict::Deny);
    assert!(engine.state().tracked().is_empty());
}

#[test]
fn test_unloaded_chunk_drains_on_later_pass() {
    let dir = temp_dir("unload");
    let mut world = VoxelWorld::new(W, ChunkGenerator::flat(58)).with_storage(&dir);
    world.load_chunk(0, 0);
    world.load_chunk(1, 0);
    let mut engine = engine();

    engine.tick(&mut world, 3.0);
    assert_eq!(engine.state().tracked().len(), 2 * 3 * COLUMNS);

    assert!(world.unload_chunk(1, 0).unwrap());
    engine.tick(&mut world, 2.0);

    // Only the loaded chunk lost its top layer.
    assert_eq!(engine.state().tracked().len(), 2 * COLUMNS + 3 * COLUMNS);

    world.load_chunk(1, 0);
    assert_eq!(world.get_block(20, 65, 0), Some(Material::WATER));

    engine.tick(&mut world, 0.0);
    assert!(engine.state().tracked().is_empty());
    assert_eq!(world.get_block(20, 65, 0), Some(Material::AIR));
    assert_eq!(world.get_block(20, 63, 0), Some(Material::AIR));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_dry_land_is_untouched() {
    let mut world = VoxelWorld::new(W, ChunkGenerator::flat(70));
    world.load_chunk(0, 0);
    let mut engine = engine();

    let outcome = engine.tick(&mut world, 5.0);

    assert!(matches!(outcome, TickOutcome::Raised { to: 67, .. }));
    assert!(engine.state().tracked().is_empty());
    assert_eq!(world.get_block(0, 70, 0), Some(Material::GRASS));
}

#[test]
fn test_worlds_without_sea_are_skipped() {
    let mut world = VoxelWorld::new(W, ChunkGenerator::flat(58)).with_environment(Environment::Nether);
    world.load_chunk(0, 0);
    let mut engine = engine();

    assert_eq!(engine.tick(&mut world, 3.0), TickOutcome::Skipped);
    assert_eq!(engine.state().default_level(), None);
}

#[test]
fn test_foreign_world_is_skipped() {
    let mut world = VoxelWorld::new(WorldId(9), ChunkGenerator::flat(58));
    world.load_chunk(0, 0);
    let mut engine = engine();

    assert_eq!(engine.tick(&mut world, 3.0), TickOutcome::Skipped);
    assert_eq!(world.get_block(0, 63, 0), Some(Material::AIR));
}
