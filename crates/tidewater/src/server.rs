//! # Sea-Level Server
//!
//! Owns the worlds, the climate model and the registry, and runs one
//! simulation tick at a time: advance the climate, then give every world
//! whose repeating task is due a sea-level pass.

use std::collections::BTreeMap;

use tidewater_core::{ClimateSource, FlowVerdict, MutationEvent, TickOutcome, WorldId};
use tidewater_world::VoxelWorld;
use tracing::{debug, info, warn};

use crate::climate::ScriptedClimate;
use crate::error::ServerResult;
use crate::registry::ClimateRegistry;
use crate::scheduler::RepeatingTask;
use crate::server_config::ServerConfig;

/// One simulated world with its sea-level schedule.
struct WorldSlot {
    world: VoxelWorld,
    task: Option<RepeatingTask>,
}

/// Headless sea-level server.
pub struct TidewaterServer {
    config: ServerConfig,
    registry: ClimateRegistry,
    climate: ScriptedClimate,
    worlds: BTreeMap<WorldId, WorldSlot>,
    tick: u64,
}

impl TidewaterServer {
    /// Builds every configured world and restores its sea-level state.
    ///
    /// # Errors
    ///
    /// Returns a validation error for server-wide settings. Per-world
    /// sea-level problems only disable that world.
    pub fn from_config(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;

        let mut registry = ClimateRegistry::new(&config.snapshot_dir);
        let mut worlds = BTreeMap::new();

        for world_config in &config.worlds {
            let id = world_config.world_id();
            let chunk_dir = config.snapshot_dir.join("chunks").join(id.0.to_string());
            let mut world = VoxelWorld::new(id, world_config.generator())
                .with_environment(world_config.environment)
                .with_storage(chunk_dir);
            world.ensure_loaded_around(0, 0, world_config.view_radius);

            let task = registry
                .enable(world_config)
                .map(|handle| RepeatingTask::every(handle.lock().interval_ticks()));

            info!(
                world = %id,
                name = %world_config.name,
                environment = ?world_config.environment,
                chunks = world.loaded_chunk_count(),
                sea_level = task.is_some(),
                "world ready"
            );
            worlds.insert(id, WorldSlot { world, task });
        }

        Ok(Self {
            climate: config.climate.build(),
            config,
            registry,
            worlds,
            tick: 0,
        })
    }

    /// Server config.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Engine handles.
    #[must_use]
    pub const fn registry(&self) -> &ClimateRegistry {
        &self.registry
    }

    /// Climate model.
    #[must_use]
    pub const fn climate(&self) -> &ScriptedClimate {
        &self.climate
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// A world by id.
    #[must_use]
    pub fn world(&self, id: WorldId) -> Option<&VoxelWorld> {
        self.worlds.get(&id).map(|slot| &slot.world)
    }

    /// A world by id, for host-side edits.
    pub fn world_mut(&mut self, id: WorldId) -> Option<&mut VoxelWorld> {
        self.worlds.get_mut(&id).map(|slot| &mut slot.world)
    }

    /// Runs one simulation tick. Returns the outcome of every sea-level
    /// pass that was due.
    pub fn tick(&mut self) -> Vec<(WorldId, TickOutcome)> {
        self.tick += 1;
        self.climate.advance_to(self.tick);

        let mut outcomes = Vec::new();
        for (id, slot) in &mut self.worlds {
            let Some(task) = slot.task.as_mut() else {
                continue;
            };
            if !task.poll(self.tick) {
                continue;
            }
            let Some(handle) = self.registry.get(*id) else {
                continue;
            };

            let signal = self.climate.temperature(*id);
            let mut engine = handle.lock();
            let outcome = engine.tick(&mut slot.world, signal);
            // Picks up an interval changed through the engine handle.
            task.set_interval(engine.interval_ticks());
            drop(engine);

            debug!(world = %id, tick = self.tick, signal, ?outcome, "sea-level pass");
            outcomes.push((*id, outcome));
        }
        outcomes
    }

    /// Forwards a host mutation event. The caller must cancel a fluid flow
    /// on [`FlowVerdict::Deny`].
    pub fn handle_event(&self, event: MutationEvent) -> FlowVerdict {
        self.registry.handle(event)
    }

    /// Returns true once the configured tick budget is spent.
    #[must_use]
    pub const fn finished(&self) -> bool {
        self.config.run_ticks != 0 && self.tick >= self.config.run_ticks
    }

    /// Writes every loaded chunk and every sea-level snapshot. Returns the
    /// number of snapshots saved.
    pub fn shutdown(&mut self) -> usize {
        for (id, slot) in &mut self.worlds {
            if let Err(e) = slot.world.unload_all() {
                warn!(world = %id, error = %e, "chunks not saved");
            }
        }
        let saved = self.registry.save_all();
        info!(ticks = self.tick, saved, "sea-level state saved");
        saved
    }
}
