//! # Climate Registry
//!
//! Owns one engine handle per simulated world. Handles are passed to
//! whoever needs them; nothing looks an engine up through global state.
//!
//! Each engine sits behind its own `parking_lot::Mutex`. A tick holds the
//! lock for the whole region pass, so no caller ever sees a half-applied
//! level.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tidewater_core::{
    FlowVerdict, MutationEvent, SeaLevelEngine, SnapshotStore, TickOutcome, WorldId, WorldView,
};
use tracing::{info, warn};

use crate::server_config::WorldConfig;

/// Shared handle to one world's engine.
pub type EngineHandle = Arc<Mutex<SeaLevelEngine>>;

/// Per-world engine handles plus their snapshot location.
#[derive(Debug, Default)]
pub struct ClimateRegistry {
    engines: BTreeMap<WorldId, EngineHandle>,
    snapshot_dir: Option<PathBuf>,
}

impl ClimateRegistry {
    /// Creates a registry that persists snapshots under `snapshot_dir`.
    #[must_use]
    pub fn new(snapshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            engines: BTreeMap::new(),
            snapshot_dir: Some(snapshot_dir.into()),
        }
    }

    /// Creates a registry that never touches disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Snapshot directory, if persistent.
    #[must_use]
    pub fn snapshot_dir(&self) -> Option<&Path> {
        self.snapshot_dir.as_deref()
    }

    /// Snapshot store for a world, if persistent.
    #[must_use]
    pub fn store_for(&self, world: WorldId) -> Option<SnapshotStore> {
        self.snapshot_dir
            .as_deref()
            .map(|dir| SnapshotStore::for_world(dir, world))
    }

    /// Builds and registers an engine for a configured world.
    ///
    /// Worlds without a sea, or whose sea-level config does not validate,
    /// are left without simulation. Returns the handle if one was created.
    pub fn enable(&mut self, world: &WorldConfig) -> Option<EngineHandle> {
        let id = world.world_id();
        if !world.environment.has_sea() {
            info!(world = %id, name = %world.name, "no sea in this environment, sea level disabled");
            return None;
        }

        let settings = match world.sea_level.validate() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(world = %id, name = %world.name, error = %e, "sea level disabled");
                return None;
            }
        };

        let engine = match self.store_for(id) {
            Some(store) => SeaLevelEngine::restore(id, settings, &store),
            None => SeaLevelEngine::new(id, settings),
        };
        Some(self.register(engine))
    }

    /// Registers an engine, replacing any engine for the same world.
    pub fn register(&mut self, engine: SeaLevelEngine) -> EngineHandle {
        let world = engine.world();
        let handle = Arc::new(Mutex::new(engine));
        self.engines.insert(world, Arc::clone(&handle));
        handle
    }

    /// Engine handle for a world.
    #[must_use]
    pub fn get(&self, world: WorldId) -> Option<EngineHandle> {
        self.engines.get(&world).cloned()
    }

    /// Removes a world's engine.
    pub fn remove(&mut self, world: WorldId) -> Option<EngineHandle> {
        self.engines.remove(&world)
    }

    /// Worlds with an engine, in id order.
    pub fn worlds(&self) -> impl Iterator<Item = WorldId> + '_ {
        self.engines.keys().copied()
    }

    /// Number of registered engines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Returns true if no engine is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Runs one pass for `world` under its engine lock.
    pub fn tick<W: WorldView>(&self, world: &mut W, signal: f64) -> Option<TickOutcome> {
        let handle = self.engines.get(&world.id())?;
        let outcome = handle.lock().tick(world, signal);
        Some(outcome)
    }

    /// Routes a mutation event to its world's engine. Worlds without an
    /// engine allow everything.
    pub fn handle(&self, event: MutationEvent) -> FlowVerdict {
        self.engines
            .get(&event.world())
            .map_or(FlowVerdict::Allow, |handle| handle.lock().handle(event))
    }

    /// Saves every engine's state. Returns the number saved; failures are
    /// logged and skipped.
    pub fn save_all(&self) -> usize {
        let mut saved = 0;
        for (world, handle) in &self.engines {
            let Some(store) = self.store_for(*world) else {
                continue;
            };
            match handle.lock().save(&store) {
                Ok(()) => saved += 1,
                Err(e) => warn!(world = %world, error = %e, "sea-level snapshot not saved"),
            }
        }
        saved
    }
}
