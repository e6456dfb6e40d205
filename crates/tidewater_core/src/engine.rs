//! # Sea-Level Engine
//!
//! One engine per world. A tick resolves the target level from the climate
//! signal, applies the difference to every loaded region and only then
//! publishes the new level. Mutation events go straight to the
//! reconciliation handlers.
//!
//! The engine owns its state but not the world: the world is passed into
//! every tick, and the host decides how engines are shared between threads.

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::applier::{apply_region, RegionReport};
use crate::cell::{BlockFace, CellKey, WorldId};
use crate::config::{SeaLevelConfig, SeaLevelSettings};
use crate::error::{ConfigError, ConfigResult, SnapshotResult};
use crate::host::WorldView;
use crate::reconcile::{self, FlowVerdict, FluidFlow, MutationEvent};
use crate::snapshot::SnapshotStore;
use crate::state::{SeaChange, SeaLevelState};

/// What a tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The world has no sea or belongs to another engine.
    Skipped,
    /// Target equals the applied level; no region touched.
    Unchanged {
        /// The applied level.
        level: i32,
    },
    /// Sea rose.
    Raised {
        /// Level before the tick.
        from: i32,
        /// Level after the tick.
        to: i32,
        /// Number of regions visited.
        regions: usize,
        /// Summed region counters.
        report: RegionReport,
    },
    /// Sea fell.
    Lowered {
        /// Level before the tick.
        from: i32,
        /// Level after the tick.
        to: i32,
        /// Number of regions visited.
        regions: usize,
        /// Summed region counters.
        report: RegionReport,
    },
}

impl TickOutcome {
    /// Level in effect after the tick, if the tick ran.
    #[must_use]
    pub const fn level(&self) -> Option<i32> {
        match self {
            Self::Skipped => None,
            Self::Unchanged { level } => Some(*level),
            Self::Raised { to, .. } | Self::Lowered { to, .. } => Some(*to),
        }
    }
}

/// Sea-level simulation for one world.
#[derive(Debug)]
pub struct SeaLevelEngine {
    world: WorldId,
    settings: SeaLevelSettings,
    state: SeaLevelState,
}

impl SeaLevelEngine {
    /// Creates an engine with a fresh state.
    #[must_use]
    pub fn new(world: WorldId, settings: SeaLevelSettings) -> Self {
        Self::with_state(world, settings, SeaLevelState::new())
    }

    /// Creates an engine around an existing state.
    #[must_use]
    pub fn with_state(world: WorldId, settings: SeaLevelSettings, state: SeaLevelState) -> Self {
        Self {
            world,
            settings,
            state,
        }
    }

    /// Creates an engine from raw config.
    ///
    /// # Errors
    ///
    /// Returns the config's validation error; the caller should leave the
    /// world without sea-level simulation.
    pub fn from_config(world: WorldId, config: &SeaLevelConfig) -> ConfigResult<Self> {
        Ok(Self::new(world, config.validate()?))
    }

    /// Creates an engine whose state is restored from `store`.
    ///
    /// Never fails: a missing or corrupt snapshot yields a fresh state.
    #[must_use]
    pub fn restore(world: WorldId, settings: SeaLevelSettings, store: &SnapshotStore) -> Self {
        Self::with_state(world, settings, store.restore_or_default())
    }

    /// Persists the current state.
    ///
    /// # Errors
    ///
    /// Returns the store's error; the in-memory state is unaffected.
    pub fn save(&self, store: &SnapshotStore) -> SnapshotResult<()> {
        store.save(&self.state)
    }

    /// World this engine simulates.
    #[must_use]
    pub const fn world(&self) -> WorldId {
        self.world
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SeaLevelState {
        &self.state
    }

    /// Runtime settings.
    #[must_use]
    pub const fn settings(&self) -> &SeaLevelSettings {
        &self.settings
    }

    /// Ticks between passes.
    #[must_use]
    pub const fn interval_ticks(&self) -> u32 {
        self.settings.interval_ticks
    }

    /// Changes the ticks between passes. The scheduler picks the new value
    /// up after its pending firing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroInterval`] for zero; the old interval stays.
    pub fn set_interval_ticks(&mut self, interval_ticks: u32) -> ConfigResult<()> {
        if interval_ticks == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if interval_ticks != self.settings.interval_ticks {
            info!(world = %self.world, interval_ticks, "sea-level interval changed");
            self.settings.interval_ticks = interval_ticks;
        }
        Ok(())
    }

    /// Target level for `signal`, once the baseline is known.
    #[must_use]
    pub fn target_level(&self, signal: f64) -> Option<i32> {
        self.state
            .default_level()
            .map(|base| self.settings.distribution.resolve(signal, base))
    }

    /// Runs one sea-level pass over every loaded region of `world`.
    pub fn tick<W: WorldView>(&mut self, world: &mut W, signal: f64) -> TickOutcome {
        if world.id() != self.world || !world.environment().has_sea() {
            return TickOutcome::Skipped;
        }

        let baseline = world.native_sea_level() - 1;
        if self.state.observe_baseline(baseline) {
            info!(world = %self.world, default_level = baseline, "default sea level");
        }

        let (Some(default_level), Some(current)) =
            (self.state.default_level(), self.state.current_level())
        else {
            return TickOutcome::Skipped;
        };

        let target = self.settings.distribution.resolve(signal, default_level);
        let direction = match target.cmp(&current) {
            Ordering::Greater => SeaChange::Up,
            Ordering::Less => SeaChange::Down,
            Ordering::Equal => {
                self.state.set_last_change(SeaChange::None);
                return TickOutcome::Unchanged { level: current };
            }
        };

        let regions = world.loaded_regions();
        let mut report = RegionReport::default();
        for key in &regions {
            if let Some(region) = world.region_mut(*key) {
                report.absorb(apply_region(region, direction, target, &mut self.state));
            }
        }

        // Published only now that every loaded region has been processed.
        self.state.commit_level(target, direction);

        info!(
            world = %self.world,
            direction = direction.name(),
            signal,
            from = current,
            to = target,
            default_level,
            regions = regions.len(),
            created = report.created(),
            removed = report.removed(),
            tracked = self.state.tracked().len(),
            "sea level changed"
        );

        let regions = regions.len();
        match direction {
            SeaChange::Up => TickOutcome::Raised {
                from: current,
                to: target,
                regions,
                report,
            },
            _ => TickOutcome::Lowered {
                from: current,
                to: target,
                regions,
                report,
            },
        }
    }

    /// A block was placed by hand at `cell`.
    pub fn on_block_placed(&mut self, cell: CellKey) -> bool {
        cell.world == self.world && reconcile::on_block_placed(&mut self.state, cell)
    }

    /// A bucket was emptied against `face` of `clicked`.
    pub fn on_bucket_emptied(&mut self, clicked: CellKey, face: BlockFace) -> bool {
        clicked.world == self.world && reconcile::on_bucket_emptied(&mut self.state, clicked, face)
    }

    /// Fluid is about to spread. The host must cancel the flow on
    /// [`FlowVerdict::Deny`].
    pub fn on_fluid_flow(&mut self, flow: FluidFlow) -> FlowVerdict {
        if flow.target.world != self.world {
            return FlowVerdict::Allow;
        }
        let verdict = reconcile::on_fluid_flow(&mut self.state, flow);
        if verdict.is_denied() {
            debug!(target_cell = %flow.target, "fluid flow vetoed while draining");
        }
        verdict
    }

    /// Routes any mutation event to its handler.
    pub fn handle(&mut self, event: MutationEvent) -> FlowVerdict {
        if event.world() != self.world {
            return FlowVerdict::Allow;
        }
        reconcile::reconcile(&mut self.state, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Distribution;
    use crate::material::Material;
    use crate::state::ChangeRecord;

    fn engine() -> SeaLevelEngine {
        let settings = SeaLevelSettings {
            distribution: Distribution::new(&[0.0, 10.0], &[0.0, 10.0]).unwrap(),
            interval_ticks: 20,
        };
        let mut state = SeaLevelState::new();
        state.observe_baseline(62);
        state.tracked_mut().insert(ChangeRecord::new(
            CellKey::new(WorldId(1), 0, 63, 0),
            Material::AIR,
            Material::WATER,
        ));
        SeaLevelEngine::with_state(WorldId(1), settings, state)
    }

    #[test]
    fn test_events_for_other_worlds_are_ignored() {
        let mut engine = engine();

        assert!(!engine.on_block_placed(CellKey::new(WorldId(2), 0, 63, 0)));
        assert_eq!(engine.state().tracked().len(), 1);
        assert!(engine.on_block_placed(CellKey::new(WorldId(1), 0, 63, 0)));
        assert!(engine.state().tracked().is_empty());
    }

    #[test]
    fn test_bucket_at_coordinate_edge_is_allowed() {
        let mut engine = engine();
        let event = MutationEvent::BucketEmptied {
            clicked: CellKey::new(WorldId(1), i32::MAX, 63, 0),
            face: BlockFace::East,
        };

        assert_eq!(engine.handle(event), FlowVerdict::Allow);
        assert!(!engine.on_bucket_emptied(
            CellKey::new(WorldId(1), 0, i32::MAX, 0),
            BlockFace::Up
        ));
        assert_eq!(engine.state().tracked().len(), 1);
    }

    #[test]
    fn test_interval_can_change_but_not_to_zero() {
        let mut engine = engine();

        engine.set_interval_ticks(5).unwrap();
        assert_eq!(engine.interval_ticks(), 5);
        assert!(matches!(engine.set_interval_ticks(0), Err(ConfigError::ZeroInterval)));
        assert_eq!(engine.interval_ticks(), 5);
    }

    #[test]
    fn test_target_level_needs_baseline() {
        let engine = engine();
        assert_eq!(engine.target_level(3.5), Some(65));

        let fresh = SeaLevelEngine::new(WorldId(1), engine.settings().clone());
        assert_eq!(fresh.target_level(3.5), None);
    }

    #[test]
    fn test_from_config_propagates_validation() {
        let result = SeaLevelEngine::from_config(WorldId(1), &SeaLevelConfig::default());
        assert!(result.is_err());
    }
}
