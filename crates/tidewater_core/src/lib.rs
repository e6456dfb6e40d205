//! # TIDEWATER Core
//!
//! Climate-driven sea level for persistent voxel worlds.
//!
//! ## Design Principles
//!
//! 1. **Reversible**: every cell the engine floods is tracked with its
//!    original material and restored exactly on drain
//! 2. **Idempotent**: repeating a pass with the same target changes nothing
//! 3. **Incremental**: bookkeeping is O(changed cells), never a world re-scan
//! 4. **Tolerant**: external edits are reconciled by cheap event handlers
//!
//! ## Core Components
//!
//! - `SeaLevelState`: tracked changes, default/current level, last direction
//! - `Distribution`: temperature -> level delta curve
//! - `apply_region`: flood/drain pass over one region
//! - `reconcile`: placement, bucket and fluid-flow handlers
//! - `SnapshotStore`: crash-safe persist/restore
//! - `SeaLevelEngine`: the per-world driver tying them together
//!
//! ## Example
//!
//! ```rust,ignore
//! use tidewater_core::{SeaLevelConfig, SeaLevelEngine, WorldId};
//!
//! let config = SeaLevelConfig::from_toml_str(text)?;
//! let mut engine = SeaLevelEngine::from_config(WorldId(1), &config)?;
//!
//! // Every `engine.interval_ticks()` ticks:
//! let outcome = engine.tick(&mut world, climate.temperature(WorldId(1)));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod applier;
pub mod cell;
pub mod config;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod host;
pub mod material;
pub mod reconcile;
pub mod snapshot;
pub mod state;

pub use applier::{apply_region, RegionReport};
pub use cell::{BlockFace, CellKey, RegionKey, WorldId, REGION_SIZE};
pub use config::{SeaLevelConfig, SeaLevelSettings};
pub use distribution::{Distribution, DistributionConfig};
pub use engine::{SeaLevelEngine, TickOutcome};
pub use error::{ConfigError, ConfigResult, SnapshotError, SnapshotResult, WriteRejected};
pub use host::{ClimateSource, Environment, RegionHandle, WorldView};
pub use material::Material;
pub use reconcile::{FlowVerdict, FluidFlow, MutationEvent};
pub use snapshot::SnapshotStore;
pub use state::{ChangeRecord, SeaChange, SeaLevelState, TrackedChanges};
