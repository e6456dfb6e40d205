//! # TIDEWATER
//!
//! Headless server driving climate-based sea levels across voxel worlds.
//!
//! ## Key Components
//!
//! - `ClimateRegistry`: one locked engine handle per world
//! - `TickLoop` / `RepeatingTask`: wall-clock pacing and tick-count scheduling
//! - `ScriptedClimate`: deterministic temperature signal
//! - `TidewaterServer`: worlds + climate + registry, one tick at a time
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = ServerConfig::load(Path::new("config/tidewater.toml"))?;
//! let mut server = TidewaterServer::from_config(config)?;
//! while !server.finished() {
//!     server.tick();
//! }
//! server.shutdown();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod climate;
pub mod error;
pub mod registry;
pub mod scheduler;
pub mod server;
pub mod server_config;

pub use climate::ScriptedClimate;
pub use error::{ServerError, ServerResult};
pub use registry::{ClimateRegistry, EngineHandle};
pub use scheduler::{RepeatingTask, TickLoop, TickStats};
pub use server::TidewaterServer;
pub use server_config::{ClimateConfig, ServerConfig, WorldConfig};
