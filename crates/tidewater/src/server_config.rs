//! # Server Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file is a valid (if worldless) config.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tidewater_core::{Environment, SeaLevelConfig, WorldId};
use tidewater_world::ChunkGenerator;

use crate::climate::ScriptedClimate;
use crate::error::{ServerError, ServerResult};

/// Top-level server config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Directory holding one snapshot per world.
    pub snapshot_dir: PathBuf,
    /// Stop after this many ticks. 0 runs until stopped.
    pub run_ticks: u64,
    /// Climate signal shape.
    pub climate: ClimateConfig,
    /// Simulated worlds.
    pub worlds: Vec<WorldConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20,
            snapshot_dir: PathBuf::from("data/sea_level"),
            run_ticks: 0,
            climate: ClimateConfig::default(),
            worlds: Vec::new(),
        }
    }
}

/// Sinusoidal climate signal parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    /// Mean temperature.
    pub baseline: f64,
    /// Peak distance from the mean.
    pub amplitude: f64,
    /// Ticks per full cycle.
    pub period_ticks: u64,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            baseline: 14.0,
            amplitude: 4.0,
            // One in-game day at 20 ticks per second
            period_ticks: 24_000,
        }
    }
}

impl ClimateConfig {
    /// Builds the climate model.
    #[must_use]
    pub fn build(&self) -> ScriptedClimate {
        ScriptedClimate::new(self.baseline, self.amplitude, self.period_ticks)
    }
}

/// One world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Unique world id.
    pub id: u64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Terrain seed.
    #[serde(default)]
    pub seed: u64,
    /// Kind of world.
    #[serde(default)]
    pub environment: Environment,
    /// Sea level the terrain is generated with.
    #[serde(default = "default_sea_level")]
    pub native_sea_level: i32,
    /// Chunks loaded around the origin.
    #[serde(default = "default_view_radius")]
    pub view_radius: i32,
    /// Sea-level simulation settings.
    #[serde(default)]
    pub sea_level: SeaLevelConfig,
}

const fn default_sea_level() -> i32 {
    ChunkGenerator::DEFAULT_SEA_LEVEL
}

const fn default_view_radius() -> i32 {
    4
}

impl WorldConfig {
    /// Typed world id.
    #[must_use]
    pub const fn world_id(&self) -> WorldId {
        WorldId(self.id)
    }

    /// Terrain generator for this world.
    #[must_use]
    pub const fn generator(&self) -> ChunkGenerator {
        ChunkGenerator::rolling(self.seed).with_sea_level(self.native_sea_level)
    }
}

impl ServerConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidConfig`] for malformed TOML, or a
    /// validation error from [`ServerConfig::validate`].
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ServerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ReadConfig`] if the file cannot be read, or
    /// any error of [`ServerConfig::from_toml_str`].
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ServerError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks server-wide constraints. Sea-level settings are checked per
    /// world when the engine is built.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ZeroTickRate`] or
    /// [`ServerError::DuplicateWorld`].
    pub fn validate(&self) -> ServerResult<()> {
        if self.tick_rate == 0 {
            return Err(ServerError::ZeroTickRate);
        }
        let mut seen = HashSet::new();
        for world in &self.worlds {
            if !seen.insert(world.id) {
                return Err(ServerError::DuplicateWorld(world.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        tick_rate = 20
        snapshot_dir = "data/sea_level"
        run_ticks = 400

        [climate]
        baseline = 14.0
        amplitude = 4.0
        period_ticks = 24000

        [[worlds]]
        id = 1
        name = "overworld"
        seed = 42
        environment = "overworld"
        native_sea_level = 63
        view_radius = 2

        [worlds.sea_level]
        enabled = true
        queue_ticks = 200

        [worlds.sea_level.distribution]
        temperatures = [10.0, 14.0, 18.0, 22.0]
        deltas = [-2.0, 0.0, 3.0, 6.0]

        [[worlds]]
        id = 2
        name = "nether"
        environment = "nether"
    "#;

    #[test]
    fn test_parse_sample() {
        let config = ServerConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.tick_rate, 20);
        assert_eq!(config.run_ticks, 400);
        assert_eq!(config.worlds.len(), 2);

        let overworld = &config.worlds[0];
        assert_eq!(overworld.world_id(), WorldId(1));
        assert_eq!(overworld.view_radius, 2);
        assert_eq!(overworld.sea_level.queue_ticks, 200);
        assert!(overworld.sea_level.validate().is_ok());

        let nether = &config.worlds[1];
        assert_eq!(nether.environment, Environment::Nether);
        assert_eq!(nether.native_sea_level, 63);
        assert_eq!(nether.view_radius, 4);
        assert!(nether.sea_level.validate().is_err());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_duplicate_world_rejected() {
        let result = ServerConfig::from_toml_str(
            r"
            [[worlds]]
            id = 1
            [[worlds]]
            id = 1
            ",
        );
        assert!(matches!(result, Err(ServerError::DuplicateWorld(1))));
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let result = ServerConfig::from_toml_str("tick_rate = 0");
        assert!(matches!(result, Err(ServerError::ZeroTickRate)));
    }

    #[test]
    fn test_missing_file() {
        let result = ServerConfig::load(Path::new("/nonexistent/tidewater.toml"));
        assert!(matches!(result, Err(ServerError::ReadConfig { .. })));
    }
}
