//! # Sea-Level Configuration
//!
//! Per-world settings loaded once at startup from TOML:
//!
//! ```toml
//! enabled = true
//! queue_ticks = 200
//!
//! [distribution]
//! temperatures = [10.0, 14.0, 18.0, 22.0]
//! deltas       = [-2.0,  0.0,  3.0,  6.0]
//! ```
//!
//! A config without a valid distribution disables the subsystem for its
//! world; it is never fatal to the host.

use serde::{Deserialize, Serialize};

use crate::distribution::{Distribution, DistributionConfig};
use crate::error::{ConfigError, ConfigResult};

/// Raw per-world sea-level config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeaLevelConfig {
    /// Master switch for this world.
    pub enabled: bool,
    /// Ticks between sea-level passes.
    pub queue_ticks: u32,
    /// Temperature -> delta curve.
    pub distribution: Option<DistributionConfig>,
}

impl Default for SeaLevelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 10 seconds at 20 ticks per second
            queue_ticks: 200,
            distribution: None,
        }
    }
}

impl SeaLevelConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid TOML for
    /// this shape. Semantic checks happen in [`SeaLevelConfig::validate`].
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks the config and builds runtime settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Disabled`] if switched off,
    /// [`ConfigError::MissingDistribution`] without a curve,
    /// [`ConfigError::ZeroInterval`] for a zero interval, or the curve's own
    /// validation error.
    pub fn validate(&self) -> ConfigResult<SeaLevelSettings> {
        if !self.enabled {
            return Err(ConfigError::Disabled);
        }
        let curve = self
            .distribution
            .as_ref()
            .ok_or(ConfigError::MissingDistribution)?;
        if self.queue_ticks == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(SeaLevelSettings {
            distribution: Distribution::from_config(curve)?,
            interval_ticks: self.queue_ticks,
        })
    }
}

/// Validated settings an engine runs with.
#[derive(Clone, Debug, PartialEq)]
pub struct SeaLevelSettings {
    /// Temperature -> delta curve.
    pub distribution: Distribution,
    /// Ticks between sea-level passes.
    pub interval_ticks: u32,
}
