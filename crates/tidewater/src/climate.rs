//! # Scripted Climate
//!
//! A deterministic temperature signal: a sine wave around a baseline, with
//! optional per-world overrides for tests and admin commands.

use std::collections::HashMap;
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tidewater_core::{ClimateSource, WorldId};

/// Sinusoidal climate model driven by the server tick.
#[derive(Debug)]
pub struct ScriptedClimate {
    baseline: f64,
    amplitude: f64,
    period_ticks: u64,
    tick: AtomicU64,
    overrides: RwLock<HashMap<WorldId, f64>>,
}

impl ScriptedClimate {
    /// Creates a climate oscillating `amplitude` around `baseline` once
    /// every `period_ticks`. A zero period holds the baseline.
    #[must_use]
    pub fn new(baseline: f64, amplitude: f64, period_ticks: u64) -> Self {
        Self {
            baseline,
            amplitude,
            period_ticks,
            tick: AtomicU64::new(0),
            overrides: RwLock::new(HashMap::new()),
        }
    }

    /// A climate that never changes.
    #[must_use]
    pub fn constant(temperature: f64) -> Self {
        Self::new(temperature, 0.0, 0)
    }

    /// Moves the model to `tick`.
    pub fn advance_to(&self, tick: u64) {
        self.tick.store(tick, Ordering::Relaxed);
    }

    /// Current model tick.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::Relaxed)
    }

    /// Pins a world to a fixed temperature.
    pub fn set_override(&self, world: WorldId, temperature: f64) {
        self.overrides.write().insert(world, temperature);
    }

    /// Removes a world's pinned temperature.
    pub fn clear_override(&self, world: WorldId) {
        self.overrides.write().remove(&world);
    }

    /// Temperature at `tick`, ignoring overrides.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample(&self, tick: u64) -> f64 {
        if self.period_ticks == 0 {
            return self.baseline;
        }
        let phase = (tick % self.period_ticks) as f64 / self.period_ticks as f64;
        self.baseline + self.amplitude * (phase * TAU).sin()
    }
}

impl ClimateSource for ScriptedClimate {
    fn temperature(&self, world: WorldId) -> f64 {
        if let Some(pinned) = self.overrides.read().get(&world) {
            return *pinned;
        }
        self.sample(self.tick())
    }
}
