//! # Level Resolver
//!
//! Maps a climate signal (temperature) to a signed sea-level delta through a
//! configured curve, then to an absolute target level.
//!
//! The curve is piecewise-linear between control points and flat outside
//! them. A curve whose deltas never decrease therefore never lowers the
//! target when the signal rises.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Raw curve as written in config files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Control point temperatures, strictly increasing.
    pub temperatures: Vec<f64>,
    /// Sea-level delta at each temperature.
    pub deltas: Vec<f64>,
}

/// Validated signal -> delta curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution {
    /// `(temperature, delta)` pairs, sorted by temperature.
    points: Vec<(f64, f64)>,
}

impl Distribution {
    /// Builds a curve from parallel temperature/delta lists.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the lists are empty, differ in length,
    /// hold non-finite values or the temperatures do not strictly increase.
    pub fn new(temperatures: &[f64], deltas: &[f64]) -> ConfigResult<Self> {
        if temperatures.len() != deltas.len() {
            return Err(ConfigError::LengthMismatch {
                temperatures: temperatures.len(),
                deltas: deltas.len(),
            });
        }
        if temperatures.is_empty() {
            return Err(ConfigError::EmptyDistribution);
        }

        let mut points = Vec::with_capacity(temperatures.len());
        for (index, (&t, &d)) in temperatures.iter().zip(deltas).enumerate() {
            if !t.is_finite() || !d.is_finite() {
                return Err(ConfigError::NonFinite { index });
            }
            if let Some(&(previous, _)) = points.last() {
                if t <= previous {
                    return Err(ConfigError::NotIncreasing { index });
                }
            }
            points.push((t, d));
        }

        Ok(Self { points })
    }

    /// Builds a curve from its config form.
    ///
    /// # Errors
    ///
    /// Same as [`Distribution::new`].
    pub fn from_config(config: &DistributionConfig) -> ConfigResult<Self> {
        Self::new(&config.temperatures, &config.deltas)
    }

    /// Number of control points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: construction rejects empty curves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Interpolated delta at `signal`.
    ///
    /// Outside the configured range the nearest end point is used. A NaN
    /// signal reads as the coldest point.
    #[must_use]
    pub fn value(&self, signal: f64) -> f64 {
        let (Some(&(first_t, first_d)), Some(&(last_t, last_d))) =
            (self.points.first(), self.points.last())
        else {
            return 0.0;
        };

        if signal.is_nan() || signal <= first_t {
            return first_d;
        }
        if signal >= last_t {
            return last_d;
        }

        // first_t < signal < last_t, so 1 <= upper < len
        let upper = self.points.partition_point(|&(t, _)| t <= signal);
        let (t0, d0) = self.points[upper - 1];
        let (t1, d1) = self.points[upper];
        d0 + (d1 - d0) * ((signal - t0) / (t1 - t0))
    }

    /// Target absolute level for `signal` over `default_level`.
    ///
    /// The delta is truncated toward zero before it is added.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn resolve(&self, signal: f64, default_level: i32) -> i32 {
        default_level.saturating_add(self.value(signal).trunc() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> Distribution {
        Distribution::new(&[10.0, 14.0, 18.0, 22.0], &[-2.0, 0.0, 3.0, 6.0]).unwrap()
    }

    #[test]
    fn test_interpolates_between_points() {
        let d = curve();
        assert!((d.value(14.0) - 0.0).abs() < f64::EPSILON);
        assert!((d.value(16.0) - 1.5).abs() < 1e-9);
        assert!((d.value(20.0) - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_clamps_outside_range() {
        let d = curve();
        assert!((d.value(-40.0) + 2.0).abs() < f64::EPSILON);
        assert!((d.value(99.0) - 6.0).abs() < f64::EPSILON);
        assert!((d.value(f64::NAN) + 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolve_truncates_toward_zero() {
        let d = curve();
        assert_eq!(d.resolve(16.0, 62), 63); // +1.5
        assert_eq!(d.resolve(11.0, 62), 61); // -1.5
        assert_eq!(d.resolve(22.0, 62), 68);
    }

    #[test]
    fn test_resolve_is_monotone() {
        let d = curve();
        let mut previous = i32::MIN;
        let mut signal = 0.0;
        while signal < 30.0 {
            let level = d.resolve(signal, 62);
            assert!(level >= previous, "level dropped at signal {signal}");
            previous = level;
            signal += 0.05;
        }
    }

    #[test]
    fn test_single_point_is_constant() {
        let d = Distribution::new(&[15.0], &[3.0]).unwrap();
        assert_eq!(d.resolve(-10.0, 62), 65);
        assert_eq!(d.resolve(40.0, 62), 65);
    }

    #[test]
    fn test_rejects_invalid_curves() {
        assert_eq!(Distribution::new(&[], &[]), Err(ConfigError::EmptyDistribution));
        assert_eq!(
            Distribution::new(&[1.0, 2.0], &[0.0]),
            Err(ConfigError::LengthMismatch { temperatures: 2, deltas: 1 })
        );
        assert_eq!(
            Distribution::new(&[1.0, 1.0], &[0.0, 1.0]),
            Err(ConfigError::NotIncreasing { index: 1 })
        );
        assert_eq!(
            Distribution::new(&[1.0, f64::INFINITY], &[0.0, 1.0]),
            Err(ConfigError::NonFinite { index: 1 })
        );
    }
}
