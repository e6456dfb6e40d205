//! # Error Types
//!
//! All errors that can occur in the sea-level engine. None of them ever
//! reaches the host: config errors disable a world, snapshot errors fall back
//! to a fresh state, rejected writes are logged.

use std::path::PathBuf;

use thiserror::Error;

use crate::cell::CellKey;

/// Invalid or missing sea-level configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The config switched the subsystem off.
    #[error("sea level disabled by configuration")]
    Disabled,

    /// No distribution curve was configured.
    #[error("missing distribution curve")]
    MissingDistribution,

    /// The distribution curve has no control points.
    #[error("distribution curve is empty")]
    EmptyDistribution,

    /// Temperatures and deltas differ in length.
    #[error("distribution length mismatch: {temperatures} temperatures, {deltas} deltas")]
    LengthMismatch {
        /// Number of temperatures.
        temperatures: usize,
        /// Number of deltas.
        deltas: usize,
    },

    /// A control point is NaN or infinite.
    #[error("distribution point {index} is not finite")]
    NonFinite {
        /// Index of the offending point.
        index: usize,
    },

    /// Temperatures must strictly increase.
    #[error("distribution temperatures must strictly increase (at point {index})")]
    NotIncreasing {
        /// Index of the first out-of-order point.
        index: usize,
    },

    /// The tick interval is zero.
    #[error("queue-ticks must be at least 1")]
    ZeroInterval,

    /// The TOML document failed to parse.
    #[error("invalid configuration: {0}")]
    Parse(String),
}

/// Failure reading or writing a sea-level snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Underlying file I/O failed.
    #[error("snapshot i/o on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File does not start with the snapshot magic.
    #[error("not a sea-level snapshot (bad magic)")]
    BadMagic,

    /// Snapshot was written by an unknown format version.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    /// Payload checksum does not match.
    #[error("snapshot checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Checksum stored in the header.
        stored: u32,
        /// Checksum of the bytes on disk.
        computed: u32,
    },

    /// Payload failed to decompress.
    #[error("snapshot payload failed to decompress: {0}")]
    Decompress(String),

    /// Payload ended early or held an invalid tag.
    #[error("snapshot payload is truncated or malformed")]
    Malformed,
}

/// The host refused to write a cell.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("host rejected write at {cell}")]
pub struct WriteRejected {
    /// Cell that could not be written.
    pub cell: CellKey,
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
