//! # Server Error Types
//!
//! Startup failures. Per-world sea-level problems never reach this type:
//! they disable the world and are logged.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop the server from starting.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Config file could not be read.
    #[error("cannot read config {path}: {source}")]
    ReadConfig {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the server shape.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two worlds share an id.
    #[error("duplicate world id {0}")]
    DuplicateWorld(u64),

    /// Tick rate of zero.
    #[error("tick rate must be at least 1")]
    ZeroTickRate,
}

/// Result type for server startup.
pub type ServerResult<T> = Result<T, ServerError>;
