//! Error types for the activation pipeline.
//!
//! None of these abort activation: the activator converts them into
//! plugin-scoped outcomes (see [`SkipReason`](crate::outcome::SkipReason)).

use std::path::PathBuf;

use thiserror::Error;

/// Errors reading the enablement cache.
///
/// A missing cache file is *not* an error; readers report it as an empty
/// snapshot.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file exists but could not be read.
    #[error("failed to read plugin cache {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file could not be written.
    #[error("failed to write plugin cache {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file is not valid JSON.
    #[error("failed to parse plugin cache {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for cache reads.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors loading a provider unit file.
#[derive(Debug, Error)]
pub enum UnitError {
    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The unit is not valid JSON or has the wrong shape.
    #[error("invalid unit: {0}")]
    Parse(#[from] serde_json::Error),

    /// The unit names no class.
    #[error("unit does not declare a class")]
    MissingClass,
}
