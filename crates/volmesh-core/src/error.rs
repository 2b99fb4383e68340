//! Error types for volmesh.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for volmesh operations.
#[derive(Error, Debug)]
pub enum VolmeshError {
    /// The input volume does not exist.
    #[error("input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The input volume exists but could not be decoded.
    #[error("unsupported volume format '{}': {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    /// Every sample of the volume has the same value, so it cannot be rescaled.
    #[error("degenerate volume: every sample equals {value}")]
    DegenerateVolume { value: f32 },

    /// A caller-supplied parameter is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing an output file failed.
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for volmesh operations.
pub type Result<T> = std::result::Result<T, VolmeshError>;
