//! Error types for bonelab-region

use thiserror::Error;

/// Errors that can occur during region processing operations
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] bonelab_core::Error),

    /// Invalid seed position
    #[error("invalid seed position: ({x}, {y}, {z})")]
    InvalidSeed { x: u32, y: u32, z: u32 },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
