//! Error types for bonelab-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.

use thiserror::Error;

/// bonelab-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid grid dimensions
    #[error("invalid grid dimensions: {width}x{height}x{depth}")]
    InvalidDimension { width: u32, height: u32, depth: u32 },

    /// Invalid voxel spacing
    #[error("invalid spacing: {0} (must be finite and > 0)")]
    InvalidSpacing(f64),

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Voxel coordinate outside the grid
    #[error("voxel ({x}, {y}, {z}) is outside the grid")]
    OutOfGrid { x: i64, y: i64, z: i64 },

    /// Grid dimension mismatch
    #[error("dimension mismatch: expected {}x{}x{}, got {}x{}x{}",
        .expected.0, .expected.1, .expected.2, .actual.0, .actual.1, .actual.2)]
    DimensionMismatch {
        expected: (u32, u32, u32),
        actual: (u32, u32, u32),
    },

    /// Data buffer does not match the grid size
    #[error("data length {actual} doesn't match grid size {expected}")]
    DataLength { expected: usize, actual: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for bonelab-core operations
pub type Result<T> = std::result::Result<T, Error>;
