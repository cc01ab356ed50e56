//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur while building test fixtures
#[derive(Debug, Error)]
pub enum TestError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] bonelab_core::Error),

    /// Value comparison failed
    #[error(
        "value comparison failed at index {index}: expected {expected}, got {actual}, delta {delta}"
    )]
    ValueMismatch {
        index: usize,
        expected: f64,
        actual: f64,
        delta: f64,
    },

    /// Labelmap comparison failed
    #[error("labelmap comparison failed at index {index}")]
    LabelmapMismatch { index: usize },

    /// Regression test finished with failures
    #[error("{test_name}_reg failed with {count} failure(s)")]
    Failed { test_name: String, count: usize },
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
