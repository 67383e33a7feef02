//! Error types for the flat index

use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, FlatIndexError>;

/// Error types that can occur in index operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlatIndexError {
    #[error("Invalid dimension: {dimension} (must be at least 1)")]
    InvalidDimension { dimension: usize },

    #[error("Dimension mismatch at row {row}: expected {expected}, got {actual}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid k: {k} (must be at least 1)")]
    InvalidK { k: usize },

    #[error("Id {id} out of range for index of size {len}")]
    IdOutOfRange { id: usize, len: usize },

    #[error("Invalid vector: {reason}")]
    InvalidVector { reason: String },

    #[error("Invalid thread count: {threads} (must be at least 1)")]
    InvalidThreadCount { threads: usize },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("Search interrupted after {completed} queries")]
    Interrupted { completed: usize },
}
