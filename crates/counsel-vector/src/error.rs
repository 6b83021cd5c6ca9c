//! Vector store error types.

use thiserror::Error;

/// Errors that can occur during vector store operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Collection does not exist
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Backend failure (connection, timeout, internal error)
    #[error("Vector backend error: {0}")]
    Backend(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
