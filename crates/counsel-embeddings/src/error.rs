//! Embedding error types.

use thiserror::Error;

/// Errors that can occur during embedding operations.
///
/// An embedding failure is fatal for a retrieval call: without a query
/// vector nothing can be scored, so callers must be able to distinguish
/// "found nothing" from "could not even search."
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Model backend failure (inference, remote call)
    #[error("Model error: {0}")]
    Model(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
