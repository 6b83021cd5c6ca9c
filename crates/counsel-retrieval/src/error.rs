//! Retrieval error types.

use thiserror::Error;

use counsel_embeddings::EmbeddingError;

/// Errors that abort a retrieval call.
///
/// Only embedding failures are fatal: without a query vector nothing can
/// be scored, and the caller must be able to tell "found nothing" apart
/// from "could not search". A failed search on one side degrades to an
/// empty result for that side instead of surfacing here.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Query could not be embedded
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
}
