//! # counsel-embeddings
//!
//! Embedding types and the embedder boundary for the career-counsel
//! retrieval core.
//!
//! The production embedding model (a BGE-family sentence transformer) is
//! an external collaborator; this crate only defines the contract the
//! retrieval core consumes, plus a deterministic hashing embedder used by
//! tests and local development.

pub mod error;
pub mod hash;
pub mod model;

pub use error::EmbeddingError;
pub use hash::HashEmbedder;
pub use model::{Embedder, Embedding};
