//! Deterministic hashing embedder.
//!
//! Stands in for the external sentence-transformer model in tests and
//! local development. Tokens are hashed into buckets of a fixed-size
//! vector, so texts sharing vocabulary land near each other while the
//! output stays deterministic across runs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::EmbeddingError;
use crate::model::{Embedder, Embedding};

/// Bag-of-hashed-tokens embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let h = hasher.finish();
        let index = (h % self.dimension as u64) as usize;
        // Sign bit from a different region of the hash so buckets
        // cancel rather than only accumulate.
        let sign = if (h >> 32) & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }

        let mut values = vec![0.0_f32; self.dimension];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let (index, sign) = self.bucket(token);
            values[index] += sign;
        }

        Ok(Embedding::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_for_identical_text() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("senior rust engineer").unwrap();
        let b = embedder.embed("senior rust engineer").unwrap();
        assert_eq!(a.values, b.values);
    }

    #[test]
    fn test_shared_vocabulary_scores_higher() {
        let embedder = HashEmbedder::new(256);
        let query = embedder.embed("python backend developer").unwrap();
        let close = embedder.embed("experienced python backend developer").unwrap();
        let far = embedder.embed("pastry chef apprentice").unwrap();
        assert!(query.cosine_similarity(&close) > query.cosine_similarity(&far));
    }

    #[test]
    fn test_embed_batch_matches_single_calls() {
        let embedder = HashEmbedder::new(64);
        let batch = embedder
            .embed_batch(&["python backend developer", "graphic designer"])
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch[0].values,
            embedder.embed("python backend developer").unwrap().values
        );
        assert_eq!(
            batch[1].values,
            embedder.embed("graphic designer").unwrap().values
        );
    }

    #[test]
    fn test_empty_text_rejected() {
        let embedder = HashEmbedder::default();
        assert!(embedder.embed("   ").is_err());
    }

    #[test]
    fn test_dimension_respected() {
        let embedder = HashEmbedder::new(32);
        let emb = embedder.embed("hello world").unwrap();
        assert_eq!(emb.dimension(), 32);
    }
}
