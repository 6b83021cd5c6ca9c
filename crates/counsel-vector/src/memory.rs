//! In-memory reference implementation of the vector search capability.
//!
//! Brute-force cosine scan with payload filtering. Collections are
//! created implicitly on first upsert. Suitable for tests, local
//! development, and small corpora; the production deployment swaps in a
//! real vector database behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use counsel_embeddings::Embedding;

use crate::error::VectorError;
use crate::filter::Filter;
use crate::point::{CollectionInfo, FragmentPoint, ScoredFragment};
use crate::search::VectorSearch;

/// Thread-safe in-memory vector store.
pub struct InMemoryVectorStore {
    dimension: usize,
    collections: RwLock<HashMap<String, Vec<FragmentPoint>>>,
}

impl InMemoryVectorStore {
    /// Create a store for vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn check_dimension(&self, embedding: &Embedding) -> Result<(), VectorError> {
        if embedding.dimension() != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.dimension(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorSearch for InMemoryVectorStore {
    async fn upsert(
        &self,
        collection: &str,
        points: Vec<FragmentPoint>,
    ) -> Result<(), VectorError> {
        for point in &points {
            self.check_dimension(&point.embedding)?;
        }

        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection.to_string()).or_default();
        for point in points {
            // Replace on id collision, append otherwise
            match stored.iter_mut().find(|p| p.id == point.id) {
                Some(existing) => *existing = point,
                None => stored.push(point),
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
        score_threshold: f32,
        filter: Option<&Filter>,
    ) -> Result<Vec<ScoredFragment>, VectorError> {
        self.check_dimension(query)?;

        let collections = self.collections.read().await;
        let stored = collections
            .get(collection)
            .ok_or_else(|| VectorError::CollectionNotFound(collection.to_string()))?;

        let mut hits: Vec<ScoredFragment> = stored
            .iter()
            .filter(|p| filter.map(|f| f.evaluate(&p.payload)).unwrap_or(true))
            .map(|p| ScoredFragment {
                id: p.id.clone(),
                score: query.cosine_similarity(&p.embedding),
                payload: p.payload.clone(),
            })
            .filter(|hit| hit.score >= score_threshold)
            .collect();

        // Descending score; equal scores break ties by ascending id so
        // result order is deterministic.
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(limit);

        debug!(
            collection = collection,
            candidates = stored.len(),
            hits = hits.len(),
            threshold = score_threshold,
            "Vector search"
        );

        Ok(hits)
    }

    async fn delete_by_filter(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<usize, VectorError> {
        let mut collections = self.collections.write().await;
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| VectorError::CollectionNotFound(collection.to_string()))?;

        let before = stored.len();
        stored.retain(|p| !filter.evaluate(&p.payload));
        Ok(before - stored.len())
    }

    async fn collection_info(&self, collection: &str) -> Result<CollectionInfo, VectorError> {
        let collections = self.collections.read().await;
        let stored = collections
            .get(collection)
            .ok_or_else(|| VectorError::CollectionNotFound(collection.to_string()))?;

        Ok(CollectionInfo {
            name: collection.to_string(),
            points_count: stored.len(),
            dimension: self.dimension,
        })
    }
}
