//! Vector search capability trait.

use async_trait::async_trait;

use counsel_embeddings::Embedding;

use crate::error::VectorError;
use crate::filter::Filter;
use crate::point::{CollectionInfo, FragmentPoint, ScoredFragment};

/// Filtered cosine search over named collections.
///
/// Implementations must be thread-safe for concurrent use: the handle is
/// initialized once at process start and shared read-only by all query
/// handlers. Results are ordered by descending similarity; equal scores
/// are ordered by ascending id so result order is deterministic.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Insert or replace points in a collection.
    async fn upsert(
        &self,
        collection: &str,
        points: Vec<FragmentPoint>,
    ) -> Result<(), VectorError>;

    /// Search a collection for the nearest fragments to `query`.
    ///
    /// Only hits scoring at or above `score_threshold` and matching
    /// `filter` (when given) are returned, best first, at most `limit`.
    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
        score_threshold: f32,
        filter: Option<&Filter>,
    ) -> Result<Vec<ScoredFragment>, VectorError>;

    /// Delete all points matching a filter. Returns the number removed.
    ///
    /// Used by ingestion to retire superseded document versions after a
    /// re-embedding lands with `is_latest = true`.
    async fn delete_by_filter(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<usize, VectorError>;

    /// Summary information about a collection.
    async fn collection_info(&self, collection: &str) -> Result<CollectionInfo, VectorError>;
}
