//! End-to-end test infrastructure for career-counsel.
//!
//! Provides a shared TestHarness and helper functions for E2E tests
//! covering the full classify-to-context pipeline.

use std::sync::Arc;
use std::sync::Once;

use counsel_embeddings::{Embedder, HashEmbedder};
use counsel_retrieval::{IntentClassifier, RetrievalOrchestrator};
use counsel_types::CollectionsConfig;
use counsel_vector::{payload_keys, FragmentPoint, InMemoryVectorStore, VectorSearch};

/// Vector dimension used across the E2E suite. Small enough to keep the
/// hash embedder fast, large enough to keep bucket collisions rare.
pub const TEST_DIMENSION: usize = 256;

static TRACING: Once = Once::new();

/// Install a test subscriber once per process; honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Shared test harness for E2E tests.
///
/// Provides an embedder, an in-memory vector store, and helper methods
/// for seeding profile and position collections.
pub struct TestHarness {
    pub embedder: Arc<HashEmbedder>,
    pub store: Arc<InMemoryVectorStore>,
    pub collections: CollectionsConfig,
}

impl TestHarness {
    /// Create a harness with empty collections.
    pub fn new() -> Self {
        init_tracing();
        Self {
            embedder: Arc::new(HashEmbedder::new(TEST_DIMENSION)),
            store: Arc::new(InMemoryVectorStore::new(TEST_DIMENSION)),
            collections: CollectionsConfig {
                profile_collection: "cv_fragments".to_string(),
                position_collection: "jd_documents".to_string(),
                vector_dimension: TEST_DIMENSION,
            },
        }
    }

    /// Build the orchestrator under test.
    pub fn orchestrator(&self) -> RetrievalOrchestrator {
        RetrievalOrchestrator::new(
            self.embedder.clone(),
            self.store.clone(),
            self.collections.clone(),
        )
    }

    /// Build the classifier under test.
    pub fn classifier(&self) -> IntentClassifier {
        IntentClassifier::new()
    }

    /// Seed latest profile fragments for one candidate.
    pub async fn seed_profile(&self, profile_id: &str, candidate_id: &str, texts: &[&str]) {
        let embeddings = self
            .embedder
            .embed_batch(texts)
            .expect("embed profile fragments");
        let points = texts
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (text, embedding))| {
                FragmentPoint::new(format!("{profile_id}-f{i}"), embedding)
                    .with_field(payload_keys::IS_LATEST, true)
                    .with_field(payload_keys::PROFILE_ID, profile_id)
                    .with_field(payload_keys::CANDIDATE_ID, candidate_id)
                    .with_field(payload_keys::TEXT, *text)
            })
            .collect();
        self.store
            .upsert(&self.collections.profile_collection, points)
            .await
            .expect("seed profile fragments");
    }

    /// Seed one latest position document.
    pub async fn seed_position(&self, position_id: &str, text: &str) {
        let point = FragmentPoint::new(
            position_id,
            self.embedder.embed(text).expect("embed position"),
        )
        .with_field(payload_keys::IS_LATEST, true)
        .with_field(payload_keys::POSITION_ID, position_id)
        .with_field(payload_keys::TEXT, text);
        self.store
            .upsert(&self.collections.position_collection, vec![point])
            .await
            .expect("seed position document");
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
