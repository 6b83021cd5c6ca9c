//! Retrieval orchestration.
//!
//! Turns a classified query into a bounded, scored context set: picks
//! budgets and thresholds, issues filtered similarity searches against
//! the profile and position collections, and assembles a `ContextBundle`
//! with quality-annotated stats.
//!
//! The embedder and vector store are injected by reference at
//! construction; both are read-only, thread-safe handles shared by all
//! concurrent query handlers. The profile- and position-side searches
//! have no data dependency on each other and are dispatched
//! concurrently. A failed search on one side degrades to an empty side
//! so a transient failure cannot discard the other side's results; only
//! an embedding failure aborts the call.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use counsel_embeddings::{Embedder, Embedding};
use counsel_types::CollectionsConfig;
use counsel_vector::{payload_keys, Filter, ScoredFragment, VectorSearch};

use crate::error::RetrievalError;
use crate::params::{select_params, SCOPED_THRESHOLD};
use crate::quality::assess;
use crate::types::{
    ContextBundle, Intent, RetrievalParams, RetrievalRequest, RetrievalStats, SideStats,
};

/// Position-side budget cap when position analysis degrades to a broad
/// search because no specific position was named.
const DEGRADED_POSITION_LIMIT: usize = 3;

/// Retrieval orchestrator over the embedding and vector-search
/// capabilities.
pub struct RetrievalOrchestrator {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorSearch>,
    collections: CollectionsConfig,
}

impl RetrievalOrchestrator {
    /// Create an orchestrator with injected capabilities.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorSearch>,
        collections: CollectionsConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            collections,
        }
    }

    /// Retrieve context for a classified query.
    ///
    /// Never fails for a valid intent except when the query cannot be
    /// embedded. Missing required identity is reported through the
    /// stats error marker, not an `Err`.
    pub async fn retrieve(
        &self,
        request: &RetrievalRequest,
    ) -> Result<ContextBundle, RetrievalError> {
        let word_count = request.word_count();
        let scoped = request.has_identity_scope();

        // General chit-chat gets no retrieved context at all; downstream
        // composition answers generically or asks a clarifying question.
        if !request.intent.requires_retrieval() {
            debug!(query = %request.query, "General intent - skipping retrieval");
            let params = select_params(Intent::General, word_count, false);
            return Ok(self.bundle(Vec::new(), Vec::new(), request.intent, params, None));
        }

        // One embedding per query; a failure here is fatal because
        // nothing can be scored without a query vector.
        let vector = self.embedder.embed(&request.query)?;

        let bundle = match request.intent {
            Intent::ProfileAnalysis => self.retrieve_profile_only(request, &vector).await,
            Intent::JobSearch => {
                let params = select_params(Intent::JobSearch, word_count, scoped);
                self.retrieve_dual(request, &vector, params).await
            }
            Intent::PositionAnalysis => match &request.position_id {
                Some(position_id) => {
                    self.retrieve_position_match(request, &vector, position_id)
                        .await
                }
                None => {
                    // No target posting named: degrade to the broad
                    // job-search pattern with a narrower position budget.
                    let mut params = select_params(Intent::JobSearch, word_count, scoped);
                    params.position_limit = params.position_limit.min(DEGRADED_POSITION_LIMIT);
                    self.retrieve_dual(request, &vector, params).await
                }
            },
            Intent::General => unreachable!("handled above"),
        };

        info!(
            intent = request.intent.as_str(),
            profile_count = bundle.stats.profile.count,
            position_count = bundle.stats.position.count,
            profile_quality = bundle.stats.profile.quality.quality.as_str(),
            position_quality = bundle.stats.position.quality.quality.as_str(),
            "Retrieval complete"
        );

        Ok(bundle)
    }

    /// Profile-fragment search by skill list.
    ///
    /// Membership match on the extracted skill metadata plus an optional
    /// seniority filter; the metadata already narrows the set, so the
    /// lowered scoped threshold applies.
    pub async fn retrieve_by_skills(
        &self,
        required_skills: &[String],
        seniority_level: Option<&str>,
        limit: usize,
    ) -> Result<ContextBundle, RetrievalError> {
        let params = RetrievalParams {
            profile_limit: limit,
            position_limit: 0,
            profile_threshold: SCOPED_THRESHOLD,
            position_threshold: SCOPED_THRESHOLD,
        };

        if required_skills.is_empty() {
            return Ok(self.bundle(
                Vec::new(),
                Vec::new(),
                Intent::ProfileAnalysis,
                params,
                Some("no skills given for skill-filtered search".to_string()),
            ));
        }

        let vector = self.embedder.embed(&required_skills.join(" "))?;

        let mut filter = Filter::new()
            .must_equal(payload_keys::IS_LATEST, true)
            .must_match_any(
                payload_keys::SKILLS,
                required_skills.iter().map(|s| Value::from(s.as_str())).collect(),
            );
        if let Some(level) = seniority_level {
            filter = filter.must_equal(payload_keys::SENIORITY_LEVEL, level);
        }

        let profile_hits = self
            .search_side(
                &self.collections.profile_collection,
                &vector,
                params.profile_limit,
                params.profile_threshold,
                &filter,
            )
            .await;

        Ok(self.bundle(profile_hits, Vec::new(), Intent::ProfileAnalysis, params, None))
    }

    /// ProfileAnalysis: profile side only, scoped to the requester's
    /// identity when known, corpus-wide otherwise.
    async fn retrieve_profile_only(
        &self,
        request: &RetrievalRequest,
        vector: &Embedding,
    ) -> ContextBundle {
        let params = select_params(
            Intent::ProfileAnalysis,
            request.word_count(),
            request.has_identity_scope(),
        );

        let profile_hits = self
            .search_side(
                &self.collections.profile_collection,
                vector,
                params.profile_limit,
                params.profile_threshold,
                &self.profile_filter(request),
            )
            .await;

        self.bundle(profile_hits, Vec::new(), Intent::ProfileAnalysis, params, None)
    }

    /// JobSearch pattern: contextual read of the asker's background plus
    /// a corpus-wide position search, dispatched concurrently.
    async fn retrieve_dual(
        &self,
        request: &RetrievalRequest,
        vector: &Embedding,
        params: RetrievalParams,
    ) -> ContextBundle {
        let position_filter = Filter::new().must_equal(payload_keys::IS_LATEST, true);
        let profile_filter = self.profile_filter(request);

        let (profile_hits, position_hits) = tokio::join!(
            self.search_side(
                &self.collections.profile_collection,
                vector,
                params.profile_limit,
                params.profile_threshold,
                &profile_filter,
            ),
            self.search_side(
                &self.collections.position_collection,
                vector,
                params.position_limit,
                params.position_threshold,
                &position_filter,
            ),
        );

        self.bundle(profile_hits, position_hits, request.intent, params, None)
    }

    /// PositionAnalysis against one specific posting: identity, not
    /// similarity, selects the position document.
    async fn retrieve_position_match(
        &self,
        request: &RetrievalRequest,
        vector: &Embedding,
        position_id: &str,
    ) -> ContextBundle {
        let mut params = select_params(Intent::PositionAnalysis, request.word_count(), true);
        // The specific document must come back regardless of its score.
        params.position_limit = 1;
        params.position_threshold = 0.0;

        let Some(profile_id) = &request.profile_id else {
            warn!(position_id, "Position match requested without a profile id");
            return self.bundle(
                Vec::new(),
                Vec::new(),
                Intent::PositionAnalysis,
                params,
                Some("missing profile_id for position match".to_string()),
            );
        };

        let profile_filter = Filter::new()
            .must_equal(payload_keys::IS_LATEST, true)
            .must_equal(payload_keys::PROFILE_ID, profile_id.as_str());
        let position_filter = Filter::new()
            .must_equal(payload_keys::IS_LATEST, true)
            .must_equal(payload_keys::POSITION_ID, position_id);

        let (profile_hits, position_hits) = tokio::join!(
            self.search_side(
                &self.collections.profile_collection,
                vector,
                params.profile_limit,
                params.profile_threshold,
                &profile_filter,
            ),
            self.search_side(
                &self.collections.position_collection,
                vector,
                params.position_limit,
                params.position_threshold,
                &position_filter,
            ),
        );

        self.bundle(profile_hits, position_hits, Intent::PositionAnalysis, params, None)
    }

    /// Latest-only profile filter, scoped to an explicit profile id when
    /// given, else the candidate identity, else corpus-wide.
    fn profile_filter(&self, request: &RetrievalRequest) -> Filter {
        let filter = Filter::new().must_equal(payload_keys::IS_LATEST, true);
        if let Some(profile_id) = &request.profile_id {
            filter.must_equal(payload_keys::PROFILE_ID, profile_id.as_str())
        } else if let Some(candidate_id) = &request.candidate_id {
            filter.must_equal(payload_keys::CANDIDATE_ID, candidate_id.as_str())
        } else {
            filter
        }
    }

    /// One side of the retrieval. Failures degrade to an empty side so
    /// a transient backend problem cannot discard the other side.
    async fn search_side(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
        threshold: f32,
        filter: &Filter,
    ) -> Vec<ScoredFragment> {
        if limit == 0 {
            return Vec::new();
        }
        match self
            .store
            .search(collection, query, limit, threshold, Some(filter))
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(collection, error = %e, "Search failed; returning empty side");
                Vec::new()
            }
        }
    }

    fn bundle(
        &self,
        profile_fragments: Vec<ScoredFragment>,
        position_fragments: Vec<ScoredFragment>,
        intent: Intent,
        params: RetrievalParams,
        error: Option<String>,
    ) -> ContextBundle {
        let stats = RetrievalStats {
            profile: side_stats(&profile_fragments, intent),
            position: side_stats(&position_fragments, intent),
            params,
            error,
        };
        ContextBundle {
            profile_fragments,
            position_fragments,
            stats,
        }
    }
}

fn side_stats(fragments: &[ScoredFragment], intent: Intent) -> SideStats {
    let (min_score, max_score) = score_range(fragments);
    SideStats {
        count: fragments.len(),
        min_score,
        max_score,
        quality: assess(fragments, intent),
    }
}

fn score_range(fragments: &[ScoredFragment]) -> (f32, f32) {
    if fragments.is_empty() {
        return (0.0, 0.0);
    }
    let min = fragments.iter().map(|f| f.score).fold(f32::MAX, f32::min);
    let max = fragments.iter().map(|f| f.score).fold(f32::MIN, f32::max);
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use counsel_embeddings::{EmbeddingError, HashEmbedder};
    use counsel_vector::{CollectionInfo, FragmentPoint, InMemoryVectorStore, VectorError};

    use crate::types::Quality;

    const DIM: usize = 256;

    fn collections() -> CollectionsConfig {
        CollectionsConfig {
            profile_collection: "profiles".to_string(),
            position_collection: "positions".to_string(),
            vector_dimension: DIM,
        }
    }

    async fn seeded_store(embedder: &HashEmbedder) -> InMemoryVectorStore {
        let store = InMemoryVectorStore::new(DIM);

        let profiles = vec![
            profile_point(embedder, "cv1-f1", "cv-1", "cand-1",
                "python backend developer with five years experience"),
            profile_point(embedder, "cv1-f2", "cv-1", "cand-1",
                "django rest framework and postgresql services"),
            profile_point(embedder, "cv2-f1", "cv-2", "cand-2",
                "graphic designer focused on branding and illustration"),
        ];
        store.upsert("profiles", profiles).await.unwrap();

        let positions = vec![
            position_point(embedder, "pos-1",
                "python backend developer position at fintech"),
            position_point(embedder, "pos-2",
                "senior accountant position finance ledger reporting"),
        ];
        store.upsert("positions", positions).await.unwrap();

        store
    }

    fn profile_point(
        embedder: &HashEmbedder,
        id: &str,
        profile_id: &str,
        candidate_id: &str,
        text: &str,
    ) -> FragmentPoint {
        FragmentPoint::new(id, embedder.embed(text).unwrap())
            .with_field(payload_keys::IS_LATEST, true)
            .with_field(payload_keys::PROFILE_ID, profile_id)
            .with_field(payload_keys::CANDIDATE_ID, candidate_id)
            .with_field(payload_keys::TEXT, text)
    }

    fn position_point(embedder: &HashEmbedder, id: &str, text: &str) -> FragmentPoint {
        FragmentPoint::new(id, embedder.embed(text).unwrap())
            .with_field(payload_keys::IS_LATEST, true)
            .with_field(payload_keys::POSITION_ID, id)
            .with_field(payload_keys::TEXT, text)
    }

    async fn orchestrator() -> RetrievalOrchestrator {
        let embedder = HashEmbedder::new(DIM);
        let store = seeded_store(&embedder).await;
        RetrievalOrchestrator::new(Arc::new(embedder), Arc::new(store), collections())
    }

    fn assert_stats_invariant(bundle: &ContextBundle) {
        assert_eq!(bundle.stats.profile.count, bundle.profile_fragments.len());
        assert_eq!(bundle.stats.position.count, bundle.position_fragments.len());
    }

    /// Store wrapper that fails one collection and counts search calls.
    struct FlakyStore {
        inner: InMemoryVectorStore,
        fail_collection: Option<String>,
        search_calls: AtomicUsize,
    }

    #[async_trait]
    impl VectorSearch for FlakyStore {
        async fn upsert(
            &self,
            collection: &str,
            points: Vec<FragmentPoint>,
        ) -> Result<(), VectorError> {
            self.inner.upsert(collection, points).await
        }

        async fn search(
            &self,
            collection: &str,
            query: &counsel_embeddings::Embedding,
            limit: usize,
            score_threshold: f32,
            filter: Option<&Filter>,
        ) -> Result<Vec<ScoredFragment>, VectorError> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_collection.as_deref() == Some(collection) {
                return Err(VectorError::Backend("connection refused".to_string()));
            }
            self.inner
                .search(collection, query, limit, score_threshold, filter)
                .await
        }

        async fn delete_by_filter(
            &self,
            collection: &str,
            filter: &Filter,
        ) -> Result<usize, VectorError> {
            self.inner.delete_by_filter(collection, filter).await
        }

        async fn collection_info(&self, collection: &str) -> Result<CollectionInfo, VectorError> {
            self.inner.collection_info(collection).await
        }
    }

    /// Embedder that always fails.
    struct BrokenEmbedder;

    impl Embedder for BrokenEmbedder {
        fn dimension(&self) -> usize {
            DIM
        }
        fn embed(&self, _text: &str) -> Result<counsel_embeddings::Embedding, EmbeddingError> {
            Err(EmbeddingError::Model("model unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_general_issues_no_search() {
        let embedder = HashEmbedder::new(DIM);
        let store = Arc::new(FlakyStore {
            inner: seeded_store(&embedder).await,
            fail_collection: None,
            search_calls: AtomicUsize::new(0),
        });
        let orchestrator =
            RetrievalOrchestrator::new(Arc::new(embedder), store.clone(), collections());

        let request = RetrievalRequest::new("Hello", Intent::General);
        let bundle = orchestrator.retrieve(&request).await.unwrap();

        assert!(bundle.is_empty());
        assert_eq!(bundle.stats.profile.count, 0);
        assert_eq!(bundle.stats.position.count, 0);
        assert_eq!(bundle.stats.profile.quality.quality, Quality::Poor);
        assert_eq!(store.search_calls.load(Ordering::SeqCst), 0);
        assert_stats_invariant(&bundle);
    }

    #[tokio::test]
    async fn test_general_never_embeds() {
        // A broken embedder proves the general path never embeds.
        let store = InMemoryVectorStore::new(DIM);
        let orchestrator =
            RetrievalOrchestrator::new(Arc::new(BrokenEmbedder), Arc::new(store), collections());

        let request = RetrievalRequest::new("Hello", Intent::General);
        assert!(orchestrator.retrieve(&request).await.is_ok());
    }

    #[tokio::test]
    async fn test_profile_analysis_searches_only_profiles() {
        let orchestrator = orchestrator().await;
        let request = RetrievalRequest::new(
            "what python backend experience do i have",
            Intent::ProfileAnalysis,
        )
        .with_candidate("cand-1");

        let bundle = orchestrator.retrieve(&request).await.unwrap();

        assert!(!bundle.profile_fragments.is_empty());
        assert!(bundle.position_fragments.is_empty());
        // Candidate scope keeps the other candidate's fragments out.
        assert!(bundle
            .profile_fragments
            .iter()
            .all(|f| f.payload[payload_keys::CANDIDATE_ID] == "cand-1"));
        assert!((bundle.stats.params.profile_threshold - 0.30).abs() < f32::EPSILON);
        assert_stats_invariant(&bundle);
    }

    #[tokio::test]
    async fn test_job_search_returns_both_sides() {
        let orchestrator = orchestrator().await;
        let request = RetrievalRequest::new("python backend developer jobs", Intent::JobSearch)
            .with_profile("cv-1");

        let bundle = orchestrator.retrieve(&request).await.unwrap();

        assert!(!bundle.profile_fragments.is_empty());
        assert!(!bundle.position_fragments.is_empty());
        // Profile side scoped (0.30), position side broad (0.50).
        assert!((bundle.stats.params.profile_threshold - 0.30).abs() < f32::EPSILON);
        assert!((bundle.stats.params.position_threshold - 0.50).abs() < f32::EPSILON);
        // Best position hit is the matching posting, not the accountant.
        assert_eq!(bundle.position_fragments[0].id, "pos-1");
        assert_stats_invariant(&bundle);
    }

    #[tokio::test]
    async fn test_job_search_without_identity_is_corpus_wide() {
        let orchestrator = orchestrator().await;
        let request = RetrievalRequest::new("python backend developer jobs", Intent::JobSearch);

        let bundle = orchestrator.retrieve(&request).await.unwrap();

        // Broad fallback: still searches, stricter profile threshold.
        assert!((bundle.stats.params.profile_threshold - 0.50).abs() < f32::EPSILON);
        assert!(!bundle.position_fragments.is_empty());
        assert_stats_invariant(&bundle);
    }

    #[tokio::test]
    async fn test_position_match_pins_the_target_document() {
        let orchestrator = orchestrator().await;
        // The accountant posting shares almost no vocabulary with the
        // query; identity, not similarity, must select it.
        let request = RetrievalRequest::new("Am I qualified for this position?", Intent::PositionAnalysis)
            .with_profile("cv-1")
            .with_position("pos-2");

        let bundle = orchestrator.retrieve(&request).await.unwrap();

        assert_eq!(bundle.position_fragments.len(), 1);
        assert_eq!(bundle.position_fragments[0].id, "pos-2");
        assert_eq!(bundle.stats.params.position_limit, 1);
        assert_eq!(bundle.stats.params.position_threshold, 0.0);
        assert!((bundle.stats.params.profile_threshold - 0.30).abs() < f32::EPSILON);
        assert!(bundle.stats.error.is_none());
        assert_stats_invariant(&bundle);
    }

    #[tokio::test]
    async fn test_position_match_missing_profile_id_marks_error() {
        let orchestrator = orchestrator().await;
        let request = RetrievalRequest::new("Am I qualified?", Intent::PositionAnalysis)
            .with_position("pos-1");

        let bundle = orchestrator.retrieve(&request).await.unwrap();

        assert!(bundle.is_empty());
        assert!(bundle.stats.error.is_some());
        assert_stats_invariant(&bundle);
    }

    #[tokio::test]
    async fn test_position_analysis_without_target_degrades_to_broad() {
        let orchestrator = orchestrator().await;
        let request = RetrievalRequest::new(
            "what are the requirements for python backend developer positions",
            Intent::PositionAnalysis,
        )
        .with_profile("cv-1");

        let bundle = orchestrator.retrieve(&request).await.unwrap();

        // Job-search pattern with the position budget capped at 3 and
        // the corpus-wide job-search bar on the position side.
        assert_eq!(bundle.stats.params.position_limit, 3);
        assert!((bundle.stats.params.position_threshold - 0.50).abs() < f32::EPSILON);
        assert!((bundle.stats.params.profile_threshold - 0.30).abs() < f32::EPSILON);
        assert!(bundle.stats.error.is_none());
        assert_stats_invariant(&bundle);
    }

    #[tokio::test]
    async fn test_position_side_failure_preserves_profile_results() {
        let embedder = HashEmbedder::new(DIM);
        let store = Arc::new(FlakyStore {
            inner: seeded_store(&embedder).await,
            fail_collection: Some("positions".to_string()),
            search_calls: AtomicUsize::new(0),
        });
        let orchestrator = RetrievalOrchestrator::new(Arc::new(embedder), store, collections());

        let request = RetrievalRequest::new("python backend developer jobs", Intent::JobSearch)
            .with_candidate("cand-1");
        let bundle = orchestrator.retrieve(&request).await.unwrap();

        // Soft failure: position side empty, profile side intact.
        assert!(!bundle.profile_fragments.is_empty());
        assert!(bundle.position_fragments.is_empty());
        assert_eq!(bundle.stats.position.quality.quality, Quality::Poor);
        assert_stats_invariant(&bundle);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_fatal() {
        let store = InMemoryVectorStore::new(DIM);
        let orchestrator =
            RetrievalOrchestrator::new(Arc::new(BrokenEmbedder), Arc::new(store), collections());

        let request = RetrievalRequest::new("find jobs for me", Intent::JobSearch);
        let result = orchestrator.retrieve(&request).await;

        assert!(matches!(result, Err(RetrievalError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_retrieve_by_skills_filters_on_metadata() {
        let embedder = HashEmbedder::new(DIM);
        let store = InMemoryVectorStore::new(DIM);

        let skilled = profile_point(&embedder, "cv1-f1", "cv-1", "cand-1",
            "python and rust systems programming")
            .with_field(payload_keys::SKILLS, serde_json::json!(["python", "rust"]))
            .with_field(payload_keys::SENIORITY_LEVEL, "senior");
        let unskilled = profile_point(&embedder, "cv2-f1", "cv-2", "cand-2",
            "python scripting for marketing analytics")
            .with_field(payload_keys::SKILLS, serde_json::json!(["excel"]))
            .with_field(payload_keys::SENIORITY_LEVEL, "junior");
        store.upsert("profiles", vec![skilled, unskilled]).await.unwrap();

        let orchestrator =
            RetrievalOrchestrator::new(Arc::new(embedder), Arc::new(store), collections());

        let bundle = orchestrator
            .retrieve_by_skills(&["python".to_string(), "rust".to_string()], Some("senior"), 5)
            .await
            .unwrap();

        assert_eq!(bundle.profile_fragments.len(), 1);
        assert_eq!(bundle.profile_fragments[0].id, "cv1-f1");
        assert_stats_invariant(&bundle);
    }

    #[tokio::test]
    async fn test_retrieve_by_skills_empty_list_marks_error() {
        let orchestrator = orchestrator().await;
        let bundle = orchestrator.retrieve_by_skills(&[], None, 5).await.unwrap();

        assert!(bundle.is_empty());
        assert!(bundle.stats.error.is_some());
    }

    #[tokio::test]
    async fn test_stale_fragments_excluded_by_latest_filter() {
        let embedder = HashEmbedder::new(DIM);
        let store = seeded_store(&embedder).await;

        // An older re-embedding of cv-1 that must never be retrieved.
        let stale = FragmentPoint::new(
            "cv1-f1-old",
            embedder.embed("python backend developer with five years experience").unwrap(),
        )
        .with_field(payload_keys::IS_LATEST, false)
        .with_field(payload_keys::PROFILE_ID, "cv-1")
        .with_field(payload_keys::CANDIDATE_ID, "cand-1");
        store.upsert("profiles", vec![stale]).await.unwrap();

        let orchestrator =
            RetrievalOrchestrator::new(Arc::new(embedder), Arc::new(store), collections());
        let request = RetrievalRequest::new(
            "what python experience do i have",
            Intent::ProfileAnalysis,
        )
        .with_profile("cv-1");

        let bundle = orchestrator.retrieve(&request).await.unwrap();
        assert!(bundle.profile_fragments.iter().all(|f| f.id != "cv1-f1-old"));
    }
}
