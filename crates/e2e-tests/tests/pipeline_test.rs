//! Full-pipeline E2E tests: classify a chat message, retrieve context,
//! and check the assembled bundle and its stats.

use pretty_assertions::assert_eq;

use counsel_embeddings::Embedder;
use counsel_retrieval::{Intent, Quality, RetrievalRequest};
use counsel_vector::{payload_keys, Filter, VectorSearch};
use e2e_tests::TestHarness;

async fn seeded_harness() -> TestHarness {
    let harness = TestHarness::new();
    harness
        .seed_profile(
            "cv-1",
            "cand-1",
            &[
                "python backend developer five years django experience",
                "skills python django postgresql",
                "led a team of four engineers on payments services",
            ],
        )
        .await;
    harness
        .seed_profile(
            "cv-2",
            "cand-2",
            &["junior graphic designer branding illustration portfolio"],
        )
        .await;
    harness
        .seed_position("jd-1", "python backend developer jobs django postgresql")
        .await;
    harness
        .seed_position("jd-2", "warehouse logistics coordinator night shift")
        .await;
    harness
}

#[tokio::test]
async fn test_job_search_pipeline() {
    let harness = seeded_harness().await;
    let classifier = harness.classifier();
    let orchestrator = harness.orchestrator();

    let query = "Find suitable jobs for a python backend developer";
    let classification = classifier.classify(query);
    assert_eq!(classification.intent, Intent::JobSearch);

    let request = RetrievalRequest::new(query, classification.intent).with_candidate("cand-1");
    let bundle = orchestrator.retrieve(&request).await.unwrap();

    // Both sides populated, best position is the matching posting.
    assert!(!bundle.profile_fragments.is_empty());
    assert!(!bundle.position_fragments.is_empty());
    assert_eq!(bundle.position_fragments[0].id, "jd-1");

    // The asker's context never includes another candidate's fragments.
    assert!(bundle
        .profile_fragments
        .iter()
        .all(|f| f.payload[payload_keys::CANDIDATE_ID] == "cand-1"));

    // Stats mirror the returned fragments.
    assert_eq!(bundle.stats.profile.count, bundle.profile_fragments.len());
    assert_eq!(bundle.stats.position.count, bundle.position_fragments.len());
    assert!(bundle.stats.error.is_none());
}

#[tokio::test]
async fn test_profile_analysis_pipeline() {
    let harness = seeded_harness().await;
    let classifier = harness.classifier();
    let orchestrator = harness.orchestrator();

    let query = "What Python skills do I have?";
    let classification = classifier.classify(query);
    assert_eq!(classification.intent, Intent::ProfileAnalysis);

    let request = RetrievalRequest::new(query, classification.intent).with_profile("cv-1");
    let bundle = orchestrator.retrieve(&request).await.unwrap();

    assert!(!bundle.profile_fragments.is_empty());
    assert!(bundle.position_fragments.is_empty());
    assert_eq!(bundle.stats.params.position_limit, 0);
}

#[tokio::test]
async fn test_position_match_pipeline() {
    let harness = seeded_harness().await;
    let classifier = harness.classifier();
    let orchestrator = harness.orchestrator();

    let query = "Am I qualified for this position?";
    let classification = classifier.classify(query);
    assert_eq!(classification.intent, Intent::PositionAnalysis);

    // The query shares almost no vocabulary with the warehouse posting;
    // the id filter, not similarity, must select it.
    let request = RetrievalRequest::new(query, classification.intent)
        .with_profile("cv-1")
        .with_position("jd-2");
    let bundle = orchestrator.retrieve(&request).await.unwrap();

    assert_eq!(bundle.position_fragments.len(), 1);
    assert_eq!(bundle.position_fragments[0].id, "jd-2");
    assert_eq!(bundle.stats.params.position_limit, 1);
    assert_eq!(bundle.stats.params.position_threshold, 0.0);
}

#[tokio::test]
async fn test_greeting_pipeline_touches_nothing() {
    let harness = seeded_harness().await;
    let classifier = harness.classifier();
    let orchestrator = harness.orchestrator();

    let classification = classifier.classify("Hello");
    assert_eq!(classification.intent, Intent::General);
    assert!(classification.confidence >= 0.9);

    let request = RetrievalRequest::new("Hello", classification.intent);
    let bundle = orchestrator.retrieve(&request).await.unwrap();

    assert!(bundle.is_empty());
    assert_eq!(bundle.stats.profile.quality.quality, Quality::Poor);
}

#[tokio::test]
async fn test_skill_filtered_retrieval() {
    let harness = seeded_harness().await;

    // Attach skill metadata to one candidate only.
    harness
        .store
        .upsert(
            "cv_fragments",
            vec![counsel_vector::FragmentPoint::new(
                "cv-1-skills",
                harness
                    .embedder
                    .embed("python django postgresql backend")
                    .unwrap(),
            )
            .with_field(payload_keys::IS_LATEST, true)
            .with_field(payload_keys::PROFILE_ID, "cv-1")
            .with_field(payload_keys::CANDIDATE_ID, "cand-1")
            .with_field(payload_keys::SKILLS, serde_json::json!(["python", "django"]))
            .with_field(payload_keys::SENIORITY_LEVEL, "senior")],
        )
        .await
        .unwrap();

    let orchestrator = harness.orchestrator();
    let bundle = orchestrator
        .retrieve_by_skills(&["python".to_string()], Some("senior"), 5)
        .await
        .unwrap();

    assert_eq!(bundle.profile_fragments.len(), 1);
    assert_eq!(bundle.profile_fragments[0].id, "cv-1-skills");
}

#[tokio::test]
async fn test_reembedding_retires_stale_versions() {
    let harness = seeded_harness().await;

    // A superseded fragment left behind by a previous embedding run.
    let stale = counsel_vector::FragmentPoint::new(
        "cv-1-old",
        harness
            .embedder
            .embed("python backend developer five years django experience")
            .unwrap(),
    )
    .with_field(payload_keys::IS_LATEST, false)
    .with_field(payload_keys::PROFILE_ID, "cv-1");
    harness.store.upsert("cv_fragments", vec![stale]).await.unwrap();

    // Retrieval never sees it.
    let orchestrator = harness.orchestrator();
    let request = RetrievalRequest::new(
        "what python experience do i have",
        Intent::ProfileAnalysis,
    )
    .with_profile("cv-1");
    let bundle = orchestrator.retrieve(&request).await.unwrap();
    assert!(bundle.profile_fragments.iter().all(|f| f.id != "cv-1-old"));

    // Ingestion cleanup removes exactly the retired version.
    let retired = Filter::new()
        .must_equal(payload_keys::PROFILE_ID, "cv-1")
        .must_equal(payload_keys::IS_LATEST, false);
    let removed = harness
        .store
        .delete_by_filter("cv_fragments", &retired)
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let info = harness.store.collection_info("cv_fragments").await.unwrap();
    assert_eq!(info.points_count, 4);
}
