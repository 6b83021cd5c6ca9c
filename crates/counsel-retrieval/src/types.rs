//! Core types for the retrieval policy engine.
//!
//! This module defines the fundamental types used throughout the core:
//! - `Intent` / `Domain`: classification of what the user is asking
//! - `ClassificationResult`: full classifier output with confidences
//! - `RetrievalParams`: result-count budgets and similarity thresholds
//! - `RetrievalRequest` / `ContextBundle`: orchestrator input and output
//! - `RetrievalStats` / `SideStats`: observability counters per side
//! - `Quality` / `QualityReport`: coarse retrieval-quality buckets

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// What kind of career question is being asked.
///
/// Determines which collections are searched and with what budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Find/compare/recommend positions, skill-gap-for-employability.
    /// Examples: "Find suitable jobs for me", "What skills am I missing?"
    /// Safest default for an ambiguous career query.
    #[default]
    JobSearch,

    /// Questions about a specific posting's requirements, compensation,
    /// process, or a candidate's fit against it.
    /// Examples: "Am I qualified for this position?", "What does it pay?"
    PositionAnalysis,

    /// Self-assessment against the candidate's own profile.
    /// Examples: "What Python skills do I have?", "Review my CV"
    ProfileAnalysis,

    /// Small talk, meta questions, off-topic. No retrieval performed.
    General,
}

impl Intent {
    /// Returns the display name for this intent.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::JobSearch => "job_search",
            Intent::PositionAnalysis => "position_analysis",
            Intent::ProfileAnalysis => "profile_analysis",
            Intent::General => "general",
        }
    }

    /// The three career sub-intents, in canonical tie-break order.
    pub const CAREER_INTENTS: [Intent; 3] = [
        Intent::JobSearch,
        Intent::PositionAnalysis,
        Intent::ProfileAnalysis,
    ];

    /// Whether this intent triggers any retrieval at all.
    pub fn requires_retrieval(&self) -> bool {
        !matches!(self, Intent::General)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse domain of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// On-topic: jobs, profiles, skills, hiring.
    Career,
    /// Chit-chat, meta questions, off-topic.
    General,
}

impl Domain {
    /// Returns the display name for this domain.
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Career => "career",
            Domain::General => "general",
        }
    }
}

/// Languages the pattern banks ship in.
///
/// Patterns are keyed by `(intent, language)` so adding a language never
/// touches the matching algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// English (primary)
    En,
    /// Vietnamese (secondary)
    Vi,
}

impl Language {
    /// Returns the BCP 47 tag for this language.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Vi => "vi",
        }
    }
}

/// Result of intent classification.
///
/// Created fresh per query and never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The classified intent
    pub intent: Intent,

    /// The classified domain
    pub domain: Domain,

    /// Final confidence: domain confidence times intent confidence (0.0-1.0)
    pub confidence: f32,

    /// Confidence of the domain stage alone (0.0-1.0)
    pub domain_confidence: f32,

    /// Pattern match counts per career intent (empty for general queries)
    pub intent_scores: HashMap<Intent, usize>,
}

/// Result-count budgets and similarity thresholds for one retrieval call.
///
/// Produced by the adaptive parameter selector; recorded verbatim in
/// `RetrievalStats` so the values actually used are observable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetrievalParams {
    /// Maximum profile fragments to retrieve
    pub profile_limit: usize,

    /// Maximum position fragments to retrieve
    pub position_limit: usize,

    /// Minimum similarity score on the profile side
    pub profile_threshold: f32,

    /// Minimum similarity score on the position side
    pub position_threshold: f32,
}

/// Input to the retrieval orchestrator.
#[derive(Debug, Clone, Default)]
pub struct RetrievalRequest {
    /// The user's query text
    pub query: String,

    /// Classified intent for this query
    pub intent: Intent,

    /// Candidate (user) identity, when known
    pub candidate_id: Option<String>,

    /// Specific profile (CV) id; wins over candidate identity
    pub profile_id: Option<String>,

    /// Specific position (job description) id
    pub position_id: Option<String>,
}

impl RetrievalRequest {
    /// Create a request from query and intent.
    pub fn new(query: impl Into<String>, intent: Intent) -> Self {
        Self {
            query: query.into(),
            intent,
            ..Default::default()
        }
    }

    /// Builder: set the candidate identity.
    pub fn with_candidate(mut self, candidate_id: impl Into<String>) -> Self {
        self.candidate_id = Some(candidate_id.into());
        self
    }

    /// Builder: set the profile id.
    pub fn with_profile(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }

    /// Builder: set the position id.
    pub fn with_position(mut self, position_id: impl Into<String>) -> Self {
        self.position_id = Some(position_id.into());
        self
    }

    /// Whether the profile side is narrowed by an identity filter.
    pub fn has_identity_scope(&self) -> bool {
        self.profile_id.is_some() || self.candidate_id.is_some()
    }

    /// Query length in whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.query.split_whitespace().count()
    }
}

/// Coarse retrieval-quality bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Best hit below the acceptable bar, or nothing retrieved
    Poor,
    /// Best hit clears the acceptable bar
    Acceptable,
    /// Best hit clears the good bar
    Good,
}

impl Quality {
    /// Returns the display name for this quality tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Good => "good",
            Quality::Acceptable => "acceptable",
            Quality::Poor => "poor",
        }
    }
}

/// Deterministic quality summary for one fragment sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// Quality tier
    pub quality: Quality,

    /// Highest similarity score in the sequence (0.0 when empty)
    pub max_score: f32,

    /// Mean similarity score (0.0 when empty)
    pub avg_score: f32,

    /// Number of fragments assessed
    pub count: usize,

    /// Human-readable diagnostic for the caller
    pub recommendation: String,
}

/// Per-side retrieval counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideStats {
    /// Fragments retrieved (always equals the sequence length)
    pub count: usize,

    /// Lowest score in the sequence (0.0 when empty)
    pub min_score: f32,

    /// Highest score in the sequence (0.0 when empty)
    pub max_score: f32,

    /// Quality summary for this side
    pub quality: QualityReport,
}

/// Observability record for one orchestrator call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalStats {
    /// Profile-side counters
    pub profile: SideStats,

    /// Position-side counters
    pub position: SideStats,

    /// Budgets and thresholds actually used
    pub params: RetrievalParams,

    /// Error marker for degraded calls (e.g. missing required identity)
    pub error: Option<String>,
}

/// Everything the response composer needs: both fragment sequences plus
/// the stats describing how they were obtained. Built once per query,
/// immutable, always present even when empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBundle {
    /// Candidate-profile fragments, best first
    pub profile_fragments: Vec<counsel_vector::ScoredFragment>,

    /// Position-description fragments, best first
    pub position_fragments: Vec<counsel_vector::ScoredFragment>,

    /// How retrieval went
    pub stats: RetrievalStats,
}

impl ContextBundle {
    /// Whether any context was retrieved at all.
    pub fn is_empty(&self) -> bool {
        self.profile_fragments.is_empty() && self.position_fragments.is_empty()
    }
}
