//! Fragment point and search result types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use counsel_embeddings::Embedding;

/// Well-known payload field names.
///
/// Re-embedding preserves history rather than overwriting, so every
/// point carries `is_latest`; identity-scoped searches constrain on the
/// id fields.
pub mod payload_keys {
    /// True only for the newest re-embedding of a document
    pub const IS_LATEST: &str = "is_latest";
    /// Profile (CV) document id
    pub const PROFILE_ID: &str = "profile_id";
    /// Candidate (user) id owning a profile
    pub const CANDIDATE_ID: &str = "candidate_id";
    /// Position (job description) document id
    pub const POSITION_ID: &str = "position_id";
    /// Skill list extracted from a profile fragment
    pub const SKILLS: &str = "skills";
    /// Seniority level extracted from a profile
    pub const SENIORITY_LEVEL: &str = "seniority_level";
    /// Raw fragment text
    pub const TEXT: &str = "text";
}

/// A point to upsert into a collection: id, vector, and free-form
/// payload metadata.
#[derive(Debug, Clone)]
pub struct FragmentPoint {
    /// Stable document-fragment identifier
    pub id: String,

    /// Embedding vector
    pub embedding: Embedding,

    /// Payload metadata + text
    pub payload: Map<String, Value>,
}

impl FragmentPoint {
    /// Create a point with an empty payload.
    pub fn new(id: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            id: id.into(),
            embedding,
            payload: Map::new(),
        }
    }

    /// Builder: set a payload field.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }
}

/// A single scored search hit.
///
/// Produced by the search capability; the retrieval core treats it as
/// read-only and preserves the order the capability returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredFragment {
    /// Fragment identifier
    pub id: String,

    /// Similarity score (0.0-1.0, higher = more similar)
    pub score: f32,

    /// Payload metadata + text
    pub payload: Map<String, Value>,
}

impl ScoredFragment {
    /// Fragment text, if the payload carries one.
    pub fn text(&self) -> Option<&str> {
        self.payload.get(payload_keys::TEXT).and_then(Value::as_str)
    }
}

/// Summary information about a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name
    pub name: String,

    /// Number of stored points
    pub points_count: usize,

    /// Embedding dimension
    pub dimension: usize,
}
