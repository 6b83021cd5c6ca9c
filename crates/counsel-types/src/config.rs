//! Configuration for the career-counsel retrieval core.
//!
//! Collection names and classifier tuning knobs live here so deployments
//! can adjust them without code changes. All settings have defaults that
//! match the production corpus layout.

use serde::{Deserialize, Serialize};

use crate::error::CounselError;

/// Vector collection layout.
///
/// Two logical collections: candidate-profile fragments (section-level
/// chunks of a CV) and position descriptions (whole-document embeddings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsConfig {
    /// Collection holding candidate-profile fragments
    #[serde(default = "default_profile_collection")]
    pub profile_collection: String,

    /// Collection holding position descriptions
    #[serde(default = "default_position_collection")]
    pub position_collection: String,

    /// Embedding dimension both collections are created with
    #[serde(default = "default_vector_dimension")]
    pub vector_dimension: usize,
}

fn default_profile_collection() -> String {
    "cv_fragments".to_string()
}

fn default_position_collection() -> String {
    "jd_documents".to_string()
}

fn default_vector_dimension() -> usize {
    768
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            profile_collection: default_profile_collection(),
            position_collection: default_position_collection(),
            vector_dimension: default_vector_dimension(),
        }
    }
}

impl CollectionsConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.profile_collection.is_empty() || self.position_collection.is_empty() {
            return Err("collection names must be non-empty".to_string());
        }
        if self.profile_collection == self.position_collection {
            return Err("profile and position collections must differ".to_string());
        }
        if self.vector_dimension == 0 {
            return Err("vector_dimension must be > 0".to_string());
        }
        Ok(())
    }
}

/// Tunable boundaries for the intent classifier.
///
/// The word-count boundaries are heuristics, not derived constants; they
/// are exposed here so the tie-break behavior can be adjusted per
/// deployment instead of being baked into the matching code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Queries at or under this many words can be short-circuited to the
    /// general domain when a general-vocabulary token is present.
    #[serde(default = "default_general_max_words")]
    pub general_max_words: usize,

    /// Queries longer than this many words default to the career domain
    /// when no vocabulary signal fires.
    #[serde(default = "default_career_default_min_words")]
    pub career_default_min_words: usize,

    /// Tie-break boundary for the sub-intent fallback: queries under this
    /// many words resolve ties toward job search, longer ones toward
    /// position analysis.
    #[serde(default = "default_tie_break_short_words")]
    pub tie_break_short_words: usize,
}

fn default_general_max_words() -> usize {
    10
}

fn default_career_default_min_words() -> usize {
    5
}

fn default_tie_break_short_words() -> usize {
    8
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            general_max_words: default_general_max_words(),
            career_default_min_words: default_career_default_min_words(),
            tie_break_short_words: default_tie_break_short_words(),
        }
    }
}

impl ClassifierSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.general_max_words == 0 {
            return Err("general_max_words must be > 0".to_string());
        }
        if self.tie_break_short_words == 0 {
            return Err("tie_break_short_words must be > 0".to_string());
        }
        Ok(())
    }
}

/// Top-level configuration for the retrieval core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CounselConfig {
    /// Vector collection layout
    #[serde(default)]
    pub collections: CollectionsConfig,

    /// Classifier tuning
    #[serde(default)]
    pub classifier: ClassifierSettings,
}

impl CounselConfig {
    /// Parse configuration from a TOML document, filling in defaults for
    /// anything unspecified.
    pub fn from_toml_str(raw: &str) -> Result<Self, CounselError> {
        let config: CounselConfig = toml::from_str(raw)?;
        config
            .validate()
            .map_err(CounselError::Config)?;
        Ok(config)
    }

    /// Validate all sections.
    pub fn validate(&self) -> Result<(), String> {
        self.collections.validate()?;
        self.classifier.validate()?;
        Ok(())
    }
}
