//! # counsel-retrieval
//!
//! Query understanding and context retrieval for the career counseling
//! system.
//!
//! This crate implements the retrieval "brainstem" - the decision path
//! from a raw chat message to a bounded, scored context set: intent
//! classification, adaptive parameter selection, dual-collection search
//! orchestration, and result quality assessment.
//!
//! ## Core Concepts
//!
//! - **Intent**: What the user wants (JobSearch/PositionAnalysis/ProfileAnalysis/General)
//! - **Retrieval Params**: Result budgets and score thresholds adapted to the intent
//! - **Context Bundle**: Profile and position fragments plus per-call stats
//! - **Quality**: Good/Acceptable/Poor tier of a retrieved result set
//!
//! ## Usage
//!
//! ```rust,ignore
//! use counsel_retrieval::{IntentClassifier, RetrievalOrchestrator, RetrievalRequest};
//!
//! // 1. Classify the message
//! let classifier = IntentClassifier::new();
//! let classification = classifier.classify("Find suitable jobs for me");
//!
//! // 2. Retrieve context
//! let orchestrator = RetrievalOrchestrator::new(embedder, store, collections);
//! let request = RetrievalRequest::new("Find suitable jobs for me", classification.intent)
//!     .with_candidate("cand-42");
//! let bundle = orchestrator.retrieve(&request).await?;
//!
//! // 3. Inspect quality before composing a response
//! if bundle.stats.position.quality.quality == Quality::Poor {
//!     // relax filters or ask the user to elaborate
//! }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: Core types (Intent, RetrievalRequest, ContextBundle, stats)
//! - [`classifier`]: Two-stage bilingual intent classification
//! - [`params`]: Intent-adaptive budgets and thresholds
//! - [`orchestrator`]: Dual-collection search orchestration
//! - [`quality`]: Result-set quality assessment

pub mod classifier;
pub mod error;
pub mod orchestrator;
pub mod params;
pub mod quality;
pub mod types;

// Re-export main types at crate root
pub use classifier::{ClassifierConfig, IntentClassifier, PatternSpec, SignalSpec, TieBreakPolicy};
pub use error::RetrievalError;
pub use orchestrator::RetrievalOrchestrator;
pub use params::{select_params, SCOPED_THRESHOLD};
pub use quality::assess;
pub use types::{
    ClassificationResult, ContextBundle, Domain, Intent, Language, Quality, QualityReport,
    RetrievalParams, RetrievalRequest, RetrievalStats, SideStats,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::classifier::IntentClassifier;
    pub use crate::orchestrator::RetrievalOrchestrator;
    pub use crate::params::select_params;
    pub use crate::quality::assess;
    pub use crate::types::{
        ClassificationResult, ContextBundle, Intent, Quality, RetrievalParams, RetrievalRequest,
    };
}
