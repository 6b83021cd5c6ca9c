//! # counsel-types
//!
//! Shared types for the career-counsel retrieval core: the unified error
//! type and the service configuration (collection names, vector dimension,
//! classifier tuning knobs).

pub mod config;
pub mod error;

pub use config::{ClassifierSettings, CollectionsConfig, CounselConfig};
pub use error::CounselError;
