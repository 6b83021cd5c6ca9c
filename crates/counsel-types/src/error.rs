//! Error types for the career-counsel system.

use thiserror::Error;

/// Unified error type for counsel operations.
#[derive(Debug, Error)]
pub enum CounselError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parse error
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Embedding error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector store error
    #[error("Vector store error: {0}")]
    Vector(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
