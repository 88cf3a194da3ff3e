//! Error types for reasoning operations

use std::time::Duration;
use thiserror::Error;

/// Reasoning service errors
#[derive(Debug, Error)]
pub enum ReasoningError {
    /// Service returned a non-success response
    #[error("Reasoning API error: {0}")]
    Api(String),

    /// Job reached a terminal failure state
    #[error("Reasoning job failed: {0}")]
    JobFailed(String),

    /// Job never reached a terminal state within the wait budget
    #[error("Reasoning job timed out after {waited:?}")]
    JobTimedOut { waited: Duration },

    /// Configuration value missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for reasoning operations
pub type Result<T> = std::result::Result<T, ReasoningError>;
