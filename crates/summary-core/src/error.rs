//! Error types for summary-core

use thiserror::Error;

/// Result type alias for summary-core
pub type Result<T> = std::result::Result<T, CoreError>;

/// Error type for core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Configuration value missing or invalid
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
