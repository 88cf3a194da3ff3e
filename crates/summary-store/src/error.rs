//! Error types for store operations

use thiserror::Error;

/// Result store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store write or read failed
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Required credential absent for a requester
    #[error("No credentials for requester: {0}")]
    CredentialMissing(String),

    /// No batch was dispatched under this correlation id
    #[error("Unknown batch: {0}")]
    UnknownBatch(String),
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
