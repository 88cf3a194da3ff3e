//! Error types for pipeline coordination

use summary_market::MarketError;
use summary_reasoning::ReasoningError;
use summary_store::StoreError;
use thiserror::Error;

/// Per-item and dispatch-level pipeline errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Market data gateway failure
    #[error("Market data error: {0}")]
    Market(#[from] MarketError),

    /// Reasoning service failure (includes job timeout)
    #[error("Reasoning error: {0}")]
    Reasoning(#[from] ReasoningError),

    /// Result store failure (includes missing credentials)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Related-ticker lookup failed; recovered by degrading the batch to
    /// the original ticker, never surfaced to the caller
    #[error("Related lookup failed: {0}")]
    RelatedLookupFailed(String),

    /// Delivery sink failure
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Work item cancelled before reaching its own terminal state
    #[error("Work item cancelled")]
    Cancelled,

    /// Work item task aborted abnormally (panic or runtime shutdown)
    #[error("Work item aborted: {0}")]
    Aborted(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    /// Whether this error is a reasoning-job timeout
    pub fn is_job_timeout(&self) -> bool {
        matches!(
            self,
            AnalysisError::Reasoning(ReasoningError::JobTimedOut { .. })
        )
    }
}
