//! Error types for market data operations

use thiserror::Error;

/// Market data gateway errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// No data exists for the requested symbol
    #[error("No data for symbol: {0}")]
    NotFound(String),

    /// Rate limit exceeded for a provider
    #[error("Rate limit exceeded for {provider}")]
    RateLimited { provider: String },

    /// Provider unreachable or returned a non-success status
    #[error("{provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for market data operations
pub type Result<T> = std::result::Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::NotFound("INVALID".to_string());
        assert_eq!(err.to_string(), "No data for symbol: INVALID");

        let err = MarketError::Unavailable {
            provider: "Alpha Vantage".to_string(),
            reason: "HTTP 503".to_string(),
        };
        assert_eq!(err.to_string(), "Alpha Vantage unavailable: HTTP 503");
    }
}
