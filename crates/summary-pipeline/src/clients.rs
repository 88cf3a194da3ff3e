//! Per-dispatch client construction
//!
//! Upstream clients are keyed by per-requester credentials, so they are
//! built fresh for every dispatch and handed to the workers by parameter.
//! The factory is the seam that lets tests substitute doubles.

use crate::error::Result;
use std::sync::Arc;
use summary_core::UserCredentials;
use summary_market::{AlphaVantageClient, MarketData};
use summary_reasoning::{OpenAIReasoner, ReasonerConfig, ReasoningProvider};

/// Builds the per-dispatch market data and reasoning clients
pub trait ClientFactory: Send + Sync {
    /// Market data client authenticated with the requester's key
    fn market_data(&self, creds: &UserCredentials) -> Result<Arc<dyn MarketData>>;

    /// Reasoning client authenticated with the requester's key
    fn reasoning(&self, creds: &UserCredentials) -> Result<Arc<dyn ReasoningProvider>>;
}

/// Production factory: Alpha Vantage + OpenAI
pub struct DefaultClientFactory {
    /// Alpha Vantage requests per minute
    pub market_rate_limit: u32,

    /// Assistant id backing the assessment job
    pub assistant_id: String,
}

impl DefaultClientFactory {
    /// Create a factory with the free-tier market rate limit
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            market_rate_limit: 5,
            assistant_id: assistant_id.into(),
        }
    }
}

impl ClientFactory for DefaultClientFactory {
    fn market_data(&self, creds: &UserCredentials) -> Result<Arc<dyn MarketData>> {
        Ok(Arc::new(AlphaVantageClient::new(
            creds.market_data_key.clone(),
            self.market_rate_limit,
        )))
    }

    fn reasoning(&self, creds: &UserCredentials) -> Result<Arc<dyn ReasoningProvider>> {
        let config = ReasonerConfig::new(creds.reasoning_key.clone(), self.assistant_id.clone());
        Ok(Arc::new(OpenAIReasoner::new(config)?))
    }
}
