//! Shared test doubles for the pipeline's collaborator seams

use crate::aggregator::Deliverable;
use crate::clients::ClientFactory;
use crate::delivery::DeliverySink;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use summary_core::UserCredentials;
use summary_market::{
    CompanyOverview, MarketData, MarketError, NewsFeed, PricePoint, RelatedLookup,
};
use summary_reasoning::{
    JobId, JobPoll, JobStatus, ReasoningProvider, Result as ReasoningResult,
};
use tokio::sync::Mutex;

/// Market gateway returning canned data, with optional per-ticker failures
#[derive(Default, Clone)]
pub struct StaticMarket {
    fail_tickers: HashSet<String>,
}

impl StaticMarket {
    pub fn failing_for<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fail_tickers: tickers.into_iter().map(Into::into).collect(),
        }
    }

    fn check(&self, ticker: &str) -> std::result::Result<(), MarketError> {
        if self.fail_tickers.contains(ticker) {
            return Err(MarketError::Unavailable {
                provider: "test".to_string(),
                reason: format!("scripted failure for {ticker}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MarketData for StaticMarket {
    async fn get_overview(
        &self,
        ticker: &str,
    ) -> std::result::Result<CompanyOverview, MarketError> {
        self.check(ticker)?;
        Ok(CompanyOverview {
            symbol: ticker.to_string(),
            name: format!("{ticker} Incorporated"),
            exchange: None,
            sector: Some("Technology".to_string()),
            industry: None,
            description: None,
            market_cap: Some("1000000000".to_string()),
            pe_ratio: Some("21.0".to_string()),
            forward_pe: None,
            dividend_yield: None,
            eps: Some("4.20".to_string()),
            analyst_target_price: None,
        })
    }

    async fn get_news_sentiment(
        &self,
        ticker: &str,
    ) -> std::result::Result<NewsFeed, MarketError> {
        self.check(ticker)?;
        Ok(NewsFeed {
            items: "1".to_string(),
            feed: vec![],
        })
    }

    async fn get_current_price(
        &self,
        ticker: &str,
    ) -> std::result::Result<PricePoint, MarketError> {
        self.check(ticker)?;
        Ok(PricePoint {
            date: "2025-01-03".to_string(),
            open: 100.0,
            high: 104.0,
            low: 99.0,
            close: 102.0,
            volume: 1_000_000,
        })
    }
}

/// Market gateway where every call fails
pub struct FailingMarket;

#[async_trait]
impl MarketData for FailingMarket {
    async fn get_overview(
        &self,
        ticker: &str,
    ) -> std::result::Result<CompanyOverview, MarketError> {
        Err(MarketError::NotFound(ticker.to_string()))
    }

    async fn get_news_sentiment(
        &self,
        ticker: &str,
    ) -> std::result::Result<NewsFeed, MarketError> {
        Err(MarketError::NotFound(ticker.to_string()))
    }

    async fn get_current_price(
        &self,
        ticker: &str,
    ) -> std::result::Result<PricePoint, MarketError> {
        Err(MarketError::NotFound(ticker.to_string()))
    }
}

/// Related-ticker lookup returning a fixed set
pub struct StaticRelated {
    tickers: Vec<String>,
}

impl StaticRelated {
    pub fn new(tickers: Vec<String>) -> Self {
        Self { tickers }
    }
}

#[async_trait]
impl RelatedLookup for StaticRelated {
    async fn get_related_tickers(
        &self,
        _ticker: &str,
    ) -> std::result::Result<Vec<String>, MarketError> {
        Ok(self.tickers.clone())
    }
}

/// Related-ticker lookup that always fails
pub struct FailingRelated;

#[async_trait]
impl RelatedLookup for FailingRelated {
    async fn get_related_tickers(
        &self,
        _ticker: &str,
    ) -> std::result::Result<Vec<String>, MarketError> {
        Err(MarketError::Unavailable {
            provider: "test".to_string(),
            reason: "scripted related-lookup failure".to_string(),
        })
    }
}

/// Reasoner whose jobs complete immediately with a fixed narrative
pub struct StaticReasoner {
    narrative: String,
}

impl StaticReasoner {
    pub fn new(narrative: impl Into<String>) -> Self {
        Self {
            narrative: narrative.into(),
        }
    }
}

#[async_trait]
impl ReasoningProvider for StaticReasoner {
    async fn summarize(&self, _prompt: &str) -> ReasoningResult<String> {
        Ok("condensed news summary".to_string())
    }

    async fn submit_job(&self, _prompt: &str) -> ReasoningResult<JobId> {
        Ok(JobId {
            thread_id: "thread_test".to_string(),
            run_id: "run_test".to_string(),
        })
    }

    async fn poll_job(&self, _job: &JobId) -> ReasoningResult<JobPoll> {
        Ok(JobPoll {
            status: JobStatus::Completed,
            result_text: Some(self.narrative.clone()),
        })
    }
}

/// Reasoner whose jobs never leave `Pending`
pub struct StuckReasoner;

#[async_trait]
impl ReasoningProvider for StuckReasoner {
    async fn summarize(&self, _prompt: &str) -> ReasoningResult<String> {
        Ok("condensed news summary".to_string())
    }

    async fn submit_job(&self, _prompt: &str) -> ReasoningResult<JobId> {
        Ok(JobId {
            thread_id: "thread_stuck".to_string(),
            run_id: "run_stuck".to_string(),
        })
    }

    async fn poll_job(&self, _job: &JobId) -> ReasoningResult<JobPoll> {
        Ok(JobPoll {
            status: JobStatus::Pending,
            result_text: None,
        })
    }
}

/// Factory handing out preconfigured doubles
pub struct TestClientFactory {
    market: Arc<dyn MarketData>,
    reasoning: Arc<dyn ReasoningProvider>,
}

impl TestClientFactory {
    /// Everything succeeds; jobs complete with the given narrative
    pub fn healthy(narrative: impl Into<String>) -> Self {
        Self {
            market: Arc::new(StaticMarket::default()),
            reasoning: Arc::new(StaticReasoner::new(narrative)),
        }
    }

    /// Custom market double, healthy reasoner
    pub fn with_market(market: StaticMarket, narrative: impl Into<String>) -> Self {
        Self {
            market: Arc::new(market),
            reasoning: Arc::new(StaticReasoner::new(narrative)),
        }
    }
}

impl ClientFactory for TestClientFactory {
    fn market_data(&self, _creds: &UserCredentials) -> Result<Arc<dyn MarketData>> {
        Ok(Arc::clone(&self.market))
    }

    fn reasoning(&self, _creds: &UserCredentials) -> Result<Arc<dyn ReasoningProvider>> {
        Ok(Arc::clone(&self.reasoning))
    }
}

/// Delivery sink capturing what was sent
#[derive(Default)]
pub struct RecordingSink {
    pub deliveries: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn send(&self, contact: &str, deliverable: &Deliverable) -> Result<()> {
        self.deliveries
            .lock()
            .await
            .push((contact.to_string(), deliverable.html.clone()));
        Ok(())
    }
}
