//! Gateway traits and typed response data
//!
//! The traits are the seam between the pipeline and the external market
//! data services; workers and the dispatcher depend on these, not on the
//! concrete HTTP clients.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Company overview and fundamental data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyOverview {
    pub symbol: String,
    pub name: String,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    pub market_cap: Option<String>,
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<String>,
    #[serde(rename = "ForwardPE")]
    pub forward_pe: Option<String>,
    #[serde(rename = "DividendYield")]
    pub dividend_yield: Option<String>,
    #[serde(rename = "EPS")]
    pub eps: Option<String>,
    #[serde(rename = "AnalystTargetPrice")]
    pub analyst_target_price: Option<String>,
}

/// One article from the news and sentiment feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub time_published: String,
    #[serde(default)]
    pub overall_sentiment_score: f64,
    #[serde(default)]
    pub overall_sentiment_label: String,
}

/// News and sentiment feed for one ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsFeed {
    #[serde(default)]
    pub items: String,
    #[serde(default)]
    pub feed: Vec<FeedItem>,
}

/// Latest daily price bar for a ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Per-ticker market data operations used by the analysis worker
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetch company overview and fundamentals
    async fn get_overview(&self, ticker: &str) -> Result<CompanyOverview>;

    /// Fetch the news and sentiment feed
    async fn get_news_sentiment(&self, ticker: &str) -> Result<NewsFeed>;

    /// Fetch the latest daily price bar
    async fn get_current_price(&self, ticker: &str) -> Result<PricePoint>;
}

/// Related-company lookup used by the group dispatcher
#[async_trait]
pub trait RelatedLookup: Send + Sync {
    /// Tickers of companies related to the given one
    async fn get_related_tickers(&self, ticker: &str) -> Result<Vec<String>>;
}
