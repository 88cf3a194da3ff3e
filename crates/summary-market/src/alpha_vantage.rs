//! Alpha Vantage API client

use crate::error::{MarketError, Result};
use crate::gateway::{CompanyOverview, MarketData, NewsFeed, PricePoint};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (default: 5 for free tier)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(5).unwrap()));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            rate_limiter,
        }
    }

    /// Create from environment variable ALPHA_VANTAGE_API_KEY with default rate limit
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ALPHA_VANTAGE_API_KEY").map_err(|_| {
            MarketError::Unavailable {
                provider: PROVIDER.to_string(),
                reason: "ALPHA_VANTAGE_API_KEY environment variable not set".to_string(),
            }
        })?;

        Ok(Self::new(api_key, 5)) // Default to free tier limit
    }

    /// Issue one query and apply Alpha Vantage's in-body error conventions
    async fn query(&self, params: HashMap<&str, &str>) -> Result<serde_json::Value> {
        self.rate_limiter.until_ready().await;

        let response = self.client.get(BASE_URL).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(MarketError::Unavailable {
                provider: PROVIDER.to_string(),
                reason: format!("HTTP error: {}", response.status()),
            });
        }

        let data: serde_json::Value = response.json().await?;

        // Alpha Vantage signals errors in a 200 body
        if let Some(error) = data.get("Error Message") {
            return Err(MarketError::Unavailable {
                provider: PROVIDER.to_string(),
                reason: error.to_string(),
            });
        }

        if data.get("Note").is_some() || data.get("Information").is_some() {
            return Err(MarketError::RateLimited {
                provider: PROVIDER.to_string(),
            });
        }

        Ok(data)
    }
}

#[async_trait]
impl MarketData for AlphaVantageClient {
    /// Get company overview and fundamental data
    async fn get_overview(&self, ticker: &str) -> Result<CompanyOverview> {
        let mut params = HashMap::new();
        params.insert("function", "OVERVIEW");
        params.insert("symbol", ticker);
        params.insert("apikey", self.api_key.as_str());

        let data = self.query(params).await?;

        // An empty object means the symbol is unknown
        if data.as_object().map(|o| o.is_empty()).unwrap_or(true) {
            return Err(MarketError::NotFound(ticker.to_string()));
        }

        let overview: CompanyOverview = serde_json::from_value(data)?;
        Ok(overview)
    }

    /// Get the news and sentiment feed
    async fn get_news_sentiment(&self, ticker: &str) -> Result<NewsFeed> {
        let mut params = HashMap::new();
        params.insert("function", "NEWS_SENTIMENT");
        params.insert("tickers", ticker);
        params.insert("apikey", self.api_key.as_str());

        let data = self.query(params).await?;

        if data.get("feed").is_none() {
            return Err(MarketError::NotFound(ticker.to_string()));
        }

        let feed: NewsFeed = serde_json::from_value(data)?;
        Ok(feed)
    }

    /// Get the latest daily price bar
    async fn get_current_price(&self, ticker: &str) -> Result<PricePoint> {
        let mut params = HashMap::new();
        params.insert("function", "TIME_SERIES_DAILY");
        params.insert("symbol", ticker);
        params.insert("apikey", self.api_key.as_str());

        let data = self.query(params).await?;

        let series = data
            .get("Time Series (Daily)")
            .and_then(|s| s.as_object())
            .ok_or_else(|| MarketError::NotFound(ticker.to_string()))?;

        // The series maps date -> bar, newest date first
        let (date, bar) = series
            .iter()
            .next()
            .ok_or_else(|| MarketError::NotFound(ticker.to_string()))?;

        Ok(PricePoint {
            date: date.clone(),
            open: parse_field(bar, "1. open"),
            high: parse_field(bar, "2. high"),
            low: parse_field(bar, "3. low"),
            close: parse_field(bar, "4. close"),
            volume: bar["5. volume"]
                .as_str()
                .unwrap_or("0")
                .parse()
                .unwrap_or(0),
        })
    }
}

fn parse_field(bar: &serde_json::Value, key: &str) -> f64 {
    bar[key].as_str().unwrap_or("0").parse().unwrap_or(0.0)
}
