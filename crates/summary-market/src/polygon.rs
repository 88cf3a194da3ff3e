//! Polygon related-companies client

use crate::error::{MarketError, Result};
use crate::gateway::RelatedLookup;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;

const BASE_URL: &str = "https://api.polygon.io";
const PROVIDER: &str = "Polygon";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

#[derive(Debug, Deserialize)]
struct RelatedCompany {
    ticker: String,
}

#[derive(Debug, Deserialize)]
struct RelatedCompaniesResponse {
    #[serde(default)]
    results: Vec<RelatedCompany>,
}

/// Polygon client for related-company lookups
pub struct PolygonClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl PolygonClient {
    /// Create a new Polygon client with rate limiting
    ///
    /// # Arguments
    /// * `api_key` - Polygon API key
    /// * `rate_limit` - Requests per minute (free tier: 5)
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

    /// Create from environment variable POLYGON_API_KEY with default rate limit
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("POLYGON_API_KEY").map_err(|_| MarketError::Unavailable {
            provider: PROVIDER.to_string(),
            reason: "POLYGON_API_KEY environment variable not set".to_string(),
        })?;

        Ok(Self::new(api_key, 5))
    }
}

#[async_trait]
impl RelatedLookup for PolygonClient {
    async fn get_related_tickers(&self, ticker: &str) -> Result<Vec<String>> {
        self.rate_limiter.until_ready().await;

        let url = format!(
            "{}/v1/related-companies/{}?apiKey={}",
            BASE_URL, ticker, self.api_key
        );

        let response = self.client.get(&url).send().await?;

        if response.status().as_u16() == 429 {
            return Err(MarketError::RateLimited {
                provider: PROVIDER.to_string(),
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MarketError::Unavailable {
                provider: PROVIDER.to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let parsed: RelatedCompaniesResponse = response.json().await?;
        Ok(parsed.results.into_iter().map(|r| r.ticker).collect())
    }
}
