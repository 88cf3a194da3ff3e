//! Market data gateway for the stock summary pipeline
//!
//! Typed client abstraction over the external company-overview,
//! news-sentiment, price, and related-ticker services. Pure
//! request/response, no state beyond rate limiting.

pub mod alpha_vantage;
pub mod error;
pub mod gateway;
pub mod polygon;

pub use alpha_vantage::AlphaVantageClient;
pub use error::{MarketError, Result};
pub use gateway::{
    CompanyOverview, FeedItem, MarketData, NewsFeed, PricePoint, RelatedLookup,
};
pub use polygon::PolygonClient;
