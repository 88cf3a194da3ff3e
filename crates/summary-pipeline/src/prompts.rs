//! Prompt construction for the reasoning service

use summary_market::{CompanyOverview, NewsFeed, PricePoint};

/// Prompt for the synchronous news/sentiment condensation call
pub fn summarize_news(feed: &NewsFeed) -> String {
    format!(
        "summarize the following market news and sentiment about the following company from the Alpha Vantage API: {}",
        serde_json::to_string(feed).unwrap_or_default()
    )
}

/// Prompt for the asynchronous assessment job, combining the company
/// overview, the condensed news summary, and the current price
pub fn assess_stock(overview: &CompanyOverview, news_summary: &str, price: &PricePoint) -> String {
    format!(
        "Ticker: {}, General Information: {}, Current Price: {}, News and Sentiment: {}",
        overview.symbol,
        serde_json::to_string(overview).unwrap_or_default(),
        serde_json::to_string(price).unwrap_or_default(),
        news_summary
    )
}
