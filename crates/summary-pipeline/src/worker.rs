//! Per-ticker analysis worker
//!
//! Composes the market data gateway, the reasoning job client, and the
//! result store to produce and persist exactly one analysis record. Steps
//! are strictly sequential; any step's failure surfaces to the executor
//! without persisting a partial record, and nothing before the job poll is
//! retried automatically.

use crate::error::Result;
use crate::prompts;
use std::sync::Arc;
use summary_core::{AnalysisRecord, PipelineConfig, WorkItem};
use summary_market::MarketData;
use summary_reasoning::{await_job, ReasoningProvider};
use summary_store::AnalysisStore;
use tracing::{debug, info};

/// One ticker's unit of analysis work
pub struct AnalysisWorker {
    market: Arc<dyn MarketData>,
    reasoning: Arc<dyn ReasoningProvider>,
    store: Arc<dyn AnalysisStore>,
    config: PipelineConfig,
}

impl AnalysisWorker {
    /// Create a worker over clients constructed for this dispatch.
    ///
    /// Clients are passed by parameter, never captured from enclosing
    /// scope, so concurrent batches cannot alias each other's handles.
    pub fn new(
        market: Arc<dyn MarketData>,
        reasoning: Arc<dyn ReasoningProvider>,
        store: Arc<dyn AnalysisStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            market,
            reasoning,
            store,
            config,
        }
    }

    /// Analyze one ticker and persist the resulting record.
    ///
    /// Steps: fetch overview + news, condense the news, fetch the price,
    /// submit the assessment job and poll it to a terminal state under the
    /// configured deadline, then write the record in a single put.
    pub async fn analyze(&self, item: &WorkItem) -> Result<AnalysisRecord> {
        debug!(ticker = %item.ticker, correlation_id = %item.correlation_id, "analysis started");

        let overview = self.market.get_overview(&item.ticker).await?;
        let news = self.market.get_news_sentiment(&item.ticker).await?;

        let news_summary = self
            .reasoning
            .summarize(&prompts::summarize_news(&news))
            .await?;

        let price = self.market.get_current_price(&item.ticker).await?;

        let job = self
            .reasoning
            .submit_job(&prompts::assess_stock(&overview, &news_summary, &price))
            .await?;
        let narrative = await_job(
            self.reasoning.as_ref(),
            &job,
            self.config.poll_interval,
            self.config.max_job_wait,
        )
        .await?;

        let record = AnalysisRecord::new(&item.correlation_id, &item.ticker, narrative);
        self.store.put_record(&record).await?;

        info!(ticker = %item.ticker, id = %record.id, "analysis persisted");
        Ok(record)
    }
}
