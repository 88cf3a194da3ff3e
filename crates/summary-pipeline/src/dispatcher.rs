//! Group dispatcher
//!
//! Resolves the work set for a request, mints the correlation id, and
//! submits the batch to the parallel executor. Dispatch is fire-and-forget:
//! the call returns as soon as the batch is submitted.

use crate::clients::ClientFactory;
use crate::error::{AnalysisError, Result};
use crate::executor::{BatchHandle, ParallelExecutor};
use crate::worker::AnalysisWorker;
use std::sync::Arc;
use summary_core::{PipelineConfig, WorkItem};
use summary_market::RelatedLookup;
use summary_store::AnalysisStore;
use tracing::{info, warn};
use uuid::Uuid;

/// A submitted batch: the minted correlation id plus a handle to the
/// running work. The id is usable immediately; the handle is optional
/// (await it, cancel it, or drop it to detach).
#[derive(Debug)]
pub struct Dispatch {
    /// Correlation id shared by every work item in the batch
    pub correlation_id: String,

    /// Handle to the in-flight batch
    pub batch: BatchHandle,
}

/// Resolves tickers and fans a request out into per-ticker workers
pub struct GroupDispatcher {
    related: Arc<dyn RelatedLookup>,
    store: Arc<dyn AnalysisStore>,
    clients: Arc<dyn ClientFactory>,
    config: PipelineConfig,
}

impl GroupDispatcher {
    /// Create a dispatcher over the given collaborators
    pub fn new(
        related: Arc<dyn RelatedLookup>,
        store: Arc<dyn AnalysisStore>,
        clients: Arc<dyn ClientFactory>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            related,
            store,
            clients,
            config,
        }
    }

    /// Dispatch one analysis request.
    ///
    /// Always includes the requested ticker. With `compare_with_related`,
    /// the related-ticker lookup widens the batch; if that lookup fails the
    /// dispatch degrades to the single original ticker rather than aborting
    /// (logged, never surfaced to the caller). Missing credentials abort
    /// the whole batch before any worker starts.
    pub async fn dispatch(
        &self,
        ticker: &str,
        compare_with_related: bool,
        requester_contact: &str,
    ) -> Result<Dispatch> {
        // No ticker can be analyzed without credentials, so fail fast
        let creds = self.store.credential_for_user(requester_contact).await?;

        let correlation_id = Uuid::new_v4().to_string();
        let ticker = ticker.to_uppercase();

        let mut tickers = vec![ticker.clone()];
        if compare_with_related {
            match self.related.get_related_tickers(&ticker).await {
                Ok(related) => {
                    for related_ticker in related {
                        let related_ticker = related_ticker.to_uppercase();
                        if !tickers.contains(&related_ticker) {
                            tickers.push(related_ticker);
                        }
                    }
                }
                Err(e) => {
                    // Degrade to the original ticker; the request still runs
                    let degraded = AnalysisError::RelatedLookupFailed(e.to_string());
                    warn!(%ticker, error = %degraded, "degrading batch to single ticker");
                }
            }
        }

        let items: Vec<WorkItem> = tickers
            .iter()
            .map(|t| WorkItem::new(t.clone(), correlation_id.clone(), requester_contact))
            .collect();

        self.store
            .init_batch(&correlation_id, items.len() as u32)
            .await?;

        let market = self.clients.market_data(&creds)?;
        let reasoning = self.clients.reasoning(&creds)?;
        let worker = Arc::new(AnalysisWorker::new(
            market,
            reasoning,
            Arc::clone(&self.store),
            self.config.clone(),
        ));

        info!(correlation_id = %correlation_id, items = items.len(), "dispatching batch");

        let store = Arc::clone(&self.store);
        let executor = ParallelExecutor::new(self.config.max_concurrency);
        let batch = executor.spawn(items, move |item| {
            let worker = Arc::clone(&worker);
            let store = Arc::clone(&store);
            async move {
                let result = worker.analyze(&item).await;
                let success = result.is_ok();
                // The counter covers failures too, so it always converges
                if let Err(e) = store.record_outcome(&item.correlation_id, success).await {
                    warn!(ticker = %item.ticker, error = %e, "failed to record batch outcome");
                }
                result.map(|_| ())
            }
        });

        Ok(Dispatch {
            correlation_id,
            batch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        FailingRelated, StaticMarket, StaticRelated, TestClientFactory,
    };
    use summary_core::{BatchState, UserCredentials};
    use summary_store::MemoryStore;

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_credentials(
                "user@example.com",
                UserCredentials {
                    market_data_key: "alpha-key".to_string(),
                    reasoning_key: "openai-key".to_string(),
                },
            )
            .await;
        store
    }

    fn dispatcher(
        related: Arc<dyn RelatedLookup>,
        store: Arc<MemoryStore>,
        factory: TestClientFactory,
    ) -> GroupDispatcher {
        GroupDispatcher::new(
            related,
            store as Arc<dyn AnalysisStore>,
            Arc::new(factory),
            PipelineConfig::builder()
                .poll_interval(std::time::Duration::from_millis(5))
                .max_job_wait(std::time::Duration::from_millis(50))
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_single_ticker_dispatch() {
        let store = seeded_store().await;
        let dispatcher = dispatcher(
            Arc::new(StaticRelated::new(vec![])),
            Arc::clone(&store),
            TestClientFactory::healthy("a narrative"),
        );

        let dispatch = dispatcher
            .dispatch("abc", false, "user@example.com")
            .await
            .unwrap();
        let report = dispatch.batch.wait().await.unwrap();

        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.succeeded[0].ticker, "ABC");

        let records = store
            .records_for_group(&dispatch.correlation_id)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ticker, "ABC");

        let status = store
            .batch_status(&dispatch.correlation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status.state, BatchState::Complete);
        assert_eq!(status.expected, 1);
    }

    #[tokio::test]
    async fn test_related_tickers_share_one_correlation_id() {
        let store = seeded_store().await;
        let dispatcher = dispatcher(
            Arc::new(StaticRelated::new(vec!["XYZ".to_string(), "DEF".to_string()])),
            Arc::clone(&store),
            TestClientFactory::healthy("a narrative"),
        );

        let dispatch = dispatcher
            .dispatch("ABC", true, "user@example.com")
            .await
            .unwrap();
        let report = dispatch.batch.wait().await.unwrap();
        assert_eq!(report.succeeded.len(), 3);

        let records = store
            .records_for_group(&dispatch.correlation_id)
            .await
            .unwrap();
        assert_eq!(records.len(), 3);

        let mut tickers: Vec<&str> = records.iter().map(|r| r.ticker.as_str()).collect();
        tickers.sort_unstable();
        assert_eq!(tickers, vec!["ABC", "DEF", "XYZ"]);
        assert!(records
            .iter()
            .all(|r| r.correlation_id == dispatch.correlation_id));
    }

    #[tokio::test]
    async fn test_related_lookup_failure_degrades_to_single_ticker() {
        let store = seeded_store().await;
        let dispatcher = dispatcher(
            Arc::new(FailingRelated),
            Arc::clone(&store),
            TestClientFactory::healthy("a narrative"),
        );

        // No error surfaces to the caller
        let dispatch = dispatcher
            .dispatch("ABC", true, "user@example.com")
            .await
            .unwrap();
        let report = dispatch.batch.wait().await.unwrap();

        assert_eq!(report.succeeded.len(), 1);
        let status = store
            .batch_status(&dispatch.correlation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status.expected, 1);
    }

    #[tokio::test]
    async fn test_duplicate_related_ticker_is_not_analyzed_twice() {
        let store = seeded_store().await;
        let dispatcher = dispatcher(
            Arc::new(StaticRelated::new(vec!["ABC".to_string(), "XYZ".to_string()])),
            Arc::clone(&store),
            TestClientFactory::healthy("a narrative"),
        );

        let dispatch = dispatcher
            .dispatch("ABC", true, "user@example.com")
            .await
            .unwrap();
        let report = dispatch.batch.wait().await.unwrap();
        assert_eq!(report.succeeded.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_credentials_aborts_before_any_worker() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = dispatcher(
            Arc::new(StaticRelated::new(vec![])),
            Arc::clone(&store),
            TestClientFactory::healthy("a narrative"),
        );

        let err = dispatcher
            .dispatch("ABC", false, "ghost@example.com")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Store(summary_store::StoreError::CredentialMissing(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_redispatch_is_not_deduplicated() {
        let store = seeded_store().await;
        let dispatcher = dispatcher(
            Arc::new(StaticRelated::new(vec![])),
            Arc::clone(&store),
            TestClientFactory::healthy("a narrative"),
        );

        let first = dispatcher
            .dispatch("ABC", false, "user@example.com")
            .await
            .unwrap();
        first.batch.wait().await.unwrap();

        let second = dispatcher
            .dispatch("ABC", false, "user@example.com")
            .await
            .unwrap();
        second.batch.wait().await.unwrap();

        assert_ne!(first.correlation_id, second.correlation_id);
        assert_eq!(
            store
                .records_for_group(&first.correlation_id)
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            store
                .records_for_group(&second.correlation_id)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_records_settle_after_fire_and_forget() {
        let store = seeded_store().await;
        let dispatcher = dispatcher(
            Arc::new(StaticRelated::new(vec![])),
            Arc::clone(&store),
            TestClientFactory::healthy("a narrative"),
        );

        // Drop the handle: the batch keeps running detached
        let correlation_id = dispatcher
            .dispatch("ABC", false, "user@example.com")
            .await
            .unwrap()
            .correlation_id;

        // Writes settle eventually; assert with polling, not immediately
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let records = store.records_for_group(&correlation_id).await.unwrap();
            if records.len() == 1 {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "records never settled"
            );
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_one_failing_item_does_not_block_siblings() {
        let store = seeded_store().await;
        let dispatcher = dispatcher(
            Arc::new(StaticRelated::new(vec!["XYZ".to_string(), "DEF".to_string()])),
            Arc::clone(&store),
            TestClientFactory::with_market(StaticMarket::failing_for(["XYZ"]), "a narrative"),
        );

        let dispatch = dispatcher
            .dispatch("ABC", true, "user@example.com")
            .await
            .unwrap();
        let report = dispatch.batch.wait().await.unwrap();

        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0.ticker, "XYZ");

        // The failed item persisted nothing; siblings persisted normally
        let records = store
            .records_for_group(&dispatch.correlation_id)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.ticker != "XYZ"));

        let status = store
            .batch_status(&dispatch.correlation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status.state, BatchState::PartiallyFailed);
        assert_eq!(status.completed, 2);
        assert_eq!(status.failed, 1);
    }
}
