//! Bounded-concurrency parallel executor
//!
//! Runs an arbitrary-size work set under a fixed concurrency cap, isolating
//! per-item failure. Completion is signalled only after every item reaches a
//! terminal state; there is no ordering guarantee between items.

use crate::error::AnalysisError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use summary_core::WorkItem;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{info, warn};

/// Outcome of one executed batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Items that completed successfully
    pub succeeded: Vec<WorkItem>,

    /// Items that reached a terminal failure, with their errors
    pub failed: Vec<(WorkItem, AnalysisError)>,
}

impl BatchReport {
    /// Total number of items that reached a terminal state
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Handle to a batch running in the background.
///
/// Dropping the handle detaches the batch (it keeps running); `cancel`
/// aborts in-flight items cooperatively. Workers only ever persist a record
/// in a single write, so cancellation cannot corrupt persisted state.
#[derive(Debug)]
pub struct BatchHandle {
    handle: JoinHandle<BatchReport>,
}

impl BatchHandle {
    /// Abort all in-flight work items
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Whether the batch has reached its terminal state
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the batch to finish; `None` if it was cancelled
    pub async fn wait(self) -> Option<BatchReport> {
        self.handle.await.ok()
    }
}

/// Runs work items under a fixed concurrency cap
#[derive(Debug, Clone, Copy)]
pub struct ParallelExecutor {
    max_concurrency: usize,
}

impl ParallelExecutor {
    /// Create an executor with the given cap.
    ///
    /// The cap is a deliberate throttle against upstream API rate limits,
    /// not a performance ceiling.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Run every item to a terminal state, at most `max_concurrency` at once.
    ///
    /// One item's failure (error or panic) never cancels or blocks its
    /// siblings. Returns only after all items are terminal.
    pub async fn run<F, Fut>(&self, items: Vec<WorkItem>, task: F) -> BatchReport
    where
        F: Fn(WorkItem) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<(), AnalysisError>> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        let mut in_flight: HashMap<tokio::task::Id, WorkItem> = HashMap::new();

        let expected = items.len();
        info!(expected, cap = self.max_concurrency, "running batch");

        for item in items {
            let semaphore = Arc::clone(&semaphore);
            let task = task.clone();
            let spawned_item = item.clone();

            let abort = tasks.spawn(async move {
                // Queue until a slot frees; acquire fails only if the
                // semaphore is closed
                let permit = semaphore.acquire_owned().await;
                let result = match permit {
                    Ok(_permit) => task(spawned_item.clone()).await,
                    Err(_) => Err(AnalysisError::Cancelled),
                };
                (spawned_item, result)
            });
            in_flight.insert(abort.id(), item);
        }

        let mut report = BatchReport::default();

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, (item, Ok(())))) => {
                    in_flight.remove(&id);
                    report.succeeded.push(item);
                }
                Ok((id, (item, Err(error)))) => {
                    in_flight.remove(&id);
                    warn!(ticker = %item.ticker, %error, "work item failed");
                    report.failed.push((item, error));
                }
                Err(join_error) => {
                    // A panicked task still reaches a terminal state here
                    if let Some(item) = in_flight.remove(&join_error.id()) {
                        warn!(ticker = %item.ticker, %join_error, "work item panicked");
                        report
                            .failed
                            .push((item, AnalysisError::Aborted(join_error.to_string())));
                    }
                }
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "batch terminal"
        );
        report
    }

    /// Submit a batch and return immediately with a handle to it
    pub fn spawn<F, Fut>(&self, items: Vec<WorkItem>, task: F) -> BatchHandle
    where
        F: Fn(WorkItem) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<(), AnalysisError>> + Send + 'static,
    {
        let executor = *self;
        BatchHandle {
            handle: tokio::spawn(async move { executor.run(items, task).await }),
        }
    }
}
