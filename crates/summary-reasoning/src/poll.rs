//! Bounded polling of asynchronous reasoning jobs

use crate::error::{ReasoningError, Result};
use crate::provider::{JobStatus, JobId, ReasoningProvider};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Poll a job until it reaches a terminal state or the wait budget expires.
///
/// Checks are `poll_interval` apart against a monotonic deadline. A job
/// still pending once `max_wait` has elapsed fails with
/// [`ReasoningError::JobTimedOut`]; the upstream job itself is left to the
/// service's own garbage collection. Cancel-safe: no state is mutated
/// across await points.
pub async fn await_job(
    provider: &dyn ReasoningProvider,
    job: &JobId,
    poll_interval: Duration,
    max_wait: Duration,
) -> Result<String> {
    let started = Instant::now();
    let deadline = started + max_wait;

    loop {
        let poll = provider.poll_job(job).await?;

        match poll.status {
            JobStatus::Completed => {
                debug!(run_id = %job.run_id, elapsed = ?started.elapsed(), "reasoning job completed");
                return poll.result_text.ok_or_else(|| {
                    ReasoningError::JobFailed("completed job carried no text".to_string())
                });
            }
            JobStatus::Failed => {
                return Err(ReasoningError::JobFailed(format!(
                    "run {} reached a terminal failure state",
                    job.run_id
                )));
            }
            JobStatus::Pending => {
                let now = Instant::now();
                if now >= deadline {
                    warn!(run_id = %job.run_id, waited = ?started.elapsed(), "reasoning job timed out");
                    return Err(ReasoningError::JobTimedOut {
                        waited: started.elapsed(),
                    });
                }
                // Never oversleep past the deadline
                tokio::time::sleep_until(deadline.min(now + poll_interval)).await;
            }
        }
    }
}
