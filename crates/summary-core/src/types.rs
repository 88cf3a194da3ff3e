//! Data model for the fan-out/fan-in analysis pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ticker's unit of analysis work within a batch.
///
/// Work items exist only in memory for the duration of a dispatch; they are
/// never persisted. Each one is consumed exactly once by an analysis worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Stock ticker symbol (e.g., "AAPL")
    pub ticker: String,

    /// Correlation id shared by every item in the batch
    pub correlation_id: String,

    /// Contact of the requester, used for credential lookup and delivery
    pub requester_contact: String,
}

impl WorkItem {
    /// Create a work item for a ticker under the given correlation id
    pub fn new(
        ticker: impl Into<String>,
        correlation_id: impl Into<String>,
        requester_contact: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into().to_uppercase(),
            correlation_id: correlation_id.into(),
            requester_contact: requester_contact.into(),
        }
    }
}

/// A persisted per-ticker analysis result.
///
/// Written once by the worker that produced it, never mutated, never deleted
/// by this subsystem. The `correlation_id` groups records belonging to one
/// logical request; the `id` is globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Globally unique record id (random v4 uuid)
    pub id: String,

    /// Correlation id minted by the dispatch that produced this record
    pub correlation_id: String,

    /// Ticker this record describes
    pub ticker: String,

    /// Narrative assessment text (markdown)
    pub narrative: String,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Create a record with a freshly minted unique id
    pub fn new(
        correlation_id: impl Into<String>,
        ticker: impl Into<String>,
        narrative: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            correlation_id: correlation_id.into(),
            ticker: ticker.into(),
            narrative: narrative.into(),
            created_at: Utc::now(),
        }
    }
}

/// Lifecycle state of a dispatched batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchState {
    /// Work set submitted, no item terminal yet
    Dispatched,
    /// At least one item terminal, not all
    InProgress,
    /// All items terminal, all succeeded
    Complete,
    /// All items terminal, at least one failed
    PartiallyFailed,
}

/// Queryable status of one dispatched batch.
///
/// Updated by the store as each worker reaches a terminal state, so the
/// aggregator (and the trigger surface) can distinguish "not all workers
/// finished" from "all finished, fewer than expected succeeded".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatus {
    /// Correlation id this status describes
    pub correlation_id: String,

    /// Number of work items dispatched
    pub expected: u32,

    /// Items that reached a terminal state successfully
    pub completed: u32,

    /// Items that reached a terminal state with an error
    pub failed: u32,

    /// Derived lifecycle state
    pub state: BatchState,

    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl BatchStatus {
    /// Create the initial status for a freshly dispatched batch
    pub fn dispatched(correlation_id: impl Into<String>, expected: u32) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            expected,
            completed: 0,
            failed: 0,
            state: BatchState::Dispatched,
            updated_at: Utc::now(),
        }
    }

    /// Record one item reaching a terminal state and re-derive the state
    pub fn record_outcome(&mut self, success: bool) {
        if success {
            self.completed += 1;
        } else {
            self.failed += 1;
        }
        self.state = if self.completed + self.failed >= self.expected {
            if self.failed == 0 {
                BatchState::Complete
            } else {
                BatchState::PartiallyFailed
            }
        } else {
            BatchState::InProgress
        };
        self.updated_at = Utc::now();
    }

    /// Whether every item has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, BatchState::Complete | BatchState::PartiallyFailed)
    }
}

/// Per-requester API credentials resolved from the result store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentials {
    /// Market data API key (Alpha Vantage)
    pub market_data_key: String,

    /// Reasoning service API key (OpenAI)
    pub reasoning_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_item_uppercases_ticker() {
        let item = WorkItem::new("aapl", "g-1", "user@example.com");
        assert_eq!(item.ticker, "AAPL");
        assert_eq!(item.correlation_id, "g-1");
    }

    #[test]
    fn test_record_ids_are_unique() {
        let a = AnalysisRecord::new("g-1", "AAPL", "strong buy");
        let b = AnalysisRecord::new("g-1", "AAPL", "strong buy");
        assert_ne!(a.id, b.id);
        assert_eq!(a.correlation_id, b.correlation_id);
    }

    #[test]
    fn test_batch_status_transitions() {
        let mut status = BatchStatus::dispatched("g-1", 3);
        assert_eq!(status.state, BatchState::Dispatched);

        status.record_outcome(true);
        assert_eq!(status.state, BatchState::InProgress);
        assert!(!status.is_terminal());

        status.record_outcome(true);
        status.record_outcome(true);
        assert_eq!(status.state, BatchState::Complete);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_batch_status_partial_failure() {
        let mut status = BatchStatus::dispatched("g-1", 2);
        status.record_outcome(true);
        status.record_outcome(false);
        assert_eq!(status.state, BatchState::PartiallyFailed);
        assert_eq!(status.completed, 1);
        assert_eq!(status.failed, 1);
    }
}
