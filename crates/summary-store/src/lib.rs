//! Result store for the stock summary pipeline
//!
//! A key-value store of analysis records with a secondary index enabling
//! "find all records for correlation id G", plus the batch status entity
//! and per-requester credential lookup. Records are written once by their
//! owning worker and never mutated; aggregation is read-only.

pub mod error;
pub mod memory;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;

use async_trait::async_trait;
use summary_core::{AnalysisRecord, BatchStatus, UserCredentials};

/// Persistence operations used by the pipeline.
///
/// Implementations must provide read-after-write consistency for the
/// correlation-id index at least eventually, within seconds; the in-memory
/// implementation is strongly consistent. Tests against external backends
/// should assert index reads with polling-with-timeout, not immediately.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persist one analysis record. Write-once: callers never update or
    /// delete records through this subsystem.
    async fn put_record(&self, record: &AnalysisRecord) -> Result<()>;

    /// All records sharing the given correlation id, in index order.
    /// No ordering guarantee across records.
    async fn records_for_group(&self, correlation_id: &str) -> Result<Vec<AnalysisRecord>>;

    /// Resolve API credentials for a requester contact
    async fn credential_for_user(&self, contact: &str) -> Result<UserCredentials>;

    /// Create the status entity for a freshly dispatched batch
    async fn init_batch(&self, correlation_id: &str, expected: u32) -> Result<()>;

    /// Record one work item reaching a terminal state; returns the updated
    /// status. Increments are atomic with respect to concurrent workers.
    async fn record_outcome(&self, correlation_id: &str, success: bool) -> Result<BatchStatus>;

    /// Current status of a batch, if one was dispatched under this id
    async fn batch_status(&self, correlation_id: &str) -> Result<Option<BatchStatus>>;
}
