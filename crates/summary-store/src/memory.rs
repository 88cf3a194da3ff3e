//! In-memory result store
//!
//! Backs tests and the CLI's local mode, and serves as the reference
//! semantics for external backends: records keyed by id, a correlation-id
//! index mirroring a secondary index, batch counters, and a seeded
//! credential table.

use crate::error::{Result, StoreError};
use crate::AnalysisStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use summary_core::{AnalysisRecord, BatchStatus, UserCredentials};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Inner {
    /// Records by unique id
    records: HashMap<String, AnalysisRecord>,
    /// Correlation id -> record ids, in write order
    group_index: HashMap<String, Vec<String>>,
    /// Batch status by correlation id
    batches: HashMap<String, BatchStatus>,
    /// Credentials by requester contact
    credentials: HashMap<String, UserCredentials>,
}

/// Thread-safe in-memory store
#[derive(Clone)]
pub struct MemoryStore {
    table: String,
    inner: Arc<RwLock<Inner>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_table("stock-analysis")
    }
}

impl MemoryStore {
    /// Create an empty store with the default table name
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store for the given analysis table name
    pub fn with_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// The analysis table name this store serves
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Seed credentials for a requester contact
    pub async fn insert_credentials(&self, contact: impl Into<String>, creds: UserCredentials) {
        let mut inner = self.inner.write().await;
        inner.credentials.insert(contact.into(), creds);
    }

    /// Number of records currently stored
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn put_record(&self, record: &AnalysisRecord) -> Result<()> {
        let mut inner = self.inner.write().await;

        if inner.records.contains_key(&record.id) {
            return Err(StoreError::PersistenceFailure(format!(
                "duplicate record id: {}",
                record.id
            )));
        }

        inner
            .group_index
            .entry(record.correlation_id.clone())
            .or_default()
            .push(record.id.clone());
        inner.records.insert(record.id.clone(), record.clone());

        debug!(table = %self.table, id = %record.id, correlation_id = %record.correlation_id, ticker = %record.ticker, "record persisted");
        Ok(())
    }

    async fn records_for_group(&self, correlation_id: &str) -> Result<Vec<AnalysisRecord>> {
        let inner = self.inner.read().await;

        let ids = match inner.group_index.get(correlation_id) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };

        Ok(ids
            .iter()
            .filter_map(|id| inner.records.get(id).cloned())
            .collect())
    }

    async fn credential_for_user(&self, contact: &str) -> Result<UserCredentials> {
        let inner = self.inner.read().await;
        inner
            .credentials
            .get(contact)
            .cloned()
            .ok_or_else(|| StoreError::CredentialMissing(contact.to_string()))
    }

    async fn init_batch(&self, correlation_id: &str, expected: u32) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.batches.insert(
            correlation_id.to_string(),
            BatchStatus::dispatched(correlation_id, expected),
        );
        Ok(())
    }

    async fn record_outcome(&self, correlation_id: &str, success: bool) -> Result<BatchStatus> {
        let mut inner = self.inner.write().await;
        let status = inner
            .batches
            .get_mut(correlation_id)
            .ok_or_else(|| StoreError::UnknownBatch(correlation_id.to_string()))?;

        status.record_outcome(success);
        Ok(status.clone())
    }

    async fn batch_status(&self, correlation_id: &str) -> Result<Option<BatchStatus>> {
        let inner = self.inner.read().await;
        Ok(inner.batches.get(correlation_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use summary_core::BatchState;

    fn record(correlation_id: &str, ticker: &str) -> AnalysisRecord {
        AnalysisRecord::new(correlation_id, ticker, "narrative text")
    }

    #[tokio::test]
    async fn test_group_index_returns_all_records() {
        let store = MemoryStore::new();

        store.put_record(&record("g-1", "AAPL")).await.unwrap();
        store.put_record(&record("g-1", "MSFT")).await.unwrap();
        store.put_record(&record("g-2", "NVDA")).await.unwrap();

        let group = store.records_for_group("g-1").await.unwrap();
        assert_eq!(group.len(), 2);
        assert!(group.iter().all(|r| r.correlation_id == "g-1"));
    }

    #[test]
    fn test_table_name() {
        let store = MemoryStore::with_table("analysis-test");
        assert_eq!(store.table(), "analysis-test");
        assert_eq!(MemoryStore::new().table(), "stock-analysis");
    }

    #[tokio::test]
    async fn test_unknown_group_is_empty_not_error() {
        let store = MemoryStore::new();
        let group = store.records_for_group("nope").await.unwrap();
        assert!(group.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_record_id_rejected() {
        let store = MemoryStore::new();
        let rec = record("g-1", "AAPL");

        store.put_record(&rec).await.unwrap();
        let err = store.put_record(&rec).await.unwrap_err();
        assert!(matches!(err, StoreError::PersistenceFailure(_)));
    }

    #[tokio::test]
    async fn test_credentials_lookup() {
        let store = MemoryStore::new();
        store
            .insert_credentials(
                "user@example.com",
                UserCredentials {
                    market_data_key: "alpha".to_string(),
                    reasoning_key: "openai".to_string(),
                },
            )
            .await;

        let creds = store.credential_for_user("user@example.com").await.unwrap();
        assert_eq!(creds.market_data_key, "alpha");

        let err = store.credential_for_user("ghost@example.com").await.unwrap_err();
        assert!(matches!(err, StoreError::CredentialMissing(_)));
    }

    #[tokio::test]
    async fn test_batch_counter_lifecycle() {
        let store = MemoryStore::new();
        store.init_batch("g-1", 2).await.unwrap();

        let status = store.record_outcome("g-1", true).await.unwrap();
        assert_eq!(status.state, BatchState::InProgress);

        let status = store.record_outcome("g-1", false).await.unwrap();
        assert_eq!(status.state, BatchState::PartiallyFailed);
        assert_eq!(status.completed, 1);
        assert_eq!(status.failed, 1);

        let fetched = store.batch_status("g-1").await.unwrap().unwrap();
        assert_eq!(fetched, status);
    }

    #[tokio::test]
    async fn test_outcome_for_unknown_batch_errors() {
        let store = MemoryStore::new();
        let err = store.record_outcome("nope", true).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownBatch(_)));
    }
}
