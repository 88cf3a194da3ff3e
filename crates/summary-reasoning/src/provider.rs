//! Reasoning provider trait definition

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Handle to an asynchronously completing reasoning job.
///
/// Opaque to callers; not owned by this system. The OpenAI backend packs
/// the thread and run identifiers into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobId {
    pub thread_id: String,
    pub run_id: String,
}

/// Status of a reasoning job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Job is queued or running
    Pending,
    /// Job finished successfully
    Completed,
    /// Job reached a terminal failure state
    Failed,
}

/// One poll observation of a reasoning job
#[derive(Debug, Clone)]
pub struct JobPoll {
    pub status: JobStatus,

    /// Result text, present once the job is `Completed`
    pub result_text: Option<String>,
}

/// Trait for reasoning service providers
///
/// Implementations provide a synchronous summarization call and an
/// asynchronous submit/poll job pair.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    /// Produce a condensed summary for the given prompt (synchronous call)
    async fn summarize(&self, prompt: &str) -> Result<String>;

    /// Submit an asynchronous reasoning job
    async fn submit_job(&self, prompt: &str) -> Result<JobId>;

    /// Check the status of a previously submitted job
    async fn poll_job(&self, job: &JobId) -> Result<JobPoll>;
}
