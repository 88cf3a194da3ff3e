//! Core types for the stock summary pipeline
//!
//! This crate defines the data model shared across the workspace: work items,
//! analysis records, the batch status entity, per-requester credentials, and
//! the pipeline configuration.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{CoreError, Result};
pub use logging::{init_tracing, init_tracing_with};
pub use types::{
    AnalysisRecord, BatchState, BatchStatus, UserCredentials, WorkItem,
};
