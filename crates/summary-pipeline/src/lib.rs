//! Fan-out/fan-in coordination for the stock summary pipeline
//!
//! One logical request fans out into per-ticker analysis workers under a
//! fixed concurrency cap and fans back in through group-keyed aggregation:
//!
//! - [`GroupDispatcher`] resolves the ticker set, mints the correlation id,
//!   and submits the batch (fire-and-forget);
//! - [`ParallelExecutor`] runs the work set, isolating per-item failure;
//! - [`AnalysisWorker`] produces and persists one record per ticker,
//!   polling its reasoning job under an explicit deadline;
//! - [`Aggregator`] collects all records sharing a correlation id and
//!   renders them into a single deliverable for the [`DeliverySink`].
//!
//! Partial results are durable: each worker writes exactly one record keyed
//! by both its unique id and the shared correlation id, and a queryable
//! batch status entity distinguishes "not all workers finished" from "all
//! finished, fewer than expected succeeded".

pub mod aggregator;
pub mod clients;
pub mod delivery;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod prompts;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::{Aggregator, Deliverable};
pub use clients::{ClientFactory, DefaultClientFactory};
pub use delivery::{DeliverySink, SmtpConfig, SmtpSink};
pub use dispatcher::{Dispatch, GroupDispatcher};
pub use error::{AnalysisError, Result};
pub use executor::{BatchHandle, BatchReport, ParallelExecutor};
pub use worker::AnalysisWorker;
