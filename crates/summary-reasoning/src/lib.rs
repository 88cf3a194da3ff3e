//! Reasoning job client for the stock summary pipeline
//!
//! Submits prompt-bearing jobs to an asynchronous reasoning service and
//! polls them to a terminal state under an explicit deadline. The provider
//! trait is the seam; the OpenAI implementation is the default backend.

pub mod error;
pub mod openai;
pub mod poll;
pub mod provider;

pub use error::{ReasoningError, Result};
pub use openai::{OpenAIReasoner, ReasonerConfig};
pub use poll::await_job;
pub use provider::{JobId, JobPoll, JobStatus, ReasoningProvider};
