//! OpenAI-backed reasoning provider
//!
//! `summarize` uses the chat completions endpoint; `submit_job`/`poll_job`
//! drive an assistants thread + run pair, which is the asynchronous job
//! surface this pipeline polls.

use crate::error::{ReasoningError, Result};
use crate::provider::{JobId, JobPoll, JobStatus, ReasoningProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_COMPLETION_TOKENS: u32 = 1000;

/// Configuration for the OpenAI reasoning provider
#[derive(Debug, Clone)]
pub struct ReasonerConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,

    /// Model used for the synchronous summarization call
    pub model: String,

    /// Assistant id backing the asynchronous assessment job
    pub assistant_id: String,
}

impl ReasonerConfig {
    /// Create a new config with the given API key and assistant id
    pub fn new(api_key: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            model: DEFAULT_MODEL.to_string(),
            assistant_id: assistant_id.into(),
        }
    }

    /// Create config from environment variables
    ///
    /// Reads `OPENAI_API_KEY` and `OPENAI_ASSISTANT_ID`; `OPENAI_API_BASE`
    /// overrides the default endpoint if set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ReasoningError::Config("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        let assistant_id = std::env::var("OPENAI_ASSISTANT_ID").map_err(|_| {
            ReasoningError::Config("OPENAI_ASSISTANT_ID environment variable not set".to_string())
        })?;

        let api_base =
            std::env::var("OPENAI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            model: DEFAULT_MODEL.to_string(),
            assistant_id,
        })
    }

    /// Set a custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the summarization model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct CreatedObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    status: String,
}

#[derive(Debug, Deserialize)]
struct ThreadMessageList {
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum MessageContent {
    #[serde(rename = "text")]
    Text { text: MessageText },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessageText {
    value: String,
}

/// OpenAI reasoning provider
pub struct OpenAIReasoner {
    client: Client,
    config: ReasonerConfig,
}

impl OpenAIReasoner {
    /// Create a provider with the given configuration
    pub fn new(config: ReasonerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ReasonerConfig::from_env()?)
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.config.api_base, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .json(&body)
            .send()
            .await?;

        Self::into_json(response).await
    }

    async fn get(&self, path: &str) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.config.api_base, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .send()
            .await?;

        Self::into_json(response).await
    }

    async fn into_json(response: reqwest::Response) -> Result<serde_json::Value> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ReasoningError::Api(format!("HTTP {status}: {body}")));
        }
        Ok(response.json().await?)
    }

    /// First textual message of a thread, newest first
    async fn first_text_message(&self, thread_id: &str) -> Result<Option<String>> {
        let raw = self.get(&format!("/threads/{thread_id}/messages")).await?;
        let messages: ThreadMessageList = serde_json::from_value(raw)?;

        for message in messages.data {
            for content in message.content {
                if let MessageContent::Text { text } = content {
                    return Ok(Some(text.value));
                }
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl ReasoningProvider for OpenAIReasoner {
    async fn summarize(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "messages": [ChatMessage { role: "user", content: prompt }],
            "n": 1,
            "max_completion_tokens": MAX_COMPLETION_TOKENS,
        });

        let raw = self.post("/chat/completions", body).await?;
        let completion: ChatCompletionResponse = serde_json::from_value(raw)?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ReasoningError::Api("completion carried no content".to_string()))
    }

    async fn submit_job(&self, prompt: &str) -> Result<JobId> {
        let thread_body = json!({
            "messages": [ChatMessage { role: "user", content: prompt }],
        });
        let raw = self.post("/threads", thread_body).await?;
        let thread: CreatedObject = serde_json::from_value(raw)?;

        let run_body = json!({ "assistant_id": self.config.assistant_id });
        let raw = self
            .post(&format!("/threads/{}/runs", thread.id), run_body)
            .await?;
        let run: CreatedObject = serde_json::from_value(raw)?;

        debug!(thread_id = %thread.id, run_id = %run.id, "submitted reasoning job");

        Ok(JobId {
            thread_id: thread.id,
            run_id: run.id,
        })
    }

    async fn poll_job(&self, job: &JobId) -> Result<JobPoll> {
        let raw = self
            .get(&format!("/threads/{}/runs/{}", job.thread_id, job.run_id))
            .await?;
        let run: RunObject = serde_json::from_value(raw)?;

        let status = match run.status.as_str() {
            "queued" | "in_progress" => JobStatus::Pending,
            "completed" => JobStatus::Completed,
            // requires_action, cancelling, cancelled, failed, incomplete, expired
            _ => JobStatus::Failed,
        };

        let result_text = if status == JobStatus::Completed {
            self.first_text_message(&job.thread_id).await?
        } else {
            None
        };

        Ok(JobPoll {
            status,
            result_text,
        })
    }
}
