//! Configuration for the analysis pipeline

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for pipeline execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name of the analysis table in the backing store
    pub analysis_table: String,

    /// Maximum number of analysis workers in flight at once.
    ///
    /// This is a deliberate throttle to respect upstream API rate limits,
    /// not a performance ceiling.
    pub max_concurrency: usize,

    /// Delay between reasoning-job status checks
    pub poll_interval: Duration,

    /// Maximum total wait for a reasoning job to reach a terminal state
    pub max_job_wait: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analysis_table: "stock-analysis".to_string(),
            max_concurrency: 2,
            poll_interval: Duration::from_secs(5),
            max_job_wait: Duration::from_secs(120),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load recognized options from the environment.
    ///
    /// Recognized variables: `ANALYSIS_TABLE_NAME`, `MAX_CONCURRENCY`,
    /// `POLL_INTERVAL_SECS`, `MAX_JOB_WAIT_SECS`. Unset variables keep
    /// their defaults; unparseable values are an error.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Ok(table) = std::env::var("ANALYSIS_TABLE_NAME") {
            builder = builder.analysis_table(table);
        }
        if let Ok(raw) = std::env::var("MAX_CONCURRENCY") {
            let cap = raw.parse::<usize>().map_err(|_| {
                CoreError::ConfigError(format!("MAX_CONCURRENCY is not a number: {raw}"))
            })?;
            builder = builder.max_concurrency(cap);
        }
        if let Ok(raw) = std::env::var("POLL_INTERVAL_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| {
                CoreError::ConfigError(format!("POLL_INTERVAL_SECS is not a number: {raw}"))
            })?;
            builder = builder.poll_interval(Duration::from_secs(secs));
        }
        if let Ok(raw) = std::env::var("MAX_JOB_WAIT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| {
                CoreError::ConfigError(format!("MAX_JOB_WAIT_SECS is not a number: {raw}"))
            })?;
            builder = builder.max_job_wait(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.analysis_table.is_empty() {
            return Err(CoreError::ConfigError(
                "analysis_table must not be empty".to_string(),
            ));
        }

        if self.max_concurrency == 0 {
            return Err(CoreError::ConfigError(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.max_job_wait < self.poll_interval {
            return Err(CoreError::ConfigError(
                "max_job_wait must be at least one poll_interval".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    analysis_table: Option<String>,
    max_concurrency: Option<usize>,
    poll_interval: Option<Duration>,
    max_job_wait: Option<Duration>,
}

impl PipelineConfigBuilder {
    /// Set the analysis table name
    pub fn analysis_table(mut self, table: impl Into<String>) -> Self {
        self.analysis_table = Some(table.into());
        self
    }

    /// Set the concurrency cap
    pub fn max_concurrency(mut self, cap: usize) -> Self {
        self.max_concurrency = Some(cap);
        self
    }

    /// Set the reasoning-job poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set the maximum reasoning-job wait
    pub fn max_job_wait(mut self, wait: Duration) -> Self {
        self.max_job_wait = Some(wait);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        let defaults = PipelineConfig::default();

        let config = PipelineConfig {
            analysis_table: self.analysis_table.unwrap_or(defaults.analysis_table),
            max_concurrency: self.max_concurrency.unwrap_or(defaults.max_concurrency),
            poll_interval: self.poll_interval.unwrap_or(defaults.poll_interval),
            max_job_wait: self.max_job_wait.unwrap_or(defaults.max_job_wait),
        };

        config.validate()?;
        Ok(config)
    }
}
