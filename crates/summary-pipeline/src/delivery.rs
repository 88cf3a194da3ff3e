//! Report delivery
//!
//! The sink is fire-and-forget from the aggregator's perspective: one send
//! attempt, no retries. Retry policy belongs to whatever orchestrates the
//! aggregation.

use crate::aggregator::Deliverable;
use crate::error::{AnalysisError, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

/// Destination for rendered reports
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Send one deliverable to a recipient contact
    async fn send(&self, contact: &str, deliverable: &Deliverable) -> Result<()>;
}

/// SMTP configuration for the email sink
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP relay host
    pub host: String,

    /// SMTP port (default 587)
    pub port: u16,

    /// Sender address
    pub from: String,

    /// Optional relay credentials
    pub username: Option<String>,
    pub password: Option<String>,
}

impl SmtpConfig {
    /// Load configuration from the environment.
    ///
    /// Recognized variables: `SMTP_HOST`, `SMTP_PORT`, `EMAIL_FROM`,
    /// `SMTP_USERNAME`, `SMTP_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SMTP_HOST")
            .map_err(|_| AnalysisError::Delivery("SMTP_HOST not set".to_string()))?;
        let from = std::env::var("EMAIL_FROM")
            .map_err(|_| AnalysisError::Delivery("EMAIL_FROM not set".to_string()))?;
        let port = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(587);

        Ok(Self {
            host,
            port,
            from,
            username: std::env::var("SMTP_USERNAME").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Email delivery over SMTP
pub struct SmtpSink {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpSink {
    /// Build the sink from configuration
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| AnalysisError::Delivery(format!("Invalid from address: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AnalysisError::Delivery(format!("SMTP transport error: {e}")))?
            .port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl DeliverySink for SmtpSink {
    async fn send(&self, contact: &str, deliverable: &Deliverable) -> Result<()> {
        let to: Mailbox = contact
            .parse()
            .map_err(|e| AnalysisError::Delivery(format!("Invalid recipient address: {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&deliverable.subject)
            .header(ContentType::TEXT_HTML)
            .body(deliverable.html.clone())
            .map_err(|e| AnalysisError::Delivery(format!("Failed to build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AnalysisError::Delivery(format!("Failed to send email: {e}")))?;

        info!(%contact, sections = deliverable.sections, "report delivered");
        Ok(())
    }
}
