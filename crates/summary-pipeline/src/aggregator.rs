//! Group-keyed aggregation
//!
//! Collects every analysis record sharing a correlation id and renders
//! them into one deliverable. Aggregation may run before all workers have
//! finished; the deliverable carries the batch status so a partial read is
//! observable rather than silent.

use crate::delivery::DeliverySink;
use crate::error::Result;
use pulldown_cmark::{html, Parser};
use std::sync::Arc;
use summary_core::BatchStatus;
use summary_store::AnalysisStore;
use tracing::{debug, info};

const SUBJECT: &str = "Stock Summary Report";
const SECTION_BREAK: &str =
    r#"<br><hr style="border: none; height: 2px; background-color: #000; width: 100%;"><br>"#;

/// A rendered report ready for delivery
#[derive(Debug, Clone)]
pub struct Deliverable {
    /// Message subject
    pub subject: String,

    /// Rendered HTML body
    pub html: String,

    /// Number of per-ticker sections
    pub sections: usize,

    /// Batch status at render time, if a batch entity exists for the id.
    /// `None` means the id predates status tracking or is foreign.
    pub status: Option<BatchStatus>,
}

impl Deliverable {
    /// Whether every work item of the batch was terminal at render time
    pub fn is_complete(&self) -> bool {
        self.status.as_ref().is_some_and(BatchStatus::is_terminal)
    }
}

/// Renders all records of one correlation id into a deliverable
pub struct Aggregator {
    store: Arc<dyn AnalysisStore>,
}

impl Aggregator {
    /// Create an aggregator over the given store
    pub fn new(store: Arc<dyn AnalysisStore>) -> Self {
        Self { store }
    }

    /// Collect and render all records for a correlation id.
    ///
    /// Returns `None` when no records exist yet; the caller decides whether
    /// that is an error or simply "no worker has finished".
    pub async fn aggregate(&self, correlation_id: &str) -> Result<Option<Deliverable>> {
        let records = self.store.records_for_group(correlation_id).await?;
        if records.is_empty() {
            debug!(correlation_id, "no records to aggregate");
            return Ok(None);
        }

        let status = self.store.batch_status(correlation_id).await?;

        // Sections concatenate in index-return order; no ordering guarantee
        let mut body = String::new();
        for record in &records {
            body.push_str(&format!("<h2>{}</h2>", record.ticker));
            body.push_str(&markdown_to_html(&record.narrative));
            body.push_str(SECTION_BREAK);
        }

        info!(correlation_id, sections = records.len(), "report rendered");

        Ok(Some(Deliverable {
            subject: SUBJECT.to_string(),
            html: body,
            sections: records.len(),
            status,
        }))
    }

    /// Aggregate and hand the result to the delivery sink.
    ///
    /// Returns the deliverable that was sent, or `None` when there was
    /// nothing to deliver. Delivery failures surface; they are not retried
    /// here.
    pub async fn aggregate_and_deliver(
        &self,
        correlation_id: &str,
        contact: &str,
        sink: &dyn DeliverySink,
    ) -> Result<Option<Deliverable>> {
        let Some(deliverable) = self.aggregate(correlation_id).await? else {
            return Ok(None);
        };

        sink.send(contact, &deliverable).await?;
        Ok(Some(deliverable))
    }
}

fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}
