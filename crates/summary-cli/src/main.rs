//! Command-line trigger surface for the stock summary pipeline
//!
//! # Usage
//!
//! ```bash
//! export ALPHA_VANTAGE_API_KEY="..."
//! export OPENAI_API_KEY="..."
//! export OPENAI_ASSISTANT_ID="asst_..."
//! export POLYGON_API_KEY="..."   # only needed with --compare
//!
//! stock-summary analyze --ticker AAPL --compare --email-to you@example.com --wait
//! ```

use clap::{Parser, Subcommand};
use std::sync::Arc;
use summary_core::{PipelineConfig, UserCredentials};
use summary_market::PolygonClient;
use summary_pipeline::{
    Aggregator, DefaultClientFactory, DeliverySink, GroupDispatcher, SmtpConfig, SmtpSink,
};
use summary_store::{AnalysisStore, MemoryStore};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stock-summary")]
#[command(about = "Fan-out stock analysis with aggregated email reports", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dispatch an analysis batch for a ticker
    Analyze {
        /// Ticker symbol to analyze
        #[arg(short, long)]
        ticker: String,

        /// Also analyze related companies
        #[arg(short, long)]
        compare: bool,

        /// Recipient of the aggregated report
        #[arg(long)]
        email_to: String,

        /// Wait for the batch, then aggregate and deliver
        #[arg(short, long)]
        wait: bool,
    },

    /// Aggregate and deliver the report for a finished batch.
    ///
    /// The bundled store is process-local, so this is useful in the same
    /// process as `analyze` (or against a shared store backend).
    Report {
        /// Correlation id returned by `analyze`
        #[arg(short, long)]
        correlation_id: String,

        /// Recipient; without it the report prints to stdout
        #[arg(long)]
        email_to: Option<String>,
    },

    /// Show the status of a dispatched batch
    Status {
        /// Correlation id returned by `analyze`
        #[arg(short, long)]
        correlation_id: String,
    },
}

/// Seed the local store with credentials for the requester, taken from the
/// environment. Missing keys leave the store unseeded and dispatch fails
/// with a credential error, matching the deployed behavior.
async fn seed_credentials(store: &MemoryStore, contact: &str) {
    let market_data_key = std::env::var("ALPHA_VANTAGE_API_KEY").ok();
    let reasoning_key = std::env::var("OPENAI_API_KEY").ok();

    if let (Some(market_data_key), Some(reasoning_key)) = (market_data_key, reasoning_key) {
        store
            .insert_credentials(
                contact,
                UserCredentials {
                    market_data_key,
                    reasoning_key,
                },
            )
            .await;
    }
}

async fn deliver_or_print(
    aggregator: &Aggregator,
    correlation_id: &str,
    email_to: Option<&str>,
) -> anyhow::Result<()> {
    match email_to {
        Some(contact) => {
            let sink = SmtpSink::new(&SmtpConfig::from_env()?)?;
            let sent = aggregator
                .aggregate_and_deliver(correlation_id, contact, &sink as &dyn DeliverySink)
                .await?;
            match sent {
                Some(deliverable) => println!(
                    "Delivered {} section(s) to {contact}",
                    deliverable.sections
                ),
                None => println!("No records yet for {correlation_id}"),
            }
        }
        None => match aggregator.aggregate(correlation_id).await? {
            Some(deliverable) => println!("{}", deliverable.html),
            None => println!("No records yet for {correlation_id}"),
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    summary_core::init_tracing_with("warn,summary_pipeline=info");

    let args = Args::parse();
    let config = PipelineConfig::from_env()?;

    let store = Arc::new(MemoryStore::with_table(config.analysis_table.clone()));
    let aggregator = Aggregator::new(Arc::clone(&store) as Arc<dyn AnalysisStore>);

    match args.command {
        Command::Analyze {
            ticker,
            compare,
            email_to,
            wait,
        } => {
            seed_credentials(&store, &email_to).await;

            // A missing Polygon key degrades --compare batches to the
            // single requested ticker instead of refusing the request
            let related = PolygonClient::from_env()
                .unwrap_or_else(|_| PolygonClient::new("missing", 5));

            let assistant_id =
                std::env::var("OPENAI_ASSISTANT_ID").unwrap_or_else(|_| "default".to_string());

            let dispatcher = GroupDispatcher::new(
                Arc::new(related),
                Arc::clone(&store) as Arc<dyn AnalysisStore>,
                Arc::new(DefaultClientFactory::new(assistant_id)),
                config,
            );

            let dispatch = dispatcher.dispatch(&ticker, compare, &email_to).await?;
            println!("Dispatched batch {}", dispatch.correlation_id);

            if wait {
                info!("waiting for batch completion");
                let report = dispatch
                    .batch
                    .wait()
                    .await
                    .ok_or_else(|| anyhow::anyhow!("batch was cancelled"))?;
                println!(
                    "Batch finished: {} succeeded, {} failed",
                    report.succeeded.len(),
                    report.failed.len()
                );

                deliver_or_print(&aggregator, &dispatch.correlation_id, Some(email_to.as_str()))
                    .await?;
            }
        }

        Command::Report {
            correlation_id,
            email_to,
        } => {
            deliver_or_print(&aggregator, &correlation_id, email_to.as_deref()).await?;
        }

        Command::Status { correlation_id } => {
            match store.batch_status(&correlation_id).await? {
                Some(status) => println!(
                    "{}: {:?} ({}/{} done, {} failed)",
                    status.correlation_id,
                    status.state,
                    status.completed + status.failed,
                    status.expected,
                    status.failed
                ),
                None => println!("No batch found for {correlation_id}"),
            }
        }
    }

    Ok(())
}
