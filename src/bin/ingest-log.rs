//! Indexes the log files named in an object storage notification.
//!
//! The notification JSON document is read from standard input. The host
//! runtime is expected to deliver it there, e.g. a Lambda or SQS adapter that
//! pipes each event payload into a fresh process.
//!
//! The process exits with a non-zero status code as soon as one of the log
//! files could not be fetched, parsed or sent.
//!
//! Usage:
//!      cargo run --bin ingest-log < event.json

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tracing::{info, info_span};
use weblogs::{Config, Message, process_message};

fn main() -> anyhow::Result<()> {
    weblogs::util::tracing::init();

    let _span = info_span!("ingest_log").entered();

    let config = Config::from_env()?;
    info!(error_policy = %config.error_policy, "Loaded configuration");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to initialize tokio runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: Config) -> anyhow::Result<()> {
    let mut event = String::new();
    tokio::io::stdin()
        .read_to_string(&mut event)
        .await
        .context("Failed to read notification from stdin")?;

    let message = event
        .parse::<Message>()
        .context("Failed to parse notification")?;

    let client = config.sink.build_client()?;

    let outcomes = process_message(&message, &config, &client).await?;

    let records = outcomes.iter().map(|outcome| outcome.records).sum::<usize>();
    let skipped = outcomes
        .iter()
        .map(|outcome| outcome.row_errors.len())
        .sum::<usize>();

    info!(
        files = outcomes.len(),
        records, skipped, "Finished processing notification"
    );

    Ok(())
}
