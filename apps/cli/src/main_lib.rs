use std::sync::Arc;

use hightouch_sync::{HightouchApi, HightouchClient, SyncDetails, SyncRunner};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ApiArgs, RunArgs, ShowArgs};
use crate::metrics::LoggingMetrics;

pub fn init_tracing() {
    let log_format =
        std::env::var("HIGHTOUCH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries the JSON result only
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Resolve a cancellation token that fires on Ctrl-C.
pub fn shutdown_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping");
            trigger.cancel();
        }
    });
    cancel
}

fn build_client(api: &ApiArgs) -> anyhow::Result<HightouchClient> {
    Ok(HightouchClient::new(api.token()?, &api.client_options())?)
}

pub async fn run_sync(
    api: &ApiArgs,
    args: &RunArgs,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let result = execute_run(api, args, cancel).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Run the sync and build the JSON summary printed on stdout.
async fn execute_run(
    api: &ApiArgs,
    args: &RunArgs,
    cancel: &CancellationToken,
) -> anyhow::Result<serde_json::Value> {
    let config = args.run_config()?;
    let client = build_client(api)?;
    let metrics = Arc::new(LoggingMetrics::new());
    let runner = SyncRunner::new(Arc::new(client), metrics.clone());

    let output = runner.run(&config, cancel).await?;

    Ok(json!({
        "runId": output.run_id,
        "metrics": metrics.to_json(),
    }))
}

pub async fn show_sync(api: &ApiArgs, args: &ShowArgs) -> anyhow::Result<()> {
    let sync = fetch_sync(api, args).await?;
    println!("{}", serde_json::to_string_pretty(&sync)?);
    Ok(())
}

async fn fetch_sync(api: &ApiArgs, args: &ShowArgs) -> anyhow::Result<SyncDetails> {
    let sync_id = args.sync_id()?;
    let client = build_client(api)?;
    Ok(client.get_sync(sync_id).await?)
}
