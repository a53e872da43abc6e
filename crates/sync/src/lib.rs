//! Hightouch Sync - trigger Hightouch syncs and wait for their runs.
//!
//! This crate provides the API client, the run status vocabulary, a
//! cancellable fixed-interval poll loop and the orchestrator tying them
//! together.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use hightouch_sync::{ClientOptions, HightouchClient, NoOpMetrics, SyncRunConfig, SyncRunner};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = HightouchClient::new("api-token", &ClientOptions::default())?;
//! let runner = SyncRunner::new(Arc::new(client), Arc::new(NoOpMetrics));
//! let output = runner
//!     .run(&SyncRunConfig::new(1127166), &CancellationToken::new())
//!     .await?;
//! println!("run {} finished", output.run_id);
//! ```

mod client;
mod config;
mod duration;
mod error;
pub mod metrics;
mod poll;
mod runner;
mod status;
mod types;

pub use client::{ApiResponse, HightouchApi, HightouchClient};
pub use config::{
    ClientOptions, SyncRunConfig, DEFAULT_API_URL, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_MAX_DURATION, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT_SECS,
};
pub use duration::{format_hms, humanize_elapsed};
pub use error::{HightouchError, Result};
pub use metrics::{InMemoryMetrics, MetricsSink, NoOpMetrics};
pub use poll::{await_terminal, select_run, PollSettings};
pub use runner::{RunOutcome, SyncRunner};
pub use status::{normalize as normalize_status, RunStatus};
pub use types::*;
