//! Error types for the Hightouch sync crate.

use std::time::Duration;

use thiserror::Error;

use crate::types::RunDetails;

/// Result type alias for Hightouch operations.
pub type Result<T> = std::result::Result<T, HightouchError>;

/// Errors that can occur while triggering or awaiting a sync run.
#[derive(Debug, Error)]
pub enum HightouchError {
    /// Missing or invalid configuration (token, sync id, durations)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Connection refused, DNS failure, malformed URL, transport timeout
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the API
    #[error("Request failed with status '{status}': {body}")]
    RemoteCallFailed { status: u16, body: String },

    /// A 2xx response whose body is not the expected JSON shape
    #[error("Failed to parse response: {source} - {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// More than one run matched the run id filter
    #[error("Ambiguous run state: {count} runs matched runId {run_id}")]
    AmbiguousRunState { run_id: i64, count: usize },

    /// The run did not reach a terminal status in time
    #[error(
        "Timed out after {max_duration:?} waiting for runId {run_id} (last status: {})",
        last_status_label(.last_seen)
    )]
    PollTimeout {
        run_id: i64,
        max_duration: Duration,
        last_seen: Option<Box<RunDetails>>,
    },

    /// The run ended in a status that is not success-like
    #[error("Failed run with status '{status}' after {duration}: runId {run_id}")]
    SyncRunFailed {
        status: String,
        duration: String,
        run_id: i64,
    },

    /// The API returned a status outside the known vocabulary
    #[error("Unrecognized run status '{0}'")]
    UnrecognizedStatus(String),

    /// Waiting was interrupted by the caller
    #[error("Cancelled while waiting for runId {run_id}")]
    Cancelled { run_id: i64 },
}

fn last_status_label(last_seen: &Option<Box<RunDetails>>) -> &str {
    last_seen
        .as_deref()
        .map(|run| run.status.as_str())
        .filter(|status| !status.trim().is_empty())
        .unwrap_or("none")
}

impl HightouchError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a remote call error from status and raw body
    pub fn remote(status: u16, body: impl Into<String>) -> Self {
        Self::RemoteCallFailed {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RemoteCallFailed { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Last snapshot observed before a poll timeout.
    pub fn last_seen(&self) -> Option<&RunDetails> {
        match self {
            Self::PollTimeout { last_seen, .. } => last_seen.as_deref(),
            _ => None,
        }
    }
}
