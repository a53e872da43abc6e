//! Configuration for the API client and for a single sync run.

use std::time::Duration;

use crate::error::{HightouchError, Result};

/// Default base URL of the Hightouch REST API.
pub const DEFAULT_API_URL: &str = "https://api.hightouch.com";

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout for API requests.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default max total wait for a run to finish.
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(5 * 60);

/// Interval between two status requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// HTTP client tuning, passed through to the underlying client builder.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: Option<String>,
    /// Skip TLS certificate validation (self-hosted proxies only)
    pub accept_invalid_certs: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: None,
            accept_invalid_certs: false,
        }
    }
}

impl ClientOptions {
    /// Options pointing at another base URL (proxy, test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Settings for one orchestration.
#[derive(Debug, Clone)]
pub struct SyncRunConfig {
    /// The sync to trigger
    pub sync_id: i64,
    /// Reprocess all records instead of only changes
    pub full_resync: bool,
    /// Wait for the run to reach a terminal status
    pub wait: bool,
    /// Max total wait duration
    pub max_duration: Duration,
    pub poll_interval: Duration,
}

impl SyncRunConfig {
    pub fn new(sync_id: i64) -> Self {
        Self {
            sync_id,
            full_resync: false,
            wait: true,
            max_duration: DEFAULT_MAX_DURATION,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_full_resync(mut self, full_resync: bool) -> Self {
        self.full_resync = full_resync;
        self
    }

    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.sync_id <= 0 {
            return Err(HightouchError::config(format!(
                "sync id must be a positive integer, got {}",
                self.sync_id
            )));
        }
        if self.wait && self.max_duration.is_zero() {
            return Err(HightouchError::config("max duration must be greater than zero"));
        }
        if self.wait && self.poll_interval.is_zero() {
            return Err(HightouchError::config("poll interval must be greater than zero"));
        }
        Ok(())
    }
}
