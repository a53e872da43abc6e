use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use hightouch_sync::{
    ClientOptions, HightouchError, SyncRunConfig, DEFAULT_API_URL, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_TIMEOUT_SECS,
};

/// Trigger a Hightouch sync and wait for its completion.
#[derive(Debug, Parser)]
#[command(name = "hightouch-sync", version)]
pub struct Cli {
    #[command(flatten)]
    pub api: ApiArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Trigger a run of a sync, then wait for it by default
    Run(RunArgs),
    /// Print the details of a sync
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ApiArgs {
    /// API bearer token
    #[arg(long, env = "HIGHTOUCH_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "HIGHTOUCH_BASE_URL", default_value = DEFAULT_API_URL)]
    pub base_url: String,

    /// Total timeout of one HTTP request
    #[arg(long, env = "HIGHTOUCH_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout_secs: u64,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// The sync id to trigger a run for
    #[arg(long, env = "HIGHTOUCH_SYNC_ID")]
    pub sync_id: Option<i64>,

    /// Whether to do a full resynchronization
    #[arg(long)]
    pub full_resync: bool,

    /// Return as soon as the run is triggered
    #[arg(long)]
    pub no_wait: bool,

    /// The max total wait duration
    #[arg(long, env = "HIGHTOUCH_MAX_DURATION_SECS", default_value_t = 300)]
    pub max_duration_secs: u64,

    #[arg(long, default_value_t = 1000)]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(long, env = "HIGHTOUCH_SYNC_ID")]
    pub sync_id: Option<i64>,
}

impl ApiArgs {
    pub fn token(&self) -> Result<&str, HightouchError> {
        self.token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                HightouchError::config("API token is required (--token or HIGHTOUCH_API_TOKEN)")
            })
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            user_agent: Some(format!("hightouch-sync/{}", env!("CARGO_PKG_VERSION"))),
            accept_invalid_certs: self.insecure,
        }
    }
}

fn require_sync_id(sync_id: Option<i64>) -> Result<i64, HightouchError> {
    sync_id.ok_or_else(|| {
        HightouchError::config("sync id is required (--sync-id or HIGHTOUCH_SYNC_ID)")
    })
}

impl RunArgs {
    pub fn run_config(&self) -> Result<SyncRunConfig, HightouchError> {
        let config = SyncRunConfig::new(require_sync_id(self.sync_id)?)
            .with_full_resync(self.full_resync)
            .with_wait(!self.no_wait)
            .with_max_duration(Duration::from_secs(self.max_duration_secs))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms));
        config.validate()?;
        Ok(config)
    }
}

impl ShowArgs {
    pub fn sync_id(&self) -> Result<i64, HightouchError> {
        require_sync_id(self.sync_id)
    }
}
