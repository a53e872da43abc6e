//! Run orchestration: trigger a sync, wait for the run, classify the outcome.

use std::sync::{Arc, Mutex};

use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::client::HightouchApi;
use crate::config::SyncRunConfig;
use crate::duration::humanize_elapsed;
use crate::error::{HightouchError, Result};
use crate::metrics::{emit_run_metrics, MetricsSink};
use crate::poll::{await_terminal, select_run, PollSettings};
use crate::status::RunStatus;
use crate::types::{RunDetails, SyncDetails, SyncRunOutput};

/// How a terminal run is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All rows synced
    Succeeded,
    /// Completed, but some rows failed
    Warned,
    /// Failed, cancelled or interrupted
    Failed,
}

impl RunOutcome {
    pub fn classify(status: RunStatus) -> Self {
        if status.has_row_errors() {
            RunOutcome::Warned
        } else if status.is_success_like() {
            RunOutcome::Succeeded
        } else {
            RunOutcome::Failed
        }
    }
}

/// Triggers sync runs and waits for them.
///
/// The API client and metrics sink are injected so that each host (CLI,
/// workflow engine, tests) decides on transport and metric destination.
/// A runner holds no per-run state and can serve concurrent runs.
///
/// # Example
///
/// ```ignore
/// let client = Arc::new(HightouchClient::new(&token, &ClientOptions::default())?);
/// let runner = SyncRunner::new(client, Arc::new(NoOpMetrics));
/// let output = runner.run(&SyncRunConfig::new(1127166), &CancellationToken::new()).await?;
/// ```
pub struct SyncRunner {
    client: Arc<dyn HightouchApi>,
    metrics: Arc<dyn MetricsSink>,
}

impl SyncRunner {
    pub fn new(client: Arc<dyn HightouchApi>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { client, metrics }
    }

    /// Trigger a run of `config.sync_id` and, if `config.wait`, block until
    /// it finishes.
    pub async fn run(
        &self,
        config: &SyncRunConfig,
        cancel: &CancellationToken,
    ) -> Result<SyncRunOutput> {
        config.validate()?;

        let result = self.run_internal(config, cancel).await;
        if let Err(err) = &result {
            error!("[Hightouch] syncId={} run failed: {}", config.sync_id, err);
        }
        result
    }

    async fn run_internal(
        &self,
        config: &SyncRunConfig,
        cancel: &CancellationToken,
    ) -> Result<SyncRunOutput> {
        let sync_id = config.sync_id;

        // Sync details are only used for the slug in log lines, but a
        // missing sync must abort before anything is triggered.
        let sync = self.client.get_sync(sync_id).await?;
        if sync.disabled {
            warn!("[syncId={}] {}: sync is disabled", sync.id, sync.slug);
        }

        let run_id = self
            .client
            .trigger_run(sync_id, config.full_resync)
            .await?
            .id;
        info!(
            "[syncId={}] {}: Job triggered with runId {}",
            sync.id, sync.slug, run_id
        );

        if !config.wait {
            return Ok(SyncRunOutput { run_id });
        }

        let settings = PollSettings {
            interval: config.poll_interval,
            max_duration: config.max_duration,
        };
        let run = self
            .await_run(&sync, sync_id, run_id, settings, cancel)
            .await?;

        self.finish(&sync, run)?;
        Ok(SyncRunOutput { run_id })
    }

    async fn await_run(
        &self,
        sync: &SyncDetails,
        sync_id: i64,
        run_id: i64,
        settings: PollSettings,
        cancel: &CancellationToken,
    ) -> Result<RunDetails> {
        let client = self.client.as_ref();
        let last_status = Mutex::new(None::<String>);
        let last_status = &last_status;

        let poll = move || async move {
            let page = client.list_runs(sync_id, run_id).await?;
            let total = page.data.len();
            let has_more = page.has_more;

            let Some(run) = select_run(page.data, run_id)? else {
                debug!(
                    "[Hightouch] runId={} not yet visible in /runs response ({} total runs, hasMore={}), retrying",
                    run_id, total, has_more
                );
                return Ok(None);
            };

            log_status(sync, &run, last_status);
            Ok::<_, HightouchError>(Some(run))
        };

        await_terminal(run_id, poll, settings, cancel).await
    }

    /// Classify a terminal run, report metrics, or fail with `SyncRunFailed`.
    fn finish(&self, sync: &SyncDetails, run: RunDetails) -> Result<()> {
        let status = run
            .run_status()?
            .ok_or_else(|| HightouchError::UnrecognizedStatus(run.status.clone()))?;
        let duration = humanize_elapsed(run.created_at, run.finished_at);

        match RunOutcome::classify(status) {
            RunOutcome::Failed => {
                if run.finished_at.is_none() {
                    warn!(
                        "Run {} has null finishedAt, duration set to {}",
                        run.id, duration
                    );
                }
                if let Some(message) = run.error.as_deref() {
                    warn!(
                        "[syncId={}] {}: [runId={}] error: {}",
                        sync.id, sync.slug, run.id, message
                    );
                }
                Err(HightouchError::SyncRunFailed {
                    status: status.to_string(),
                    duration,
                    run_id: run.id,
                })
            }
            outcome => {
                if outcome == RunOutcome::Warned {
                    warn!(
                        "Run completed with errors (runId={}): {} failed rows",
                        run.id,
                        run.failed_rows.total()
                    );
                }
                info!(
                    "[syncId={}] {}: [runId={}] finished with status {} after {}",
                    sync.id, sync.slug, run.id, status, duration
                );
                emit_run_metrics(self.metrics.as_ref(), &run);
                Ok(())
            }
        }
    }
}

/// Info on status change, debug on repeats.
fn log_status(sync: &SyncDetails, run: &RunDetails, last_status: &Mutex<Option<String>>) {
    if run.status.trim().is_empty() {
        debug!(
            "[syncId={}] {}: [runId={}] has no status yet",
            sync.id, sync.slug, run.id
        );
        return;
    }

    let changed = match last_status.lock() {
        Ok(mut last) => {
            let changed = last.as_deref() != Some(run.status.as_str());
            *last = Some(run.status.clone());
            changed
        }
        Err(_) => true,
    };

    if changed {
        info!(
            "[syncId={}] {}: [runId={}] is now {}",
            sync.id, sync.slug, run.id, run.status
        );
    } else {
        debug!(
            "[syncId={}] {}: [runId={}] still {}",
            sync.id, sync.slug, run.id, run.status
        );
    }
}
