//! Fixed-interval polling until a run reaches a terminal status.

use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{HightouchError, Result};
use crate::types::RunDetails;

/// Timing of a poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_duration: Duration,
}

/// Pick the snapshot for `run_id` out of a list runs page.
///
/// Entries for other runs are ignored. Zero matches means the run is not
/// visible yet (`Ok(None)`); several entries carrying the same id fail with
/// `AmbiguousRunState`.
pub fn select_run(runs: Vec<RunDetails>, run_id: i64) -> Result<Option<RunDetails>> {
    let mut matching: Vec<RunDetails> = runs.into_iter().filter(|r| r.id == run_id).collect();

    match matching.len() {
        0 => Ok(None),
        1 => Ok(matching.pop()),
        count => Err(HightouchError::AmbiguousRunState { run_id, count }),
    }
}

/// Call `poll` every `settings.interval` until it yields a snapshot with a
/// terminal status.
///
/// - `Ok(None)` from `poll` means "not visible yet" and the loop continues,
///   as does a snapshot without any status.
/// - Errors from `poll`, including an unrecognized status, end the loop.
/// - When `settings.max_duration` has elapsed, fails with `PollTimeout`
///   carrying the last snapshot seen.
/// - `cancel` is checked before each attempt and raced against the sleep;
///   an in-flight `poll` call is never interrupted.
pub async fn await_terminal<F, Fut>(
    run_id: i64,
    mut poll: F,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> Result<RunDetails>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<RunDetails>>>,
{
    let deadline = Instant::now() + settings.max_duration;
    let mut last_seen: Option<RunDetails> = None;
    let mut attempt: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(HightouchError::Cancelled { run_id });
        }

        attempt += 1;
        match poll().await? {
            Some(run) => match run.run_status()? {
                Some(status) if status.is_terminal() => {
                    debug!(
                        "[Hightouch] runId={} terminal after {} attempts",
                        run_id, attempt
                    );
                    return Ok(run);
                }
                Some(_) => last_seen = Some(run),
                None => {
                    debug!(
                        "[Hightouch] runId={} has no status yet (attempt {})",
                        run_id, attempt
                    );
                    last_seen = Some(run);
                }
            },
            None => {
                debug!(
                    "[Hightouch] runId={} not visible yet (attempt {})",
                    run_id, attempt
                );
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(HightouchError::PollTimeout {
                run_id,
                max_duration: settings.max_duration,
                last_seen: last_seen.map(Box::new),
            });
        }

        let pause = settings.interval.min(deadline - now);
        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(HightouchError::Cancelled { run_id });
            }
            _ = tokio::time::sleep(pause) => {}
        }
    }
}
