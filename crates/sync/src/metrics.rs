//! Metric reporting for sync runs.
//!
//! The runner only knows the [`MetricsSink`] trait, so hosts decide where
//! counters end up (log lines, a workflow engine, a metrics backend).

use std::sync::Mutex;

use crate::types::RunDetails;

pub const COMPLETION_RATIO: &str = "completionRatio";
pub const ROWS_SUCCESSFULLY_ADDED: &str = "rows.successfullyAdded";
pub const ROWS_SUCCESSFULLY_REMOVED: &str = "rows.successfullyRemoved";
pub const ROWS_SUCCESSFULLY_CHANGED: &str = "rows.successfullyChanged";
pub const ROWS_FAILED_ADDED: &str = "rows.failedAdded";
pub const ROWS_FAILED_REMOVED: &str = "rows.failedRemoved";
pub const ROWS_FAILED_CHANGED: &str = "rows.failedChanged";

/// Receives named counters.
pub trait MetricsSink: Send + Sync {
    fn counter(&self, name: &str, value: f64);
}

/// A no-op sink for contexts where metrics are not needed.
#[derive(Debug, Clone, Default)]
pub struct NoOpMetrics;

impl MetricsSink for NoOpMetrics {
    fn counter(&self, _name: &str, _value: f64) {
        // No-op
    }
}

/// Keeps every counter in emission order.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    entries: Mutex<Vec<(String, f64)>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded counters.
    pub fn entries(&self) -> Vec<(String, f64)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Last value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

impl MetricsSink for InMemoryMetrics {
    fn counter(&self, name: &str, value: f64) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((name.to_string(), value));
        }
    }
}

/// Emit completion ratio and row counts of a finished run.
pub fn emit_run_metrics(sink: &dyn MetricsSink, run: &RunDetails) {
    sink.counter(COMPLETION_RATIO, run.completion_ratio.unwrap_or(0.0));

    let ok = &run.successful_rows;
    sink.counter(ROWS_SUCCESSFULLY_ADDED, ok.added_count as f64);
    sink.counter(ROWS_SUCCESSFULLY_REMOVED, ok.removed_count as f64);
    sink.counter(ROWS_SUCCESSFULLY_CHANGED, ok.changed_count as f64);

    let failed = &run.failed_rows;
    sink.counter(ROWS_FAILED_ADDED, failed.added_count as f64);
    sink.counter(ROWS_FAILED_REMOVED, failed.removed_count as f64);
    sink.counter(ROWS_FAILED_CHANGED, failed.changed_count as f64);
}
