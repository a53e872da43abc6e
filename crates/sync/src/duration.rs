//! Human readable elapsed time of a run.

use chrono::{DateTime, Utc};

/// Marker used when the run has no finish time.
pub const UNAVAILABLE: &str = "N/A";

/// Format as `HH:MM:SS.mmm`. Negative spans are clamped to zero.
pub fn format_hms(duration: chrono::Duration) -> String {
    let millis = duration.num_milliseconds().max(0);
    let hours = millis / 3_600_000;
    let minutes = (millis / 60_000) % 60;
    let seconds = (millis / 1_000) % 60;
    let millis = millis % 1_000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Elapsed time between creation and finish, or [`UNAVAILABLE`] when either is missing.
pub fn humanize_elapsed(
    created_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
) -> String {
    match (created_at, finished_at) {
        (Some(created), Some(finished)) => format_hms(finished - created),
        _ => UNAVAILABLE.to_string(),
    }
}
