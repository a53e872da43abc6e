//! Run status vocabulary and lenient parsing of server wording.

use serde::{Deserialize, Serialize};

use crate::error::HightouchError;

/// Status of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Processing,
    Querying,
    Reporting,
    Success,
    Warning,
    CompletedWithErrors,
    Failed,
    Cancelled,
    Interrupted,
}

/// Wording observed from the API over time, mapped to the canonical status.
/// Keys are compared after normalization.
const ALIASES: &[(&str, RunStatus)] = &[
    ("processing", RunStatus::Processing),
    ("queued", RunStatus::Queued),
    ("failed", RunStatus::Failed),
    ("cancelled", RunStatus::Cancelled),
    ("canceled", RunStatus::Cancelled),
    ("success", RunStatus::Success),
    ("querying", RunStatus::Querying),
    ("warning", RunStatus::Warning),
    ("reporting", RunStatus::Reporting),
    ("interrupted", RunStatus::Interrupted),
    ("completed_with_errors", RunStatus::CompletedWithErrors),
    ("completed", RunStatus::Success),
    ("completed with errors", RunStatus::CompletedWithErrors),
    ("aborted due to fatal error", RunStatus::Failed),
    ("aborted_due_to_fatal_error", RunStatus::Failed),
    ("cancelled by user", RunStatus::Cancelled),
    ("canceled by user", RunStatus::Cancelled),
    ("complete", RunStatus::Success),
    ("completed_successfully", RunStatus::Success),
    ("completed_success", RunStatus::Success),
    ("completed_errors", RunStatus::CompletedWithErrors),
    ("completed_with_error", RunStatus::CompletedWithErrors),
];

impl RunStatus {
    pub const ALL: [RunStatus; 10] = [
        RunStatus::Queued,
        RunStatus::Processing,
        RunStatus::Querying,
        RunStatus::Reporting,
        RunStatus::Success,
        RunStatus::Warning,
        RunStatus::CompletedWithErrors,
        RunStatus::Failed,
        RunStatus::Cancelled,
        RunStatus::Interrupted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::Processing => "processing",
            RunStatus::Querying => "querying",
            RunStatus::Reporting => "reporting",
            RunStatus::Success => "success",
            RunStatus::Warning => "warning",
            RunStatus::CompletedWithErrors => "completed_with_errors",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Interrupted => "interrupted",
        }
    }

    /// Parse server wording, returning `None` when nothing matches.
    ///
    /// The alias table is consulted first, then the canonical values, both
    /// under the same normalization.
    pub fn parse_lenient(raw: &str) -> Option<RunStatus> {
        let normalized = normalize(raw);

        ALIASES
            .iter()
            .find(|(alias, _)| normalize(alias) == normalized)
            .map(|(_, status)| *status)
            .or_else(|| {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|status| normalize(status.as_str()) == normalized)
            })
    }

    /// No further state change happens after a terminal status.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            RunStatus::Queued | RunStatus::Processing | RunStatus::Querying | RunStatus::Reporting
        )
    }

    /// Terminal statuses that count as a completed run, possibly with row errors.
    pub fn is_success_like(&self) -> bool {
        matches!(
            self,
            RunStatus::Success | RunStatus::Warning | RunStatus::CompletedWithErrors
        )
    }

    /// Completed, but some rows failed.
    pub fn has_row_errors(&self) -> bool {
        matches!(self, RunStatus::Warning | RunStatus::CompletedWithErrors)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RunStatus {
    type Err = HightouchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RunStatus::parse_lenient(s).ok_or_else(|| HightouchError::UnrecognizedStatus(s.to_string()))
    }
}

/// Trim, lowercase, and map `-` and ` ` to `_`.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase().replace(['-', ' '], "_")
}
