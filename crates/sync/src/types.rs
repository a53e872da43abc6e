//! Types for Hightouch API requests and responses.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::status::RunStatus;

// ─────────────────────────────────────────────────────────────────────────────
// Sync Types
// ─────────────────────────────────────────────────────────────────────────────

/// A sync definition as returned by `GET /api/v1/syncs/{syncId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDetails {
    /// Numeric sync id
    pub id: i64,
    /// Human readable identifier
    pub slug: String,
    #[serde(default)]
    pub workspace_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub destination_id: Option<i64>,
    #[serde(default)]
    pub model_id: Option<i64>,
    #[serde(default, deserialize_with = "default_on_null")]
    pub configuration: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub schedule: Option<HashMap<String, serde_json::Value>>,
    /// Status of the sync itself (its last run), in server wording
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "default_on_null")]
    pub disabled: bool,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "default_on_null")]
    pub referenced_columns: Vec<String>,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub external_segment: Option<HashMap<String, serde_json::Value>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Run Types
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /api/v1/syncs/{syncId}/trigger`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRunRequest {
    pub full_resync: bool,
}

/// Response of the trigger endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTrigger {
    /// Id of the run that was started
    pub id: i64,
}

/// Added/removed/changed row counts for one group of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedRows {
    #[serde(default, deserialize_with = "lenient_count")]
    pub added_count: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub removed_count: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub changed_count: i64,
}

impl ModifiedRows {
    pub fn new(added_count: i64, removed_count: i64, changed_count: i64) -> Self {
        Self {
            added_count,
            removed_count,
            changed_count,
        }
    }

    pub fn total(&self) -> i64 {
        self.added_count
            .saturating_add(self.removed_count)
            .saturating_add(self.changed_count)
    }
}

/// One snapshot of a run, as listed by `GET /api/v1/syncs/{syncId}/runs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDetails {
    pub id: i64,
    /// Raw status text, empty while the server reports none; interpret with
    /// [`RunDetails::run_status`]
    #[serde(default, deserialize_with = "default_on_null")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Percentage of planned work completed (0-100)
    #[serde(default)]
    pub completion_ratio: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub query_size: Option<i64>,
    #[serde(default, deserialize_with = "default_on_null")]
    pub planned_rows: ModifiedRows,
    #[serde(default, deserialize_with = "default_on_null")]
    pub successful_rows: ModifiedRows,
    #[serde(default, deserialize_with = "default_on_null")]
    pub failed_rows: ModifiedRows,
}

impl RunDetails {
    /// Parse the raw status, failing with `UnrecognizedStatus` on unknown wording.
    ///
    /// `Ok(None)` when no status was reported (null, missing or blank).
    pub fn run_status(&self) -> Result<Option<RunStatus>> {
        if self.status.trim().is_empty() {
            return Ok(None);
        }
        self.status.parse().map(Some)
    }
}

/// Response of the list runs endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunListResponse {
    #[serde(default)]
    pub data: Vec<RunDetails>,
    #[serde(default)]
    pub has_more: bool,
}

/// Result of a run orchestration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRunOutput {
    /// Id of the run that was triggered
    pub run_id: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Deserialization helpers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum CountValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Row counts arrive as numbers or numeric strings depending on the endpoint.
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<CountValue>::deserialize(deserializer)?;
    match value {
        None => Ok(0),
        Some(CountValue::Int(v)) => Ok(v),
        Some(CountValue::Float(v)) => Ok(v as i64),
        Some(CountValue::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0);
            }
            trimmed
                .parse::<i64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid row count '{}'", s)))
        }
    }
}

fn default_on_null<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
