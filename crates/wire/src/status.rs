// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw job-status payload and its normalization into a [`JobSnapshot`].
//!
//! Every field of the status response is optional and loosely typed. Fields
//! that are absent, `null`, or of the wrong type normalize to `None` (or the
//! type's default), never to an error: a partially-populated response is
//! still a usable reading of the job.

use chrono::{DateTime, NaiveDateTime, Utc};
use dw_core::{JobId, JobSnapshot, JobState, StepRecord, StepState};
use serde::Deserialize;
use serde_json::Value;

/// `GET /jobs/status/{id}` response body, as sent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawJobStatus {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub state: Option<Value>,
    #[serde(default)]
    pub current_step: Option<Value>,
    #[serde(default)]
    pub progress: Option<Value>,
    #[serde(default)]
    pub retry_count: Option<Value>,
    #[serde(default)]
    pub last_error_message: Option<Value>,
    #[serde(default)]
    pub input_ref: Option<Value>,
    #[serde(default)]
    pub output_ref: Option<Value>,
    /// Legacy name of `input_ref`
    #[serde(default)]
    pub input_s3_uri: Option<Value>,
    /// Legacy name of `output_ref`
    #[serde(default)]
    pub output_s3_uri: Option<Value>,
    #[serde(default)]
    pub steps: Option<Value>,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub started_at: Option<Value>,
    #[serde(default)]
    pub finished_at: Option<Value>,
}

impl RawJobStatus {
    /// Normalize into a canonical snapshot.
    ///
    /// `requested` is used as the id when the payload does not carry one.
    pub fn into_snapshot(self, requested: &JobId) -> JobSnapshot {
        let meta = self.meta.as_ref();

        let progress = number(self.progress.as_ref())
            .or_else(|| number(meta_field(meta, &["progress"])));
        let input_ref =
            string(self.input_ref.as_ref()).or_else(|| string(self.input_s3_uri.as_ref()));
        let output_ref = string(self.output_ref.as_ref())
            .or_else(|| string(self.output_s3_uri.as_ref()))
            .or_else(|| string(meta_field(meta, &["output_ref", "output_s3_uri"])));

        JobSnapshot {
            id: string(self.id.as_ref()).map(JobId::from).unwrap_or_else(|| requested.clone()),
            state: string(self.state.as_ref()).and_then(|s| JobState::parse(&s)),
            current_step: string(self.current_step.as_ref()),
            progress,
            retry_count: count(self.retry_count.as_ref()),
            last_error_message: string(self.last_error_message.as_ref()),
            input_ref,
            output_ref,
            steps: steps(self.steps.as_ref()),
            created_at: timestamp(self.created_at.as_ref()),
            started_at: timestamp(self.started_at.as_ref()),
            finished_at: timestamp(self.finished_at.as_ref()),
        }
    }
}

fn meta_field<'a>(meta: Option<&'a Value>, names: &[&str]) -> Option<&'a Value> {
    let object = meta?.as_object()?;
    names.iter().find_map(|name| object.get(*name).filter(|v| !v.is_null()))
}

/// Non-empty string. Numbers are accepted for ids that arrive unquoted.
fn string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Finite number; strings and other types are not numbers.
fn number(value: Option<&Value>) -> Option<f64> {
    value?.as_f64().filter(|n| n.is_finite())
}

fn count(value: Option<&Value>) -> u32 {
    value.and_then(Value::as_u64).and_then(|n| u32::try_from(n).ok()).unwrap_or(0)
}

fn steps(value: Option<&Value>) -> Vec<StepRecord> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items.iter().filter_map(step).collect()
}

fn step(value: &Value) -> Option<StepRecord> {
    let object = value.as_object()?;
    let name = string(object.get("name"))?;
    let state = string(object.get("state")).map(|s| StepState::parse(&s)).unwrap_or_default();
    Some(StepRecord {
        name,
        state,
        progress: number(object.get("progress")),
        started_at: timestamp(object.get("started_at")),
        finished_at: timestamp(object.get("finished_at")),
    })
}

/// Parse a server timestamp.
///
/// Accepts RFC 3339, naive ISO 8601 (assumed UTC), and the RFC 2822 form
/// the server's JSON encoder uses for datetimes.
pub fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let raw = value?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.and_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    tracing::debug!(raw, "unparseable timestamp");
    None
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
