// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier and the canonical job snapshot.

use crate::state::{JobState, StepState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Server-assigned identifier of a dubbing job.
    ///
    /// Stable for the job's lifetime, including across retries.
    pub struct JobId;
}

/// One step record as reported by the server.
///
/// The server's step list is partial and unordered: it may omit steps that
/// have not been emitted yet and may include names outside the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub state: StepState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl StepRecord {
    pub fn new(name: impl Into<String>, state: StepState) -> Self {
        Self { name: name.into(), state, progress: None, started_at: None, finished_at: None }
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// Normalized, immutable reading of a job at one point in time.
///
/// Every poll produces a fresh value; a snapshot is never mutated after it
/// has been published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: JobId,
    /// `None` when the server reported no state or one outside the vocabulary.
    pub state: Option<JobState>,
    /// Explicit pointer to the active step; authoritative when present.
    pub current_step: Option<String>,
    /// Explicit overall progress (0–100); authoritative when present.
    pub progress: Option<f64>,
    pub retry_count: u32,
    pub last_error_message: Option<String>,
    pub input_ref: Option<String>,
    pub output_ref: Option<String>,
    pub steps: Vec<StepRecord>,
    pub created_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobSnapshot {
    /// A snapshot with nothing known beyond the identifier.
    pub fn empty(id: JobId) -> Self {
        Self {
            id,
            state: None,
            current_step: None,
            progress: None,
            retry_count: 0,
            last_error_message: None,
            input_ref: None,
            output_ref: None,
            steps: Vec::new(),
            created_at: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Whether the reported state is terminal. Polling stops on these.
    pub fn is_terminal(&self) -> bool {
        self.state.is_some_and(|s| s.is_terminal())
    }
}

crate::builder! {
    JobSnapshotBuilder => JobSnapshot {
        into id: JobId = "job-1",
        set state: Option<JobState> = Some(JobState::Queued),
        some current_step: String,
        set progress: Option<f64> = None,
        set retry_count: u32 = 0,
        some last_error_message: String,
        some input_ref: String,
        some output_ref: String,
        set steps: Vec<StepRecord> = Vec::new(),
        set created_at: Option<DateTime<Utc>> = None,
        set started_at: Option<DateTime<Utc>> = None,
        set finished_at: Option<DateTime<Utc>> = None,
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
