// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Renderable pipeline view derived from a snapshot.
//!
//! Never persisted. Recomputed from the latest snapshot whenever it changes.

use crate::active::resolve_active_step;
use crate::catalog::{project, CanonicalStep};
use crate::job::{JobId, JobSnapshot};
use crate::progress::{derive_overall_progress, step_progress};
use crate::state::{JobState, StepState};
use serde::Serialize;

/// One row of the step list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepLine {
    pub step: CanonicalStep,
    pub state: StepState,
    pub progress: i64,
    pub active: bool,
}

/// How a finished job ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TerminalSummary {
    Succeeded,
    Failed { message: Option<String> },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineView {
    pub job_id: JobId,
    pub state: Option<JobState>,
    /// `None` renders as a placeholder.
    pub overall_progress: Option<i64>,
    /// May name a step outside the catalog when the server says so.
    pub active_step: Option<String>,
    pub steps: Vec<StepLine>,
    pub retry_count: u32,
    pub last_error_message: Option<String>,
    pub terminal: Option<TerminalSummary>,
}

impl PipelineView {
    pub fn from_snapshot(snapshot: &JobSnapshot) -> Self {
        let ordered = project(&snapshot.steps);
        let overall_progress = derive_overall_progress(snapshot, &ordered);
        let active_step = resolve_active_step(snapshot, &ordered).map(str::to_string);

        let steps = ordered
            .iter()
            .map(|entry| StepLine {
                step: entry.step,
                state: entry.state,
                progress: step_progress(entry),
                active: active_step.as_deref() == Some(entry.name()),
            })
            .collect();

        let terminal = match snapshot.state {
            Some(JobState::Succeeded) => Some(TerminalSummary::Succeeded),
            Some(JobState::Failed) => {
                Some(TerminalSummary::Failed { message: snapshot.last_error_message.clone() })
            }
            Some(JobState::Cancelled) => Some(TerminalSummary::Cancelled),
            _ => None,
        };

        Self {
            job_id: snapshot.id.clone(),
            state: snapshot.state,
            overall_progress,
            active_step,
            steps,
            retry_count: snapshot.retry_count,
            last_error_message: snapshot.last_error_message.clone(),
            terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    pub fn can_retry(&self) -> bool {
        self.state.is_some_and(|s| s.is_retryable())
    }
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
