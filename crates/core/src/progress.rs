// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Overall and per-step progress derivation.
//!
//! Overall progress is evaluated by strict precedence:
//! 1. explicit numeric progress from the server
//! 2. a coarse value from the job state
//! 3. the average of per-step progress (legacy path, only without a state)
//! 4. nothing, when there is no step data either
//!
//! Partial step data is unreliable mid-pipeline, so averaging never overrides
//! a state-derived figure.

use crate::catalog::{OrderedStepView, StepEntry};
use crate::job::JobSnapshot;
use crate::state::{JobState, StepState};

/// Derive a single 0–100 progress value for the whole job.
///
/// `None` means "unknown": render a placeholder, never "0%".
pub fn derive_overall_progress(snapshot: &JobSnapshot, steps: &OrderedStepView) -> Option<i64> {
    if let Some(progress) = snapshot.progress.filter(|p| p.is_finite()) {
        return Some(round(progress));
    }

    if let Some(state) = snapshot.state {
        return Some(state_progress(state));
    }

    if snapshot.steps.is_empty() || steps.is_empty() {
        return None;
    }

    let total: f64 = steps.iter().map(step_value).sum();
    Some(round(total / steps.len() as f64))
}

/// Coarse progress for a job state. Terminal states read as done, success or not.
pub fn state_progress(state: JobState) -> i64 {
    match state {
        JobState::Queued | JobState::Pending => 0,
        JobState::Running => 50,
        JobState::Succeeded | JobState::Failed | JobState::Cancelled => 100,
    }
}

/// Progress implied by a step state alone.
pub fn fallback_step_progress(state: StepState) -> i64 {
    match state {
        StepState::Succeeded => 100,
        StepState::Running => 50,
        _ => 0,
    }
}

/// Progress of one catalog entry: its own numeric progress, else the fallback.
pub fn step_progress(entry: &StepEntry) -> i64 {
    round(step_value(entry))
}

fn step_value(entry: &StepEntry) -> f64 {
    entry
        .progress
        .filter(|p| p.is_finite())
        .unwrap_or_else(|| fallback_step_progress(entry.state) as f64)
}

fn round(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
