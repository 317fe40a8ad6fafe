// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::job::{JobSnapshot, StepRecord};
use crate::state::{JobState, StepState};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for snapshot data.
pub mod strategies {
    use crate::catalog::CanonicalStep;
    use crate::job::StepRecord;
    use crate::state::{JobState, StepState};
    use proptest::prelude::*;

    pub fn arb_job_state() -> impl Strategy<Value = Option<JobState>> {
        prop_oneof![
            Just(None),
            Just(Some(JobState::Queued)),
            Just(Some(JobState::Pending)),
            Just(Some(JobState::Running)),
            Just(Some(JobState::Succeeded)),
            Just(Some(JobState::Failed)),
            Just(Some(JobState::Cancelled)),
        ]
    }

    pub fn arb_step_state() -> impl Strategy<Value = StepState> {
        prop_oneof![
            Just(StepState::Pending),
            Just(StepState::Queued),
            Just(StepState::Running),
            Just(StepState::Retrying),
            Just(StepState::Succeeded),
            Just(StepState::Failed),
            Just(StepState::Cancelled),
            Just(StepState::Unknown),
        ]
    }

    pub fn arb_step_name() -> impl Strategy<Value = String> {
        prop_oneof![
            4 => proptest::sample::select(CanonicalStep::ALL.to_vec())
                .prop_map(|s| s.as_str().to_string()),
            1 => "[a-z_]{1,12}",
        ]
    }

    pub fn arb_step_record() -> impl Strategy<Value = StepRecord> {
        (arb_step_name(), arb_step_state(), proptest::option::of(0.0f64..=100.0)).prop_map(
            |(name, state, progress)| StepRecord {
                name,
                state,
                progress,
                started_at: None,
                finished_at: None,
            },
        )
    }

    pub fn arb_step_records() -> impl Strategy<Value = Vec<StepRecord>> {
        proptest::collection::vec(arb_step_record(), 0..10)
    }
}

// ── Snapshot factory functions ──────────────────────────────────────────

/// Snapshot in the given state with no step data.
pub fn snapshot(id: &str, state: JobState) -> JobSnapshot {
    JobSnapshot::builder().id(id).state(Some(state)).build()
}

/// Snapshot whose steps up to (not including) `running` have succeeded.
pub fn snapshot_running_at(id: &str, running: &str) -> JobSnapshot {
    let mut steps = Vec::new();
    for step in crate::catalog::CanonicalStep::ALL {
        if step.as_str() == running {
            steps.push(StepRecord::new(step.as_str(), StepState::Running));
            break;
        }
        steps.push(StepRecord::new(step.as_str(), StepState::Succeeded));
    }
    JobSnapshot::builder()
        .id(id)
        .state(Some(JobState::Running))
        .current_step(running)
        .steps(steps)
        .build()
}
