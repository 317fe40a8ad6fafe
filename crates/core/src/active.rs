// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolution of the "current" pipeline step.

use crate::catalog::OrderedStepView;
use crate::job::JobSnapshot;
use crate::state::StepState;

/// Determine which step is active, by precedence:
/// 1. the server's explicit `current_step`
/// 2. the first running step in catalog order
/// 3. the most advanced succeeded step (covers the gap between one step
///    finishing and the next starting)
pub fn resolve_active_step<'a>(
    snapshot: &'a JobSnapshot,
    steps: &'a OrderedStepView,
) -> Option<&'a str> {
    if let Some(current) = snapshot.current_step.as_deref().filter(|s| !s.is_empty()) {
        return Some(current);
    }

    if let Some(running) = steps.iter().find(|e| e.state == StepState::Running) {
        return Some(running.name());
    }

    steps.iter().rev().find(|e| e.state == StepState::Succeeded).map(|e| e.name())
}

#[cfg(test)]
#[path = "active_tests.rs"]
mod tests;
