// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dw-core: domain model and pure derivations for observing dubbing jobs

pub mod macros;

pub mod active;
pub mod catalog;
pub mod id;
pub mod job;
pub mod progress;
pub mod resource;
pub mod state;
pub mod view;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use active::resolve_active_step;
pub use catalog::{project, CanonicalStep, OrderedStepView, StepEntry};
#[cfg(any(test, feature = "test-support"))]
pub use job::JobSnapshotBuilder;
pub use job::{JobId, JobSnapshot, StepRecord};
pub use progress::{derive_overall_progress, fallback_step_progress, step_progress};
pub use resource::{ResourceRef, ResourceRefError, ResourceSlot, STORE_SCHEME};
pub use state::{JobState, StepState};
pub use view::{PipelineView, StepLine, TerminalSummary};
