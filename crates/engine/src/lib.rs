// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dw-engine: polling, resource resolution and lifecycle actions for one job

pub mod lifecycle;
pub mod reconciler;
pub mod resolver;
pub mod session;

pub use lifecycle::{ActionOutcome, LifecycleController, LifecycleError};
pub use reconciler::{JobStatus, JobStatusReconciler, PollPhase, DEFAULT_POLL_INTERVAL};
pub use resolver::{ResolvedResources, ResourceResolver, ResourceStatus};
pub use session::JobSession;
