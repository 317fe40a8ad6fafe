// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::reconciler::{PollPhase, DEFAULT_POLL_INTERVAL};
use crate::resolver::{ResolvedResources, ResourceStatus};
use dw_adapters::{ApiCall, FakeJobApi, MemoryJobIdStore};
use dw_core::JobState;
use serde_json::json;
use std::time::Duration;

const INPUT: &str = "store://media/in.mp4";
const OUTPUT: &str = "store://media/out-1.mp4";

struct Harness {
    api: FakeJobApi,
    store: MemoryJobIdStore,
    reconciler: JobStatusReconciler<FakeJobApi>,
    resolver: ResourceResolver<FakeJobApi>,
    controller: LifecycleController<FakeJobApi, MemoryJobIdStore>,
}

fn harness() -> Harness {
    let api = FakeJobApi::new();
    let store = MemoryJobIdStore::new();
    let reconciler = JobStatusReconciler::new(api.clone(), DEFAULT_POLL_INTERVAL);
    let resolver = ResourceResolver::new(api.clone());
    let controller =
        LifecycleController::new(reconciler.clone(), resolver.clone(), api.clone(), store.clone());
    Harness { api, store, reconciler, resolver, controller }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Watch a failed job whose resources have been resolved.
async fn failed_job(h: &Harness) {
    h.api.push_status(
        "j1",
        json!({ "state": "failed", "input_ref": INPUT, "output_ref": OUTPUT, "retry_count": 0 }),
    );
    h.store.save(&JobId::new("j1")).unwrap();
    h.reconciler.set_job(Some(JobId::new("j1")));
    settle().await;
    let snapshot = h.reconciler.status().snapshot.unwrap();
    h.resolver.resolve(&snapshot).await;
    assert_eq!(h.reconciler.phase(), PollPhase::Stopped);
}

fn count(api: &FakeJobApi, call: &ApiCall) -> usize {
    api.calls().iter().filter(|c| *c == call).count()
}

#[tokio::test(start_paused = true)]
async fn actions_require_an_active_job() {
    let h = harness();

    assert!(matches!(h.controller.retry().await, Err(LifecycleError::NoActiveJob)));
    assert!(matches!(h.controller.cancel().await, Err(LifecycleError::NoActiveJob)));
    assert!(h.api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn retry_clears_output_and_fetches_once() {
    let h = harness();
    failed_job(&h).await;
    assert_eq!(h.api.status_calls("j1"), 1);
    h.api.push_status("j1", json!({ "state": "queued", "input_ref": INPUT, "retry_count": 1 }));

    let outcome = h.controller.retry().await.unwrap();

    assert_eq!(outcome, ActionOutcome::Done);
    assert_eq!(count(&h.api, &ApiCall::Retry(JobId::new("j1"))), 1);
    assert_eq!(h.api.status_calls("j1"), 2);

    let resources = h.resolver.resources();
    assert_eq!(resources.output, ResourceStatus::default());
    assert!(resources.input.url.is_some());

    let snapshot = h.reconciler.status().snapshot.unwrap();
    assert_eq!(snapshot.state, Some(JobState::Queued));
    assert_eq!(snapshot.retry_count, 1);
    assert_eq!(h.reconciler.phase(), PollPhase::Polling);
    assert!(!h.controller.is_pending(&JobId::new("j1")));
}

#[tokio::test(start_paused = true)]
async fn retry_rejection_changes_nothing() {
    let h = harness();
    failed_job(&h).await;
    h.api.fail_retry(ApiError::Server { status: 400, message: "Job is not retryable".into() });

    let err = h.controller.retry().await.unwrap_err();

    assert_eq!(err.to_string(), "Job is not retryable");
    assert_eq!(h.api.status_calls("j1"), 1);
    assert!(h.resolver.resources().output.url.is_some());
    assert_eq!(h.reconciler.phase(), PollPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn concurrent_retry_is_skipped() {
    let h = harness();
    failed_job(&h).await;
    let call = ApiCall::Retry(JobId::new("j1"));
    h.api.hold(call.clone());

    let first = tokio::spawn({
        let controller = h.controller.clone();
        async move { controller.retry().await }
    });
    settle().await;
    assert!(h.controller.is_pending(&JobId::new("j1")));

    assert_eq!(h.controller.retry().await.unwrap(), ActionOutcome::Skipped);
    assert_eq!(h.controller.cancel().await.unwrap(), ActionOutcome::Skipped);
    assert_eq!(count(&h.api, &call), 1);
    assert_eq!(count(&h.api, &ApiCall::Cancel(JobId::new("j1"))), 0);

    h.api.release(&call);
    assert_eq!(first.await.unwrap().unwrap(), ActionOutcome::Done);
    assert!(!h.controller.is_pending(&JobId::new("j1")));
}

#[tokio::test(start_paused = true)]
async fn failed_retry_releases_the_guard() {
    let h = harness();
    failed_job(&h).await;
    h.api.fail_retry(ApiError::Transport("reset".into()));

    assert!(h.controller.retry().await.is_err());
    assert!(!h.controller.is_pending(&JobId::new("j1")));
}

#[tokio::test(start_paused = true)]
async fn cancel_resets_everything() {
    let h = harness();
    h.api.push_status("j1", json!({ "state": "running", "input_ref": INPUT }));
    h.store.save(&JobId::new("j1")).unwrap();
    h.reconciler.set_job(Some(JobId::new("j1")));
    settle().await;
    h.resolver.resolve(&h.reconciler.status().snapshot.unwrap()).await;

    assert_eq!(h.controller.cancel().await.unwrap(), ActionOutcome::Done);

    assert_eq!(h.reconciler.job_id(), None);
    assert_eq!(h.reconciler.phase(), PollPhase::Idle);
    assert!(h.reconciler.status().snapshot.is_none());
    assert_eq!(h.resolver.resources(), ResolvedResources::default());
    assert_eq!(h.store.load().unwrap(), None);

    tokio::time::sleep(DEFAULT_POLL_INTERVAL * 4).await;
    assert_eq!(h.api.status_calls("j1"), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_rejection_keeps_state() {
    let h = harness();
    h.api.push_status("j1", json!({ "state": "succeeded", "output_ref": OUTPUT }));
    h.store.save(&JobId::new("j1")).unwrap();
    h.reconciler.set_job(Some(JobId::new("j1")));
    settle().await;
    h.resolver.resolve(&h.reconciler.status().snapshot.unwrap()).await;
    h.api.fail_cancel(ApiError::Server { status: 409, message: "Job already finished".into() });

    let err = h.controller.cancel().await.unwrap_err();

    assert!(matches!(err, LifecycleError::Api(ApiError::Server { status: 409, .. })));
    assert_eq!(h.reconciler.job_id(), Some(JobId::new("j1")));
    assert!(h.reconciler.status().snapshot.is_some());
    assert!(h.resolver.resources().output.url.is_some());
    assert_eq!(h.store.load().unwrap(), Some(JobId::new("j1")));
}
