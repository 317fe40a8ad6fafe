// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-initiated retry and cancel.
//!
//! The server owns every state transition; this controller only issues the
//! request and then nudges the reconciler and resolver so the next view
//! reflects the new attempt.

use crate::reconciler::JobStatusReconciler;
use crate::resolver::ResourceResolver;
use dw_adapters::{ApiError, JobApi, JobIdStore, StoreError};
use dw_core::JobId;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("no job is being watched")]
    NoActiveJob,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to update saved job: {0}")]
    Store(#[from] StoreError),
}

/// Result of a lifecycle action that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    /// Another action for the same job was still pending
    Skipped,
}

dw_core::simple_display! {
    ActionOutcome {
        Done => "done",
        Skipped => "skipped",
    }
}

/// Issues retry/cancel for the reconciler's current job.
pub struct LifecycleController<A: JobApi, S: JobIdStore> {
    reconciler: JobStatusReconciler<A>,
    resolver: ResourceResolver<A>,
    api: A,
    store: S,
    pending: Arc<Mutex<HashSet<JobId>>>,
}

impl<A: JobApi, S: JobIdStore> Clone for LifecycleController<A, S> {
    fn clone(&self) -> Self {
        Self {
            reconciler: self.reconciler.clone(),
            resolver: self.resolver.clone(),
            api: self.api.clone(),
            store: self.store.clone(),
            pending: Arc::clone(&self.pending),
        }
    }
}

/// Marks a job as having an action in flight until dropped.
struct PendingGuard {
    pending: Arc<Mutex<HashSet<JobId>>>,
    job_id: JobId,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.job_id);
    }
}

impl<A: JobApi, S: JobIdStore> LifecycleController<A, S> {
    pub fn new(
        reconciler: JobStatusReconciler<A>,
        resolver: ResourceResolver<A>,
        api: A,
        store: S,
    ) -> Self {
        Self::with_guard(reconciler, resolver, api, store, Arc::default())
    }

    /// Like [`Self::new`], but sharing the in-flight set with other controllers.
    pub fn with_guard(
        reconciler: JobStatusReconciler<A>,
        resolver: ResourceResolver<A>,
        api: A,
        store: S,
        pending: Arc<Mutex<HashSet<JobId>>>,
    ) -> Self {
        Self { reconciler, resolver, api, store, pending }
    }

    /// Ask the server to start a new attempt of the current job.
    ///
    /// On success the output resource is forgotten and the job is fetched
    /// once, which re-arms polling if it had stopped.
    pub async fn retry(&self) -> Result<ActionOutcome, LifecycleError> {
        let job_id = self.reconciler.job_id().ok_or(LifecycleError::NoActiveJob)?;
        let Some(_guard) = self.begin(&job_id) else {
            tracing::debug!(%job_id, "retry skipped, action already pending");
            return Ok(ActionOutcome::Skipped);
        };

        self.api.retry_job(&job_id).await?;
        tracing::info!(%job_id, "retry accepted");

        self.resolver.clear_output();
        if let Err(e) = self.reconciler.refresh().await {
            // Already published on the status channel; polling carries on
            tracing::warn!(%job_id, error = %e, "refresh after retry failed");
        }
        Ok(ActionOutcome::Done)
    }

    /// Cancel the current job and reset to a clean slate.
    ///
    /// On failure nothing local changes.
    pub async fn cancel(&self) -> Result<ActionOutcome, LifecycleError> {
        let job_id = self.reconciler.job_id().ok_or(LifecycleError::NoActiveJob)?;
        let Some(_guard) = self.begin(&job_id) else {
            tracing::debug!(%job_id, "cancel skipped, action already pending");
            return Ok(ActionOutcome::Skipped);
        };

        self.api.cancel_job(&job_id).await?;
        tracing::info!(%job_id, "cancel accepted");

        self.reconciler.set_job(None);
        self.resolver.clear_all();
        self.store.clear()?;
        Ok(ActionOutcome::Done)
    }

    /// Whether an action is pending for `job_id`.
    pub fn is_pending(&self, job_id: &JobId) -> bool {
        self.pending.lock().contains(job_id)
    }

    fn begin(&self, job_id: &JobId) -> Option<PendingGuard> {
        if !self.pending.lock().insert(job_id.clone()) {
            return None;
        }
        Some(PendingGuard { pending: Arc::clone(&self.pending), job_id: job_id.clone() })
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
