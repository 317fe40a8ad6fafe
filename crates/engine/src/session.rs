// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A watching session: reconciler, resolver and persisted job id wired
//! together.

use crate::lifecycle::LifecycleController;
use crate::reconciler::{JobStatus, JobStatusReconciler};
use crate::resolver::{ResolvedResources, ResourceResolver};
use dw_adapters::{JobApi, JobIdStore, StoreError};
use dw_core::{JobId, JobSnapshot, PipelineView};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct JobSession<A: JobApi, S: JobIdStore> {
    reconciler: JobStatusReconciler<A>,
    resolver: ResourceResolver<A>,
    api: A,
    store: S,
    /// Jobs with a retry/cancel in flight, shared by every controller
    pending: Arc<Mutex<HashSet<JobId>>>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl<A: JobApi, S: JobIdStore> JobSession<A, S> {
    /// Create an idle session and start feeding snapshots to the resolver.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(api: A, store: S, interval: Duration) -> Self {
        let reconciler = JobStatusReconciler::new(api.clone(), interval);
        let resolver = ResourceResolver::new(api.clone());
        let driver = spawn_driver(reconciler.subscribe(), resolver.clone());
        Self {
            reconciler,
            resolver,
            api,
            store,
            pending: Arc::default(),
            driver: Mutex::new(Some(driver)),
        }
    }

    /// Watch `job_id`, remembering it for [`JobSession::resume`].
    pub fn open(&self, job_id: JobId) -> Result<(), StoreError> {
        self.store.save(&job_id)?;
        if self.reconciler.job_id().as_ref() != Some(&job_id) {
            self.resolver.clear_all();
            self.reconciler.set_job(Some(job_id));
        }
        Ok(())
    }

    /// Start over with a freshly created job.
    pub fn start_new(&self, job_id: JobId) -> Result<(), StoreError> {
        self.reconciler.set_job(None);
        self.resolver.clear_all();
        self.store.clear()?;
        self.open(job_id)
    }

    /// Re-open the persisted job, if there is one.
    pub fn resume(&self) -> Result<Option<JobId>, StoreError> {
        let Some(job_id) = self.store.load()? else {
            return Ok(None);
        };
        tracing::info!(%job_id, "resuming saved job");
        self.open(job_id.clone())?;
        Ok(Some(job_id))
    }

    /// Forget the persisted job and stop watching.
    pub fn forget(&self) -> Result<(), StoreError> {
        self.reconciler.set_job(None);
        self.resolver.clear_all();
        self.store.clear()
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.reconciler.job_id()
    }

    pub fn status(&self) -> JobStatus {
        self.reconciler.status()
    }

    pub fn snapshot(&self) -> Option<Arc<JobSnapshot>> {
        self.reconciler.status().snapshot
    }

    pub fn resources(&self) -> ResolvedResources {
        self.resolver.resources()
    }

    /// Render model for the latest snapshot.
    pub fn view(&self) -> Option<PipelineView> {
        self.snapshot().map(|s| PipelineView::from_snapshot(&s))
    }

    pub fn subscribe_status(&self) -> watch::Receiver<JobStatus> {
        self.reconciler.subscribe()
    }

    pub fn subscribe_resources(&self) -> watch::Receiver<ResolvedResources> {
        self.resolver.subscribe()
    }

    pub fn reconciler(&self) -> &JobStatusReconciler<A> {
        &self.reconciler
    }

    pub fn controller(&self) -> LifecycleController<A, S> {
        LifecycleController::with_guard(
            self.reconciler.clone(),
            self.resolver.clone(),
            self.api.clone(),
            self.store.clone(),
            Arc::clone(&self.pending),
        )
    }

    /// Stop polling and resolution. The persisted id is kept.
    pub fn close(&self) {
        if let Some(driver) = self.driver.lock().take() {
            driver.abort();
        }
        self.reconciler.shutdown();
    }
}

impl<A: JobApi, S: JobIdStore> Drop for JobSession<A, S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Hand each newly published snapshot to the resolver.
fn spawn_driver<A: JobApi>(
    mut status: watch::Receiver<JobStatus>,
    resolver: ResourceResolver<A>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last: Option<Arc<JobSnapshot>> = None;
        while status.changed().await.is_ok() {
            let Some(snapshot) = status.borrow_and_update().snapshot.clone() else {
                last = None;
                continue;
            };
            if last.as_ref().is_some_and(|prev| Arc::ptr_eq(prev, &snapshot)) {
                continue;
            }
            resolver.observe(Arc::clone(&snapshot));
            last = Some(snapshot);
        }
    })
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
