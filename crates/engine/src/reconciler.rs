// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job status reconciler.
//!
//! Polls the service for one job at a time and publishes normalized
//! snapshots on a `watch` channel. Every change of target bumps a
//! generation counter; results carrying an older generation are dropped
//! before they reach subscribers.
//!
//! ```text
//! Idle --set_job(Some)--> Polling --terminal--> Stopped
//!   ^                        |  ^                  |
//!   +------set_job(None)-----+  +---refresh: live--+
//! ```

use dw_adapters::{ApiError, JobApi};
use dw_core::{JobId, JobSnapshot};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default delay between the end of one poll and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2500);

/// Scheduler phase of the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// No job selected
    Idle,
    /// Loop task is alive
    Polling,
    /// Job reached a terminal state; no further fetches until refresh or a new id
    Stopped,
}

dw_core::simple_display! {
    PollPhase {
        Idle => "idle",
        Polling => "polling",
        Stopped => "stopped",
    }
}

/// What subscribers see.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobStatus {
    pub job_id: Option<JobId>,
    /// Last successfully fetched snapshot; survives later fetch errors
    pub snapshot: Option<Arc<JobSnapshot>>,
    /// True until the first result for `job_id` lands
    pub loading: bool,
    /// Message from the most recent failed fetch, cleared by the next success
    pub error: Option<String>,
}

impl JobStatus {
    fn pending(job_id: Option<JobId>) -> Self {
        Self { loading: job_id.is_some(), job_id, snapshot: None, error: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Poll,
    Refresh,
}

/// Outcome of applying one fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    /// Target changed while the request was in flight
    Stale,
    Live,
    Terminal,
    Failed,
}

struct Inner {
    job_id: Option<JobId>,
    generation: u64,
    phase: PollPhase,
    task: Option<JoinHandle<()>>,
    /// Serializes polls and refreshes for the current generation only
    flight: Arc<tokio::sync::Mutex<()>>,
}

struct Shared<A> {
    api: A,
    interval: Duration,
    inner: Mutex<Inner>,
    status: watch::Sender<JobStatus>,
}

/// Polls one job and publishes [`JobStatus`] updates.
///
/// Cloning yields another handle to the same reconciler.
pub struct JobStatusReconciler<A: JobApi> {
    shared: Arc<Shared<A>>,
}

impl<A: JobApi> Clone for JobStatusReconciler<A> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<A: JobApi> JobStatusReconciler<A> {
    pub fn new(api: A, interval: Duration) -> Self {
        let (status, _) = watch::channel(JobStatus::default());
        let inner = Inner {
            job_id: None,
            generation: 0,
            phase: PollPhase::Idle,
            task: None,
            flight: Arc::new(tokio::sync::Mutex::new(())),
        };
        Self { shared: Arc::new(Shared { api, interval, inner: Mutex::new(inner), status }) }
    }

    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.shared.status.subscribe()
    }

    pub fn status(&self) -> JobStatus {
        self.shared.status.borrow().clone()
    }

    pub fn phase(&self) -> PollPhase {
        self.shared.inner.lock().phase
    }

    pub fn job_id(&self) -> Option<JobId> {
        self.shared.inner.lock().job_id.clone()
    }

    /// Point the reconciler at a job, or at nothing.
    ///
    /// Setting the id already being observed is a no-op. Anything else
    /// tears down the running loop, resets the published status and, for
    /// `Some`, starts polling with an immediate fetch.
    pub fn set_job(&self, job_id: Option<JobId>) {
        let mut inner = self.shared.inner.lock();
        if job_id.is_some() && inner.job_id == job_id {
            return;
        }

        self.shared.retarget(&mut inner, job_id.clone());
        self.shared.status.send_replace(JobStatus::pending(job_id.clone()));

        match job_id {
            Some(id) => {
                tracing::info!(job_id = %id, generation = inner.generation, "polling started");
                inner.phase = PollPhase::Polling;
                inner.task = Some(spawn_poll_loop(&self.shared, id, inner.generation, false));
            }
            None => {
                tracing::debug!(generation = inner.generation, "reconciler cleared");
            }
        }
    }

    /// Fetch once, out of band, and publish the result like a poll.
    ///
    /// Does not reset the poll timer. A terminal result stops a running
    /// loop; a live result while stopped re-arms polling one interval out.
    /// Without a job this does nothing.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let target = {
            let inner = self.shared.inner.lock();
            inner.job_id.clone().map(|id| (id, inner.generation))
        };
        let Some((id, generation)) = target else {
            return Ok(());
        };

        match self.shared.fetch(&id, generation, Origin::Refresh).await {
            (Applied::Failed, Some(error)) => Err(error),
            _ => Ok(()),
        }
    }

    /// Stop polling and discard anything in flight.
    ///
    /// The last published status stays readable.
    pub fn shutdown(&self) {
        let mut inner = self.shared.inner.lock();
        let job_id = inner.job_id.take();
        self.shared.retarget(&mut inner, None);
        if let Some(id) = job_id {
            tracing::info!(job_id = %id, "reconciler shut down");
        }
    }
}

impl<A: JobApi> Shared<A> {
    /// Abort the loop and start a new generation for `job_id`.
    fn retarget(&self, inner: &mut Inner, job_id: Option<JobId>) {
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        inner.generation += 1;
        inner.flight = Arc::new(tokio::sync::Mutex::new(()));
        inner.job_id = job_id;
        inner.phase = PollPhase::Idle;
    }

    async fn fetch(
        self: &Arc<Self>,
        id: &JobId,
        generation: u64,
        origin: Origin,
    ) -> (Applied, Option<ApiError>) {
        let flight = {
            let inner = self.inner.lock();
            if inner.generation != generation {
                return (Applied::Stale, None);
            }
            Arc::clone(&inner.flight)
        };
        let _flight = flight.lock().await;

        tracing::debug!(job_id = %id, ?origin, "fetching job status");
        let result = self.api.job_status(id).await;
        self.apply(id, generation, origin, result)
    }

    fn apply(
        self: &Arc<Self>,
        id: &JobId,
        generation: u64,
        origin: Origin,
        result: Result<dw_wire::RawJobStatus, ApiError>,
    ) -> (Applied, Option<ApiError>) {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            tracing::debug!(job_id = %id, generation, current = inner.generation, "discarding stale status");
            return (Applied::Stale, None);
        }

        let snapshot = match result {
            Ok(raw) => raw.into_snapshot(id),
            Err(error) => {
                tracing::warn!(job_id = %id, error = %error, "status fetch failed");
                self.status.send_modify(|status| {
                    status.loading = false;
                    status.error = Some(error.to_string());
                });
                return (Applied::Failed, Some(error));
            }
        };

        let terminal = snapshot.is_terminal();
        let state = snapshot.state;
        self.status.send_modify(|status| {
            status.snapshot = Some(Arc::new(snapshot));
            status.loading = false;
            status.error = None;
        });

        match (origin, terminal, inner.phase) {
            (Origin::Poll, true, _) => {
                tracing::info!(job_id = %id, state = ?state, "job finished, polling stopped");
                // The loop exits on its own; dropping the handle detaches it
                inner.task = None;
                inner.phase = PollPhase::Stopped;
            }
            (Origin::Refresh, true, PollPhase::Polling) => {
                tracing::info!(job_id = %id, state = ?state, "job finished, polling stopped");
                if let Some(task) = inner.task.take() {
                    task.abort();
                }
                inner.phase = PollPhase::Stopped;
            }
            (Origin::Refresh, false, PollPhase::Stopped) => {
                tracing::info!(job_id = %id, state = ?state, "job active again, polling resumed");
                inner.phase = PollPhase::Polling;
                inner.task = Some(spawn_poll_loop(self, id.clone(), generation, true));
            }
            _ => {}
        }

        if terminal {
            (Applied::Terminal, None)
        } else {
            (Applied::Live, None)
        }
    }
}

impl<A> Drop for Shared<A> {
    fn drop(&mut self) {
        if let Some(task) = self.inner.get_mut().task.take() {
            task.abort();
        }
    }
}

/// Spawn the loop for one generation.
///
/// The task holds only a weak handle, so dropping every reconciler handle
/// ends it.
fn spawn_poll_loop<A: JobApi>(
    shared: &Arc<Shared<A>>,
    id: JobId,
    generation: u64,
    delay_first: bool,
) -> JoinHandle<()> {
    let weak = Arc::downgrade(shared);
    let interval = shared.interval;
    tokio::spawn(poll_loop(weak, id, generation, interval, delay_first))
}

async fn poll_loop<A: JobApi>(
    shared: Weak<Shared<A>>,
    id: JobId,
    generation: u64,
    interval: Duration,
    delay_first: bool,
) {
    if delay_first {
        tokio::time::sleep(interval).await;
    }
    loop {
        let Some(strong) = shared.upgrade() else {
            return;
        };
        let (applied, _) = strong.fetch(&id, generation, Origin::Poll).await;
        drop(strong);

        match applied {
            Applied::Live | Applied::Failed => tokio::time::sleep(interval).await,
            Applied::Terminal | Applied::Stale => return,
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
