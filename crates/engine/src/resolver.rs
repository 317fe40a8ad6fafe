// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Presigned URL resolution for a job's input and output media.
//!
//! Each slot tracks the reference it last saw. A new reference value
//! discards the slot's URL, error and any in-flight request; late results
//! for the old value are dropped by generation.

use dw_adapters::JobApi;
use dw_core::{JobSnapshot, ResourceRef, ResourceSlot};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Published state of one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceStatus {
    pub reference: Option<String>,
    pub url: Option<String>,
    pub error: Option<String>,
    pub loading: bool,
}

impl ResourceStatus {
    /// Whether this slot has caught up with `reference` and has nothing in flight.
    pub fn settled_for(&self, reference: Option<&str>) -> bool {
        !self.loading && self.reference.as_deref() == reference
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedResources {
    pub input: ResourceStatus,
    pub output: ResourceStatus,
}

impl ResolvedResources {
    pub fn slot(&self, slot: ResourceSlot) -> &ResourceStatus {
        match slot {
            ResourceSlot::Input => &self.input,
            ResourceSlot::Output => &self.output,
        }
    }

    /// Both slots reflect `snapshot`'s references and nothing is in flight.
    pub fn settled_for(&self, snapshot: &JobSnapshot) -> bool {
        ResourceSlot::ALL.iter().all(|slot| self.slot(*slot).settled_for(slot.reference(snapshot)))
    }
}

#[derive(Debug, Default)]
struct SlotState {
    reference: Option<String>,
    url: Option<String>,
    error: Option<String>,
    in_flight: bool,
    generation: u64,
}

impl SlotState {
    fn reset(&mut self, reference: Option<String>) {
        self.reference = reference;
        self.url = None;
        self.error = None;
        self.in_flight = false;
        self.generation += 1;
    }

    fn status(&self) -> ResourceStatus {
        ResourceStatus {
            reference: self.reference.clone(),
            url: self.url.clone(),
            error: self.error.clone(),
            loading: self.in_flight,
        }
    }
}

#[derive(Debug, Default)]
struct Slots {
    input: SlotState,
    output: SlotState,
    /// Bumped by every clear; background work from before a clear is dropped
    epoch: u64,
}

impl Slots {
    fn get_mut(&mut self, slot: ResourceSlot) -> &mut SlotState {
        match slot {
            ResourceSlot::Input => &mut self.input,
            ResourceSlot::Output => &mut self.output,
        }
    }

    fn status(&self) -> ResolvedResources {
        ResolvedResources { input: self.input.status(), output: self.output.status() }
    }
}

struct Shared<A> {
    api: A,
    slots: Mutex<Slots>,
    status: watch::Sender<ResolvedResources>,
}

/// Resolves storage references on snapshots into presigned URLs.
pub struct ResourceResolver<A: JobApi> {
    shared: Arc<Shared<A>>,
}

impl<A: JobApi> Clone for ResourceResolver<A> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<A: JobApi> ResourceResolver<A> {
    pub fn new(api: A) -> Self {
        let (status, _) = watch::channel(ResolvedResources::default());
        Self { shared: Arc::new(Shared { api, slots: Mutex::new(Slots::default()), status }) }
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolvedResources> {
        self.shared.status.subscribe()
    }

    pub fn resources(&self) -> ResolvedResources {
        self.shared.status.borrow().clone()
    }

    /// Resolve in the background.
    ///
    /// A clear issued before the task runs wins over this snapshot.
    pub fn observe(&self, snapshot: Arc<JobSnapshot>) {
        let epoch = self.shared.slots.lock().epoch;
        let resolver = self.clone();
        tokio::spawn(async move { resolver.resolve_in(epoch, &snapshot).await });
    }

    /// Bring both slots up to date with `snapshot`, resolving them concurrently.
    pub async fn resolve(&self, snapshot: &JobSnapshot) {
        let epoch = self.shared.slots.lock().epoch;
        self.resolve_in(epoch, snapshot).await;
    }

    async fn resolve_in(&self, epoch: u64, snapshot: &JobSnapshot) {
        tokio::join!(
            self.resolve_slot(epoch, ResourceSlot::Input, ResourceSlot::Input.reference(snapshot)),
            self.resolve_slot(epoch, ResourceSlot::Output, ResourceSlot::Output.reference(snapshot)),
        );
    }

    /// Forget the output so a fresh attempt resolves its own.
    pub fn clear_output(&self) {
        self.clear(&[ResourceSlot::Output]);
    }

    pub fn clear_all(&self) {
        self.clear(&ResourceSlot::ALL);
    }

    fn clear(&self, which: &[ResourceSlot]) {
        let mut slots = self.shared.slots.lock();
        slots.epoch += 1;
        for slot in which {
            slots.get_mut(*slot).reset(None);
        }
        self.shared.status.send_replace(slots.status());
    }

    async fn resolve_slot(&self, epoch: u64, slot: ResourceSlot, reference: Option<&str>) {
        let (resource, generation) = {
            let mut slots = self.shared.slots.lock();
            if slots.epoch != epoch {
                return;
            }
            let state = slots.get_mut(slot);
            if state.reference.as_deref() != reference {
                tracing::debug!(%slot, reference, "resource reference changed");
                state.reset(reference.map(str::to_string));
                self.shared.status.send_replace(slots.status());
            }

            let state = slots.get_mut(slot);
            let Some(reference) = reference else {
                return;
            };
            if state.url.is_some() || state.in_flight {
                return;
            }
            let resource = match ResourceRef::parse(reference) {
                Ok(resource) => resource,
                Err(e) => {
                    tracing::trace!(%slot, reference, error = %e, "skipping unresolvable reference");
                    return;
                }
            };

            state.in_flight = true;
            let generation = state.generation;
            self.shared.status.send_replace(slots.status());
            (resource, generation)
        };

        let result = self.shared.api.presign(&resource).await;

        let mut slots = self.shared.slots.lock();
        let state = slots.get_mut(slot);
        if state.generation != generation {
            tracing::debug!(%slot, %resource, "discarding stale presign result");
            return;
        }
        state.in_flight = false;
        match result {
            Ok(url) => {
                tracing::debug!(%slot, %resource, "resource resolved");
                state.url = Some(url);
                state.error = None;
            }
            Err(e) => {
                tracing::warn!(%slot, %resource, error = %e, "presign failed");
                state.error = Some(e.to_string());
            }
        }
        self.shared.status.send_replace(slots.status());
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
