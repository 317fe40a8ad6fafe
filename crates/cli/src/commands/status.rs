// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dubwatch status` - Fetch a job once and print it

use crate::config::Config;
use crate::exit_error::{codes, ExitError};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use dw_adapters::JobApi;
use dw_core::{JobId, PipelineView};
use dw_engine::{JobStatus, JobStatusReconciler, ResolvedResources, ResourceResolver};
use std::time::Duration;

pub async fn handle(config: &Config, id: Option<String>, format: OutputFormat) -> Result<()> {
    let job_id = super::explicit_or_saved(config, id)?;
    let api = super::http_api(config)?;

    let (status, resources) = fetch_once(api, job_id).await;
    let view = status.snapshot.as_ref().map(|s| PipelineView::from_snapshot(s));
    output::print_report(format, view.as_ref(), &status, &resources)?;

    // The error was already part of the report
    if view.is_none() {
        return Err(ExitError::silent(codes::FAILURE).into());
    }
    Ok(())
}

/// One status fetch, then resolution of whatever resources it names.
///
/// Nothing is persisted and no polling continues afterwards.
pub async fn fetch_once<A: JobApi>(api: A, job_id: JobId) -> (JobStatus, ResolvedResources) {
    // The interval never elapses: the reconciler is shut down after one fetch
    let reconciler = JobStatusReconciler::new(api.clone(), Duration::from_secs(3600));
    let rx = reconciler.subscribe();
    reconciler.set_job(Some(job_id));
    let status = super::first_status(rx).await;
    reconciler.shutdown();

    let resolver = ResourceResolver::new(api);
    if let Some(snapshot) = &status.snapshot {
        resolver.resolve(snapshot).await;
    }
    (status, resolver.resources())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
