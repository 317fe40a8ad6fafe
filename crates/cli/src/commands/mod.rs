// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod action;
pub mod forget;
pub mod logs;
pub mod status;
pub mod watch;

use crate::config::Config;
use crate::exit_error::{codes, ExitError};
use anyhow::Result;
use dw_adapters::{FileJobIdStore, HttpJobApi, JobApi, JobIdStore};
use dw_core::JobId;
use dw_engine::{JobSession, JobStatus};

pub type CliSession = JobSession<HttpJobApi, FileJobIdStore>;

pub fn http_api(config: &Config) -> Result<HttpJobApi> {
    Ok(HttpJobApi::new(config.http_settings())?)
}

pub fn file_store(config: &Config) -> FileJobIdStore {
    FileJobIdStore::new(&config.state_dir)
}

/// Must be called inside the runtime; the session spawns its tasks there.
pub fn open_session(config: &Config) -> Result<CliSession> {
    Ok(JobSession::new(http_api(config)?, file_store(config), config.poll_interval))
}

/// Point `session` at `id`, or at the saved job when no id is given.
pub fn attach<A: JobApi, S: JobIdStore>(
    session: &JobSession<A, S>,
    id: Option<String>,
) -> Result<JobId> {
    match id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty()) {
        Some(id) => {
            let job_id = JobId::new(id);
            session.open(job_id.clone())?;
            Ok(job_id)
        }
        None => session.resume()?.ok_or_else(|| no_saved_job().into()),
    }
}

/// Resolve `id`, falling back to the saved job, without touching the store.
pub fn explicit_or_saved(config: &Config, id: Option<String>) -> Result<JobId> {
    match id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty()) {
        Some(id) => Ok(JobId::new(id)),
        None => file_store(config).load()?.ok_or_else(|| no_saved_job().into()),
    }
}

pub fn no_saved_job() -> ExitError {
    ExitError::new(codes::NOT_FOUND, "no saved job; pass a job id")
}

/// Wait for the first completed fetch, successful or not.
pub async fn first_status(mut rx: tokio::sync::watch::Receiver<JobStatus>) -> JobStatus {
    let waited = rx
        .wait_for(|s| !s.loading && (s.snapshot.is_some() || s.error.is_some()))
        .await
        .map(|status| status.clone());
    match waited {
        Ok(status) => status,
        Err(_) => rx.borrow().clone(),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
