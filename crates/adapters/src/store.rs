// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence of the active job id across restarts.

use dw_core::JobId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// File name under the state directory
pub const CURRENT_JOB_FILE: &str = "current_job.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Port for remembering which job the user is watching
pub trait JobIdStore: Clone + Send + Sync + 'static {
    fn load(&self) -> Result<Option<JobId>, StoreError>;
    fn save(&self, id: &JobId) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct CurrentJob {
    job_id: JobId,
}

/// Stores the id as `{state_dir}/current_job.json`.
#[derive(Debug, Clone)]
pub struct FileJobIdStore {
    path: PathBuf,
}

impl FileJobIdStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self { path: state_dir.as_ref().join(CURRENT_JOB_FILE) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JobIdStore for FileJobIdStore {
    fn load(&self) -> Result<Option<JobId>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let current: CurrentJob = serde_json::from_slice(&bytes)?;
        if current.job_id.is_empty() {
            return Ok(None);
        }
        Ok(Some(current.job_id))
    }

    fn save(&self, id: &JobId) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_vec_pretty(&CurrentJob { job_id: id.clone() })?;

        // Write then rename so a crash never leaves a torn file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(job_id = %id, path = %self.path.display(), "saved current job");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "cleared current job");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryJobIdStore {
    inner: Arc<Mutex<Option<JobId>>>,
}

impl MemoryJobIdStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<JobId>) -> Self {
        Self { inner: Arc::new(Mutex::new(Some(id.into()))) }
    }
}

impl JobIdStore for MemoryJobIdStore {
    fn load(&self) -> Result<Option<JobId>, StoreError> {
        Ok(self.inner.lock().clone())
    }

    fn save(&self, id: &JobId) -> Result<(), StoreError> {
        *self.inner.lock() = Some(id.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.inner.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
