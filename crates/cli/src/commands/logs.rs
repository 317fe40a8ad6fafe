// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dubwatch logs` - Fetch or export a job's logs
//!
//! The service owns the log format; the body is passed through as JSON.

use crate::config::Config;
use crate::output::OutputFormat;
use anyhow::{Context, Result};
use dw_adapters::JobApi;
use dw_core::JobId;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub async fn handle(
    config: &Config,
    id: Option<String>,
    file: Option<Option<PathBuf>>,
    format: OutputFormat,
) -> Result<()> {
    let job_id = super::explicit_or_saved(config, id)?;
    let api = super::http_api(config)?;
    let logs = fetch(&api, &job_id).await?;

    let Some(file) = file else {
        println!("{}", render(&job_id, &logs, format)?);
        return Ok(());
    };

    let path = file.unwrap_or_else(|| PathBuf::from(export_name(&job_id)));
    std::fs::write(&path, serde_json::to_string_pretty(&logs)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(%job_id, path = %path.display(), "logs exported");
    println!("{}", saved(&job_id, &path, format)?);
    Ok(())
}

pub async fn fetch<A: JobApi>(api: &A, job_id: &JobId) -> Result<Value> {
    api.job_logs(job_id).await.with_context(|| format!("failed to fetch logs for job {job_id}"))
}

/// Default export file, `job-{id}-logs.json`.
pub fn export_name(job_id: &JobId) -> String {
    format!("job-{job_id}-logs.json")
}

pub fn render(job_id: &JobId, logs: &Value, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => serde_json::to_string_pretty(logs)?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(&serde_json::json!({ "job_id": job_id, "logs": logs }))?
        }
    })
}

fn saved(job_id: &JobId, path: &Path, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format!("Saved logs for job {job_id} to {}", path.display()),
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "job_id": job_id,
            "file": path.display().to_string(),
        }))?,
    })
}

#[cfg(test)]
#[path = "logs_tests.rs"]
mod tests;
