// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dubwatch watch` - Follow a job until it finishes

use crate::config::Config;
use crate::exit_error::{codes, ExitError};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use dw_adapters::{JobApi, JobIdStore};
use dw_core::{PipelineView, TerminalSummary};
use dw_engine::{JobSession, JobStatus, ResolvedResources};
use std::io::Write;

pub async fn handle(config: &Config, id: Option<String>, format: OutputFormat) -> Result<()> {
    let session = super::open_session(config)?;
    let job_id = super::attach(&session, id)?;
    tracing::debug!(%job_id, "watching");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last_printed = String::new();
    let finished = tokio::select! {
        view = follow(&session, |status, resources| {
            let view = status.snapshot.as_ref().map(|s| PipelineView::from_snapshot(s));
            let rendered = match format {
                OutputFormat::Text => output::render_text(view.as_ref(), status, resources),
                OutputFormat::Json => {
                    output::render_json(view.as_ref(), status, resources).to_string() + "\n"
                }
            };
            if rendered != last_printed {
                if format == OutputFormat::Text && !last_printed.is_empty() {
                    println!();
                }
                print!("{rendered}");
                let _ = std::io::stdout().flush();
                last_printed = rendered;
            }
        }) => view,
        _ = &mut ctrl_c => {
            session.close();
            return Err(ExitError::silent(codes::INTERRUPTED).into());
        }
    };
    session.close();
    exit_for(finished.as_ref())
}

/// Report every change of status or resources until the job has finished
/// and its resources have caught up. Returns the final view, or `None` if
/// the session went away first.
pub async fn follow<A, S, F>(session: &JobSession<A, S>, mut on_change: F) -> Option<PipelineView>
where
    A: JobApi,
    S: JobIdStore,
    F: FnMut(&JobStatus, &ResolvedResources),
{
    let mut status_rx = session.subscribe_status();
    let mut resources_rx = session.subscribe_resources();
    loop {
        let status = status_rx.borrow_and_update().clone();
        let resources = resources_rx.borrow_and_update().clone();
        on_change(&status, &resources);
        if let Some(view) = finished(&status, &resources) {
            return Some(view);
        }
        let open = tokio::select! {
            changed = status_rx.changed() => changed.is_ok(),
            changed = resources_rx.changed() => changed.is_ok(),
        };
        if !open {
            return None;
        }
    }
}

/// The final view once the job is terminal and nothing is left to resolve.
fn finished(status: &JobStatus, resources: &ResolvedResources) -> Option<PipelineView> {
    let snapshot = status.snapshot.as_ref()?;
    if !snapshot.is_terminal() || !resources.settled_for(snapshot) {
        return None;
    }
    Some(PipelineView::from_snapshot(snapshot))
}

/// Map how the job ended to the process exit status.
pub fn exit_for(view: Option<&PipelineView>) -> Result<()> {
    match view.and_then(|v| v.terminal.as_ref()) {
        Some(TerminalSummary::Succeeded) => Ok(()),
        Some(TerminalSummary::Failed { .. }) => Err(ExitError::silent(codes::FAILURE).into()),
        Some(TerminalSummary::Cancelled) => Err(ExitError::silent(codes::CANCELLED).into()),
        None => Err(ExitError::new(codes::FAILURE, "watch ended before the job finished").into()),
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
