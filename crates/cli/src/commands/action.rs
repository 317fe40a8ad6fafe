// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dubwatch retry` / `dubwatch cancel`

use crate::config::Config;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use dw_adapters::{JobApi, JobIdStore};
use dw_core::JobId;
use dw_engine::{ActionOutcome, JobSession};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Retry,
    Cancel,
}

dw_core::simple_display! {
    Action {
        Retry => "retry",
        Cancel => "cancel",
    }
}

pub async fn handle(
    config: &Config,
    action: Action,
    id: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let session = super::open_session(config)?;
    let job_id = super::attach(&session, id)?;
    let outcome = run(&session, action).await;
    session.close();
    let outcome = outcome?;

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "job_id": job_id,
                "action": action.to_string(),
                "outcome": outcome.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("{}", summary(action, &job_id, outcome));
            if action == Action::Retry && outcome == ActionOutcome::Done {
                let view = session.view();
                let report =
                    output::render_text(view.as_ref(), &session.status(), &session.resources());
                print!("{report}");
            }
        }
    }
    Ok(())
}

/// Issue `action` against the session's current job.
pub async fn run<A: JobApi, S: JobIdStore>(
    session: &JobSession<A, S>,
    action: Action,
) -> Result<ActionOutcome> {
    let controller = session.controller();
    let outcome = match action {
        Action::Retry => controller.retry().await?,
        Action::Cancel => controller.cancel().await?,
    };
    tracing::debug!(%action, %outcome, "action finished");
    Ok(outcome)
}

pub fn summary(action: Action, job_id: &JobId, outcome: ActionOutcome) -> String {
    match (action, outcome) {
        (Action::Retry, ActionOutcome::Done) => format!("Retrying job {job_id}"),
        (Action::Cancel, ActionOutcome::Done) => format!("Cancelled job {job_id}"),
        (_, ActionOutcome::Skipped) => {
            format!("Skipped {action} for job {job_id}: another action is in progress")
        }
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
