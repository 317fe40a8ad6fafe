// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::color;
use clap::ValueEnum;
use dw_core::{PipelineView, StepLine, StepState, TerminalSummary};
use dw_engine::{JobStatus, ResolvedResources, ResourceStatus};
use std::fmt::Write;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const BAR_WIDTH: usize = 20;

/// `42%`, or `--` while progress is unknown.
pub fn progress_label(progress: Option<i64>) -> String {
    match progress {
        Some(p) => format!("{}%", p.clamp(0, 100)),
        None => "--".to_string(),
    }
}

/// Fixed-width bar; unknown progress renders as an empty track.
pub fn progress_bar(progress: Option<i64>, width: usize) -> String {
    let filled = progress
        .map(|p| (p.clamp(0, 100) as usize * width + 50) / 100)
        .unwrap_or(0);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

fn step_marker(line: &StepLine) -> &'static str {
    match line.state {
        StepState::Succeeded => "✓",
        StepState::Failed => "✗",
        StepState::Cancelled => "-",
        StepState::Retrying => "↻",
        _ if line.active => "▸",
        StepState::Running => "▸",
        _ => "·",
    }
}

fn resource_line(label: &str, resource: &ResourceStatus) -> Option<String> {
    let reference = resource.reference.as_deref()?;
    let detail = match (&resource.url, &resource.error) {
        (Some(url), _) => url.clone(),
        (None, Some(error)) => color::job_state(Some(dw_core::JobState::Failed), error),
        (None, None) if resource.loading => color::muted("resolving..."),
        (None, None) => color::muted(&format!("unavailable ({reference})")),
    };
    Some(format!("{:<8}{}", format!("{label}:"), detail))
}

/// Human-readable report of one job.
pub fn render_text(
    view: Option<&PipelineView>,
    status: &JobStatus,
    resources: &ResolvedResources,
) -> String {
    let mut out = String::new();
    let job_id = status.job_id.as_ref().map(|id| id.as_str()).unwrap_or("-");

    let Some(view) = view else {
        let note = if status.loading { "loading..." } else { "no status yet" };
        let _ = writeln!(out, "Job {}  {}", color::header(job_id), color::muted(note));
        if let Some(error) = &status.error {
            let _ = writeln!(out, "Error: {}", error);
        }
        return out;
    };

    let state = view.state.map(|s| s.to_string()).unwrap_or_else(|| "unknown".to_string());
    let _ = write!(
        out,
        "Job {}  {}  {} {}",
        color::header(job_id),
        color::job_state(view.state, &state),
        progress_bar(view.overall_progress, BAR_WIDTH),
        progress_label(view.overall_progress),
    );
    if view.retry_count > 0 {
        let _ = write!(out, "  {}", color::context(&format!("(retry {})", view.retry_count)));
    }
    out.push('\n');

    for line in &view.steps {
        let name = format!("{:<16}", line.step.as_str());
        let _ = writeln!(
            out,
            "  {} {} {:>4}  {}",
            color::step_state(line.state, step_marker(line)),
            color::step_state(line.state, &name),
            progress_label(Some(line.progress)),
            color::context(line.step.label()),
        );
    }
    if let Some(active) = &view.active_step {
        if dw_core::CanonicalStep::from_name(active).is_none() {
            let _ = writeln!(out, "  {} {}", color::step_state(StepState::Running, "▸"), active);
        }
    }

    match &view.terminal {
        Some(TerminalSummary::Failed { message }) => {
            let message = message.as_deref().unwrap_or("no details");
            let _ = writeln!(out, "Failed: {}", message);
        }
        Some(TerminalSummary::Cancelled) => {
            let _ = writeln!(out, "Cancelled");
        }
        Some(TerminalSummary::Succeeded) | None => {}
    }

    for line in [resource_line("Input", &resources.input), resource_line("Output", &resources.output)]
        .into_iter()
        .flatten()
    {
        let _ = writeln!(out, "{}", line);
    }
    if let Some(error) = &status.error {
        let _ = writeln!(out, "{} {}", color::muted("last refresh failed:"), error);
    }
    out
}

/// Machine-readable report of one job.
pub fn render_json(
    view: Option<&PipelineView>,
    status: &JobStatus,
    resources: &ResolvedResources,
) -> serde_json::Value {
    serde_json::json!({
        "job_id": status.job_id,
        "loading": status.loading,
        "error": status.error,
        "view": view,
        "can_retry": view.is_some_and(PipelineView::can_retry),
        "resources": resources,
    })
}

pub fn print_report(
    format: OutputFormat,
    view: Option<&PipelineView>,
    status: &JobStatus,
    resources: &ResolvedResources,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(view, status, resources)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&render_json(view, status, resources))?)
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
