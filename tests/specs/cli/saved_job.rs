//! Commands that fall back to the saved job when no id is given.

use crate::prelude::*;

#[test]
fn forget_without_saved_job_passes() {
    let ws = Workspace::new();
    ws.cli().args(&["forget"]).passes().stdout_has("No saved job");
}

#[test]
fn forget_removes_saved_job() {
    let ws = Workspace::new();
    ws.save_job("job-42");

    ws.cli().args(&["forget"]).passes().stdout_has("Forgot job job-42");

    assert_eq!(ws.saved_job(), None);
}

#[test]
fn forget_json_names_the_forgotten_job() {
    let ws = Workspace::new();
    ws.save_job("job-42");

    let run = ws.cli().args(&["-o", "json", "forget"]).passes();

    assert_eq!(run.stdout_json()["forgotten"], "job-42");
}

#[test]
fn watch_without_saved_job_is_not_found() {
    let ws = Workspace::new();
    ws.cli().args(&["watch"]).fails_with(3).stderr_has("no saved job");
}

#[test]
fn retry_without_saved_job_is_not_found() {
    let ws = Workspace::new();
    ws.cli().args(&["retry"]).fails_with(3);
}

#[test]
fn status_without_saved_job_is_not_found() {
    let ws = Workspace::new();
    ws.cli().args(&["status"]).fails_with(3);
}

#[test]
fn invalid_poll_interval_is_rejected() {
    let ws = Workspace::new();
    ws.cli()
        .env("DUBWATCH_POLL_MS", "0")
        .args(&["forget"])
        .fails_with(1)
        .stderr_has("DUBWATCH_POLL_MS");
}
