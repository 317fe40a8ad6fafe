//! Commands talking to a job service.

use crate::prelude::*;
use serde_json::json;

#[test]
fn status_prints_pipeline_and_resources() {
    let ws = Workspace::new();
    let service = FakeService::start();
    service.status(
        "job-1",
        json!({
            "state": "running",
            "current_step": "tts",
            "input_ref": "store://media/in.mp4",
        }),
    );

    ws.cli()
        .service(&service)
        .args(&["status", "job-1"])
        .passes()
        .stdout_has("Job job-1  running")
        .stdout_has("50%")
        .stdout_has("▸ tts")
        .stdout_has("Input:  https://signed.test/media/in.mp4");

    assert_eq!(ws.saved_job(), None, "status must not change the saved job");
    assert_eq!(service.count("GET /api/jobs/status/job-1"), 1);
}

#[test]
fn status_json_carries_view_and_resources() {
    let ws = Workspace::new();
    let service = FakeService::start();
    service.status("job-1", json!({ "state": "error", "last_error_message": "tts crashed" }));

    let run = ws.cli().service(&service).args(&["-o", "json", "status", "job-1"]).passes();
    let value = run.stdout_json();

    assert_eq!(value["view"]["state"], "failed");
    assert_eq!(value["view"]["terminal"]["message"], "tts crashed");
    assert_eq!(value["can_retry"], true);
}

#[test]
fn status_of_unknown_job_fails_with_server_message() {
    let ws = Workspace::new();
    let service = FakeService::start();

    ws.cli()
        .service(&service)
        .args(&["status", "ghost"])
        .fails_with(1)
        .stdout_has("job not found");
}

#[test]
fn watch_follows_job_to_success_and_saves_it() {
    let ws = Workspace::new();
    let service = FakeService::start();
    service
        .status("job-1", json!({ "state": "running", "current_step": "asr" }))
        .status("job-1", json!({ "state": "succeeded", "output_ref": "store://media/out.mp4" }));

    ws.cli()
        .service(&service)
        .args(&["watch", "job-1"])
        .passes()
        .stdout_has("▸ asr")
        .stdout_has("succeeded")
        .stdout_has("Output: https://signed.test/media/out.mp4");

    assert_eq!(ws.saved_job().as_deref(), Some("job-1"));
}

#[test]
fn watch_resumes_saved_job_and_reports_failure() {
    let ws = Workspace::new();
    ws.save_job("job-2");
    let service = FakeService::start();
    service.status("job-2", json!({ "state": "failed", "last_error_message": "mix failed" }));

    ws.cli()
        .service(&service)
        .args(&["watch"])
        .fails_with(1)
        .stdout_has("Failed: mix failed");
}

#[test]
fn watch_exits_with_cancelled_code() {
    let ws = Workspace::new();
    let service = FakeService::start();
    service.status("job-3", json!({ "state": "cancelled" }));

    ws.cli().service(&service).args(&["watch", "job-3"]).fails_with(4).stdout_has("Cancelled");
}

#[test]
fn retry_posts_and_shows_new_attempt() {
    let ws = Workspace::new();
    let service = FakeService::start();
    service
        .status("job-1", json!({ "state": "failed" }))
        .status("job-1", json!({ "state": "queued", "retry_count": 1 }));

    ws.cli()
        .service(&service)
        .args(&["retry", "job-1"])
        .passes()
        .stdout_has("Retrying job job-1");

    assert_eq!(service.count("POST /api/jobs/job-1/retry"), 1);
    assert_eq!(ws.saved_job().as_deref(), Some("job-1"));
}

#[test]
fn cancel_forgets_saved_job() {
    let ws = Workspace::new();
    ws.save_job("job-1");
    let service = FakeService::start();
    service.status("job-1", json!({ "state": "running" }));

    ws.cli().service(&service).args(&["cancel"]).passes().stdout_has("Cancelled job job-1");

    assert_eq!(service.count("POST /api/jobs/job-1/cancel"), 1);
    assert_eq!(ws.saved_job(), None);
}

#[test]
fn rejected_cancel_keeps_saved_job() {
    let ws = Workspace::new();
    ws.save_job("job-1");
    let service = FakeService::start();
    service
        .status("job-1", json!({ "state": "succeeded" }))
        .action_reply("job-1", "cancel", 409, json!({ "error": "job already finished" }));

    ws.cli()
        .service(&service)
        .args(&["cancel"])
        .fails_with(1)
        .stderr_has("job already finished");

    assert_eq!(ws.saved_job().as_deref(), Some("job-1"));
}

#[test]
fn logs_print_the_saved_job_logs() {
    let ws = Workspace::new();
    ws.save_job("job-1");
    let service = FakeService::start();
    service.logs_reply("job-1", 200, json!([{ "step": "mix", "message": "ducking music" }]));

    ws.cli().service(&service).args(&["logs"]).passes().stdout_has("\"message\": \"ducking music\"");

    assert_eq!(service.requests(), vec!["GET /api/jobs/job-1/logs".to_string()]);
    assert_eq!(ws.saved_job().as_deref(), Some("job-1"));
}

#[test]
fn logs_export_to_default_file() {
    let ws = Workspace::new();
    let service = FakeService::start();
    service.logs_reply("job-2", 200, json!({ "lines": ["a", "b"] }));

    ws.cli()
        .service(&service)
        .current_dir(ws.path())
        .args(&["logs", "job-2", "--file"])
        .passes()
        .stdout_has("Saved logs for job job-2 to job-job-2-logs.json")
        .stdout_lacks("lines");

    let text = std::fs::read_to_string(ws.path().join("job-job-2-logs.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value, json!({ "lines": ["a", "b"] }));
    assert_eq!(ws.saved_job(), None, "logs must not change the saved job");
}

#[test]
fn logs_failure_reports_server_message() {
    let ws = Workspace::new();
    let service = FakeService::start();
    service.logs_reply("job-1", 403, json!({ "error": "not your job" }));

    ws.cli()
        .service(&service)
        .args(&["logs", "job-1"])
        .fails_with(1)
        .stderr_has("failed to fetch logs for job job-1: not your job");
}

#[test]
fn logs_without_saved_job_is_not_found() {
    let ws = Workspace::new();

    ws.cli().args(&["logs"]).fails_with(3).stderr_has("no saved job");
}
