// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dw_adapters::{FakeJobApi, MemoryJobIdStore};
use dw_engine::DEFAULT_POLL_INTERVAL;
use serde_json::json;

fn session(store: MemoryJobIdStore) -> (FakeJobApi, JobSession<FakeJobApi, MemoryJobIdStore>) {
    let api = FakeJobApi::new();
    let session = JobSession::new(api.clone(), store, DEFAULT_POLL_INTERVAL);
    (api, session)
}

#[tokio::test(start_paused = true)]
async fn attach_with_id_saves_it() {
    let store = MemoryJobIdStore::new();
    let (_api, session) = session(store.clone());

    let job_id = attach(&session, Some(" job-4 ".to_string())).unwrap();

    assert_eq!(job_id, "job-4");
    assert_eq!(store.load().unwrap(), Some(JobId::new("job-4")));
    assert_eq!(session.job_id(), Some(job_id));
}

#[tokio::test(start_paused = true)]
async fn attach_blank_id_resumes_saved_job() {
    let (_api, session) = session(MemoryJobIdStore::with_id("saved"));

    let job_id = attach(&session, Some("  ".to_string())).unwrap();

    assert_eq!(job_id, "saved");
}

#[tokio::test(start_paused = true)]
async fn attach_without_saved_job_is_not_found() {
    let (api, session) = session(MemoryJobIdStore::new());

    let err = attach(&session, None).unwrap_err();

    let exit = err.downcast_ref::<ExitError>().unwrap();
    assert_eq!(exit.code, codes::NOT_FOUND);
    assert!(api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn first_status_waits_for_a_fetch() {
    let (api, session) = session(MemoryJobIdStore::new());
    api.push_status("j1", json!({ "state": "running" }));
    let rx = session.subscribe_status();

    session.open(JobId::new("j1")).unwrap();
    let status = first_status(rx).await;

    assert!(!status.loading);
    assert!(status.snapshot.is_some());
}

#[tokio::test(start_paused = true)]
async fn first_status_reports_fetch_errors() {
    let (_api, session) = session(MemoryJobIdStore::new());
    let rx = session.subscribe_status();

    session.open(JobId::new("missing")).unwrap();
    let status = first_status(rx).await;

    assert_eq!(status.snapshot, None);
    assert_eq!(status.error.as_deref(), Some("job not found"));
}

fn config_in(dir: &std::path::Path) -> Config {
    Config {
        api_url: "http://127.0.0.1:9/api".to_string(),
        poll_interval: DEFAULT_POLL_INTERVAL,
        timeout: std::time::Duration::from_secs(1),
        state_dir: dir.to_path_buf(),
        token: None,
    }
}

#[test]
fn explicit_id_wins_and_is_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    file_store(&config).save(&JobId::new("saved")).unwrap();

    let job_id = explicit_or_saved(&config, Some(" other ".to_string())).unwrap();

    assert_eq!(job_id, "other");
    assert_eq!(file_store(&config).load().unwrap(), Some(JobId::new("saved")));
}

#[test]
fn missing_id_falls_back_to_saved_job() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let err = explicit_or_saved(&config, None).unwrap_err();
    assert_eq!(err.downcast_ref::<ExitError>().map(|e| e.code), Some(codes::NOT_FOUND));

    file_store(&config).save(&JobId::new("saved")).unwrap();
    assert_eq!(explicit_or_saved(&config, Some(String::new())).unwrap(), "saved");
}
