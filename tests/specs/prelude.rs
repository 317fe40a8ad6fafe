//! Shared harness: an isolated CLI invocation and a fake job service.

#![allow(dead_code)]

use assert_cmd::Command;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Isolated environment: its own state dir and no user config.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    pub fn saved_job_file(&self) -> PathBuf {
        self.state_dir().join("current_job.json")
    }

    pub fn save_job(&self, id: &str) {
        std::fs::create_dir_all(self.state_dir()).unwrap();
        std::fs::write(self.saved_job_file(), serde_json::json!({ "job_id": id }).to_string())
            .unwrap();
    }

    pub fn saved_job(&self) -> Option<String> {
        let text = std::fs::read_to_string(self.saved_job_file()).ok()?;
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        value["job_id"].as_str().map(str::to_string)
    }

    pub fn cli(&self) -> CliBuilder {
        let mut cmd = Command::cargo_bin("dubwatch").unwrap();
        cmd.env("DUBWATCH_STATE_DIR", self.state_dir())
            .env("DUBWATCH_CONFIG", self.dir.path().join("absent.toml"))
            .env("DUBWATCH_POLL_MS", "50")
            .env("NO_COLOR", "1")
            .env_remove("DUBWATCH_API_URL")
            .env_remove("DUBWATCH_TOKEN")
            .env_remove("DUBWATCH_LOG");
        CliBuilder { cmd }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// A CLI run outside any workspace, for help and version output.
pub fn cli() -> CliBuilder {
    CliBuilder { cmd: Command::cargo_bin("dubwatch").unwrap() }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cmd.current_dir(dir);
        self
    }

    pub fn service(self, service: &FakeService) -> Self {
        let url = service.base_url();
        self.env("DUBWATCH_API_URL", &url)
    }

    fn run(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        RunAssert {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    pub fn passes(self) -> RunAssert {
        let run = self.run();
        assert_eq!(run.code, Some(0), "expected success\nstdout:\n{}\nstderr:\n{}", run.stdout, run.stderr);
        run
    }

    pub fn fails_with(self, code: i32) -> RunAssert {
        let run = self.run();
        assert_eq!(run.code, Some(code), "unexpected exit\nstdout:\n{}\nstderr:\n{}", run.stdout, run.stderr);
        run
    }
}

pub struct RunAssert {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunAssert {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout missing {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout.contains(needle), "stdout has {needle:?}:\n{}", self.stdout);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr missing {needle:?}:\n{}", self.stderr);
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    pub fn stdout_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }
}

/// Canned HTTP job service on a background thread.
///
/// Status replies are scripted per job id; the last one repeats. Requests
/// are recorded as `METHOD /path?query`.
#[derive(Clone)]
pub struct FakeService {
    addr: std::net::SocketAddr,
    state: Arc<Mutex<ServiceState>>,
}

#[derive(Default)]
struct ServiceState {
    statuses: HashMap<String, Vec<(u16, String)>>,
    actions: HashMap<String, (u16, String)>,
    logs: HashMap<String, (u16, String)>,
    requests: Vec<String>,
}

impl FakeService {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(ServiceState::default()));
        let shared = Arc::clone(&state);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || serve(stream, &shared));
            }
        });
        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn status(&self, id: &str, body: serde_json::Value) -> &Self {
        self.status_reply(id, 200, body.to_string())
    }

    pub fn status_reply(&self, id: &str, code: u16, body: String) -> &Self {
        self.state.lock().unwrap().statuses.entry(id.to_string()).or_default().push((code, body));
        self
    }

    /// Reply for `POST /jobs/{id}/{action}`.
    pub fn action_reply(&self, id: &str, action: &str, code: u16, body: serde_json::Value) -> &Self {
        self.state
            .lock()
            .unwrap()
            .actions
            .insert(format!("{id}/{action}"), (code, body.to_string()));
        self
    }

    /// Reply for `GET /jobs/{id}/logs`.
    pub fn logs_reply(&self, id: &str, code: u16, body: serde_json::Value) -> &Self {
        self.state.lock().unwrap().logs.insert(id.to_string(), (code, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.requests().iter().filter(|r| r.starts_with(prefix)).count()
    }
}

fn serve(stream: std::net::TcpStream, state: &Mutex<ServiceState>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
            break;
        }
        if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }
    let mut body = vec![0u8; content_length];
    let _ = std::io::Read::read_exact(&mut reader, &mut body);

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();
    let (code, reply) = route(state, &method, &target);

    let response = format!(
        "HTTP/1.1 {code} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
        reply.len()
    );
    let mut stream = stream;
    let _ = stream.write_all(response.as_bytes());
}

fn route(state: &Mutex<ServiceState>, method: &str, target: &str) -> (u16, String) {
    let mut state = state.lock().unwrap();
    state.requests.push(format!("{method} {target}"));
    let path = target.strip_prefix("/api/").unwrap_or(target);
    let (path, query) = path.split_once('?').unwrap_or((path, ""));

    if let Some(id) = path.strip_prefix("jobs/status/") {
        let Some(replies) = state.statuses.get_mut(id) else {
            return (404, r#"{"error":"job not found"}"#.to_string());
        };
        return if replies.len() > 1 { replies.remove(0) } else { replies[0].clone() };
    }
    if path == "resources/presign" {
        let pairs: HashMap<&str, &str> =
            query.split('&').filter_map(|kv| kv.split_once('=')).collect();
        let url = format!(
            "https://signed.test/{}/{}",
            pairs.get("bucket").unwrap_or(&""),
            pairs.get("object").unwrap_or(&"")
        );
        return (200, serde_json::json!({ "url": url }).to_string());
    }
    if let Some(rest) = path.strip_prefix("jobs/") {
        if let Some(id) = rest.strip_suffix("/logs").filter(|_| method == "GET") {
            return state
                .logs
                .get(id)
                .cloned()
                .unwrap_or((404, r#"{"error":"job not found"}"#.to_string()));
        }
        if method == "POST" {
            return state.actions.get(rest).cloned().unwrap_or((200, "{}".to_string()));
        }
    }
    (404, r#"{"error":"no route"}"#.to_string())
}
