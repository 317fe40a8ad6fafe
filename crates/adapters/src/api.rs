// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use dw_core::{JobId, ResourceRef};
use dw_wire::RawJobStatus;
use thiserror::Error;

/// Errors from job service calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, reset)
    #[error("request failed: {0}")]
    Transport(String),

    /// Non-2xx response; `message` is the server's `{error}` verbatim when sent
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 2xx response whose body could not be understood
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Adapter for the dubbing service's job endpoints
#[async_trait]
pub trait JobApi: Clone + Send + Sync + 'static {
    /// `GET /jobs/status/{id}`
    async fn job_status(&self, id: &JobId) -> Result<RawJobStatus, ApiError>;

    /// `POST /jobs/{id}/retry`
    async fn retry_job(&self, id: &JobId) -> Result<(), ApiError>;

    /// `POST /jobs/{id}/cancel`
    async fn cancel_job(&self, id: &JobId) -> Result<(), ApiError>;

    /// `GET /resources/presign`: a time-limited access URL for a stored object
    async fn presign(&self, resource: &ResourceRef) -> Result<String, ApiError>;

    /// `GET /jobs/{id}/logs`: the job's log export, passed through untouched
    async fn job_logs(&self, id: &JobId) -> Result<serde_json::Value, ApiError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ApiError, JobApi};
    use async_trait::async_trait;
    use dw_core::{JobId, ResourceRef};
    use dw_wire::RawJobStatus;
    use parking_lot::Mutex;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Recorded API call
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub enum ApiCall {
        Status(JobId),
        Retry(JobId),
        Cancel(JobId),
        Presign(ResourceRef),
        Logs(JobId),
    }

    #[derive(Default)]
    struct FakeApiState {
        calls: Vec<ApiCall>,
        /// Scripted status replies per job; the last one repeats once drained
        statuses: HashMap<JobId, VecDeque<Result<RawJobStatus, ApiError>>>,
        last_status: HashMap<JobId, Result<RawJobStatus, ApiError>>,
        retry_result: Option<ApiError>,
        cancel_result: Option<ApiError>,
        presign: HashMap<ResourceRef, Result<String, ApiError>>,
        logs: HashMap<JobId, Result<serde_json::Value, ApiError>>,
        gates: HashMap<ApiCall, Arc<Notify>>,
    }

    /// Fake job service for testing.
    ///
    /// Status replies are scripted per job id. Any call can be held open with
    /// [`FakeJobApi::hold`] until [`FakeJobApi::release`], which is how tests
    /// put a request "in flight".
    #[derive(Clone, Default)]
    pub struct FakeJobApi {
        inner: Arc<Mutex<FakeApiState>>,
    }

    impl FakeJobApi {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a status reply built from a JSON body.
        pub fn push_status(&self, id: &str, body: serde_json::Value) {
            let raw = serde_json::from_value::<RawJobStatus>(body)
                .map_err(|e| ApiError::Malformed(e.to_string()));
            self.push_status_result(id, raw);
        }

        pub fn push_status_error(&self, id: &str, error: ApiError) {
            self.push_status_result(id, Err(error));
        }

        fn push_status_result(&self, id: &str, result: Result<RawJobStatus, ApiError>) {
            self.inner.lock().statuses.entry(JobId::new(id)).or_default().push_back(result);
        }

        pub fn fail_retry(&self, error: ApiError) {
            self.inner.lock().retry_result = Some(error);
        }

        pub fn fail_cancel(&self, error: ApiError) {
            self.inner.lock().cancel_result = Some(error);
        }

        /// Override the presign reply for one reference.
        pub fn set_presign(&self, reference: &str, result: Result<String, ApiError>) {
            if let Ok(parsed) = ResourceRef::parse(reference) {
                self.inner.lock().presign.insert(parsed, result);
            }
        }

        /// Script the log export for one job. Unscripted jobs reply 404.
        pub fn set_logs(&self, id: &str, result: Result<serde_json::Value, ApiError>) {
            self.inner.lock().logs.insert(JobId::new(id), result);
        }

        /// Block the next matching call until [`FakeJobApi::release`].
        pub fn hold(&self, call: ApiCall) {
            self.inner.lock().gates.insert(call, Arc::new(Notify::new()));
        }

        pub fn release(&self, call: &ApiCall) {
            if let Some(gate) = self.inner.lock().gates.remove(call) {
                gate.notify_one();
            }
        }

        /// Get all recorded calls
        pub fn calls(&self) -> Vec<ApiCall> {
            self.inner.lock().calls.clone()
        }

        pub fn status_calls(&self, id: &str) -> usize {
            self.count(|c| matches!(c, ApiCall::Status(j) if j == id))
        }

        pub fn presign_calls(&self) -> usize {
            self.count(|c| matches!(c, ApiCall::Presign(_)))
        }

        fn count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
            self.inner.lock().calls.iter().filter(|c| pred(c)).count()
        }

        /// Record the call and wait on its gate, if one is set.
        async fn enter(&self, call: ApiCall) {
            let gate = {
                let mut inner = self.inner.lock();
                inner.calls.push(call.clone());
                inner.gates.get(&call).cloned()
            };
            if let Some(gate) = gate {
                gate.notified().await;
            }
        }
    }

    #[async_trait]
    impl JobApi for FakeJobApi {
        async fn job_status(&self, id: &JobId) -> Result<RawJobStatus, ApiError> {
            self.enter(ApiCall::Status(id.clone())).await;
            let mut inner = self.inner.lock();
            if let Some(next) = inner.statuses.get_mut(id).and_then(VecDeque::pop_front) {
                inner.last_status.insert(id.clone(), next.clone());
                return next;
            }
            inner.last_status.get(id).cloned().unwrap_or_else(|| {
                Err(ApiError::Server { status: 404, message: "job not found".to_string() })
            })
        }

        async fn retry_job(&self, id: &JobId) -> Result<(), ApiError> {
            self.enter(ApiCall::Retry(id.clone())).await;
            match self.inner.lock().retry_result.clone() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }

        async fn cancel_job(&self, id: &JobId) -> Result<(), ApiError> {
            self.enter(ApiCall::Cancel(id.clone())).await;
            match self.inner.lock().cancel_result.clone() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }

        async fn presign(&self, resource: &ResourceRef) -> Result<String, ApiError> {
            self.enter(ApiCall::Presign(resource.clone())).await;
            self.inner.lock().presign.get(resource).cloned().unwrap_or_else(|| {
                Ok(format!("https://signed.test/{}/{}", resource.bucket, resource.key))
            })
        }

        async fn job_logs(&self, id: &JobId) -> Result<serde_json::Value, ApiError> {
            self.enter(ApiCall::Logs(id.clone())).await;
            self.inner.lock().logs.get(id).cloned().unwrap_or_else(|| {
                Err(ApiError::Server { status: 404, message: "job not found".to_string() })
            })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{ApiCall, FakeJobApi};

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
