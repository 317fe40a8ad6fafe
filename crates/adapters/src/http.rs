// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the dubbing service's REST API.
//!
//! The client's own timeout governs each request; callers add none.

use crate::api::{ApiError, JobApi};
use async_trait::async_trait;
use dw_core::{JobId, ResourceRef};
use dw_wire::{decode, error_message, PresignResponse, RawJobStatus};
use reqwest::{Method, StatusCode, Url};
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`HttpJobApi`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// API root, e.g. `http://localhost:5000/api`
    pub base_url: String,
    pub timeout: Duration,
    /// Bearer token forwarded as-is when set
    pub token: Option<String>,
}

impl HttpSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), timeout: DEFAULT_TIMEOUT, token: None }
    }
}

/// [`JobApi`] over HTTP using a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct HttpJobApi {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpJobApi {
    pub fn new(settings: HttpSettings) -> Result<Self, ApiError> {
        let mut base = Url::parse(settings.base_url.trim())
            .map_err(|e| ApiError::Transport(format!("invalid base URL: {}", e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Transport(format!("invalid base URL: {}", base)));
        }
        // Keep an existing path prefix such as `/api`
        if let Ok(mut segments) = base.path_segments_mut() {
            segments.pop_if_empty();
        }

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self { http, base, token: settings.token })
    }

    /// Build `{base}/{segments...}` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("invalid base URL: {}", self.base)))?
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the body of a 2xx response.
    ///
    /// Non-2xx responses become [`ApiError::Server`] carrying the server's
    /// `{error}` message, or `fallback` when it sent none.
    async fn send(&self, method: Method, url: Url, fallback: &str) -> Result<Vec<u8>, ApiError> {
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!(%method, %url, error = %e, "request failed");
            ApiError::Transport(e.to_string())
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| ApiError::Transport(e.to_string()))?;

        tracing::trace!(%method, %url, status = status.as_u16(), bytes = body.len(), "response");

        if !status.is_success() {
            return Err(server_error(status, &body, fallback));
        }
        Ok(body.to_vec())
    }
}

fn server_error(status: StatusCode, body: &[u8], fallback: &str) -> ApiError {
    ApiError::Server {
        status: status.as_u16(),
        message: error_message(body).unwrap_or_else(|| fallback.to_string()),
    }
}

fn malformed(e: impl std::fmt::Display) -> ApiError {
    ApiError::Malformed(e.to_string())
}

#[async_trait]
impl JobApi for HttpJobApi {
    async fn job_status(&self, id: &JobId) -> Result<RawJobStatus, ApiError> {
        let url = self.url(&["jobs", "status", id.as_str()])?;
        let body = self.send(Method::GET, url, "Failed to fetch job status").await?;
        decode(&body).map_err(malformed)
    }

    async fn retry_job(&self, id: &JobId) -> Result<(), ApiError> {
        let url = self.url(&["jobs", id.as_str(), "retry"])?;
        self.send(Method::POST, url, "Retry failed").await?;
        Ok(())
    }

    async fn cancel_job(&self, id: &JobId) -> Result<(), ApiError> {
        let url = self.url(&["jobs", id.as_str(), "cancel"])?;
        self.send(Method::POST, url, "Cancel failed").await?;
        Ok(())
    }

    async fn presign(&self, resource: &ResourceRef) -> Result<String, ApiError> {
        let mut url = self.url(&["resources", "presign"])?;
        url.query_pairs_mut()
            .append_pair("bucket", &resource.bucket)
            .append_pair("object", &resource.key);

        let body = self.send(Method::GET, url, "Failed to presign resource").await?;
        let response: PresignResponse = decode(&body).map_err(malformed)?;
        match (response.url, response.error) {
            (Some(url), _) if !url.is_empty() => Ok(url),
            (_, Some(error)) => Err(ApiError::Malformed(error)),
            _ => Err(ApiError::Malformed("presign response has no url".to_string())),
        }
    }

    async fn job_logs(&self, id: &JobId) -> Result<serde_json::Value, ApiError> {
        let url = self.url(&["jobs", id.as_str(), "logs"])?;
        let body = self.send(Method::GET, url, "Failed to fetch job logs").await?;
        decode(&body).map_err(malformed)
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
