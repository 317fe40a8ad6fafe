// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::Deserialize;
use serde_json::Value;

/// `GET /resources/presign` response: `{ "url": "..." }` or `{ "error": "..." }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PresignResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Extract the server's error message from a response body, if it sent one.
///
/// Bodies that are not JSON objects, or whose `error` is empty, yield `None`
/// so the caller can fall back to a per-operation default.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("error")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}
