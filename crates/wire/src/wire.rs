// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON decoding of response bodies.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors decoding a response body
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("response body is empty")]
    Empty,

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a response body.
///
/// A body that is valid JSON but not an object the target type accepts is a
/// protocol error, same as invalid JSON.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ProtocolError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ProtocolError::Empty);
    }
    Ok(serde_json::from_slice(body)?)
}
