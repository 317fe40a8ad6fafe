// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage references attached to a job.

use crate::job::JobSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// URI scheme of storage references reported by the server.
pub const STORE_SCHEME: &str = "store://";

/// Why a string is not a usable storage reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceRefError {
    #[error("missing store:// scheme")]
    MissingScheme,
    #[error("empty bucket")]
    EmptyBucket,
    #[error("empty object key")]
    EmptyKey,
}

/// A parsed `store://bucket/key...` locator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub bucket: String,
    pub key: String,
}

impl ResourceRef {
    /// Parse an opaque reference. The key may itself contain `/`.
    pub fn parse(raw: &str) -> Result<Self, ResourceRefError> {
        let rest = raw.strip_prefix(STORE_SCHEME).ok_or(ResourceRefError::MissingScheme)?;
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(ResourceRefError::EmptyBucket);
        }
        if key.is_empty() {
            return Err(ResourceRefError::EmptyKey);
        }
        Ok(Self { bucket: bucket.to_string(), key: key.to_string() })
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}/{}", STORE_SCHEME, self.bucket, self.key)
    }
}

/// Which media object of a job a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceSlot {
    /// The uploaded source video
    Input,
    /// The dubbed result
    Output,
}

impl ResourceSlot {
    pub const ALL: [ResourceSlot; 2] = [ResourceSlot::Input, ResourceSlot::Output];

    /// The raw reference for this slot on a snapshot, if any.
    pub fn reference<'a>(&self, snapshot: &'a JobSnapshot) -> Option<&'a str> {
        match self {
            ResourceSlot::Input => snapshot.input_ref.as_deref(),
            ResourceSlot::Output => snapshot.output_ref.as_deref(),
        }
        .filter(|r| !r.is_empty())
    }
}

crate::simple_display! {
    ResourceSlot {
        Input => "input",
        Output => "output",
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
