// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical job and step states.
//!
//! The server reports states as free-form strings and uses two synonym pairs
//! interchangeably (`succeeded`/`completed`, `failed`/`error`). Raw strings are
//! folded into these closed enums once, at the wire boundary, so nothing
//! downstream branches on synonyms. Only the canonical names are emitted.

use serde::{Deserialize, Serialize};

/// Overall state of a dubbing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Pending,
    Running,
    #[serde(alias = "completed")]
    Succeeded,
    #[serde(alias = "error")]
    Failed,
    Cancelled,
}

impl JobState {
    /// Normalize a raw server string. Returns `None` for anything outside the
    /// accepted vocabulary, which callers treat as "no usable state".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" => Some(JobState::Queued),
            "pending" => Some(JobState::Pending),
            "running" => Some(JobState::Running),
            "succeeded" | "completed" => Some(JobState::Succeeded),
            "failed" | "error" => Some(JobState::Failed),
            "cancelled" => Some(JobState::Cancelled),
            _ => None,
        }
    }

    /// Whether the job will not progress further without an explicit retry.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed | JobState::Cancelled)
    }

    /// Only failed jobs are offered a retry; cancelled jobs are restart-only.
    pub fn is_retryable(&self) -> bool {
        matches!(self, JobState::Failed)
    }
}

crate::simple_display! {
    JobState {
        Queued => "queued",
        Pending => "pending",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// State of one pipeline step as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    #[default]
    Pending,
    Queued,
    Running,
    /// Step failed and is being re-attempted server-side
    Retrying,
    #[serde(alias = "completed")]
    Succeeded,
    #[serde(alias = "error")]
    Failed,
    Cancelled,
    /// Unrecognized raw value
    Unknown,
}

impl StepState {
    /// Normalize a raw server string; unrecognized values map to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => StepState::Pending,
            "queued" => StepState::Queued,
            "running" => StepState::Running,
            "retrying" => StepState::Retrying,
            "succeeded" | "completed" => StepState::Succeeded,
            "failed" | "error" => StepState::Failed,
            "cancelled" => StepState::Cancelled,
            _ => StepState::Unknown,
        }
    }
}

crate::simple_display! {
    StepState {
        Pending => "pending",
        Queued => "queued",
        Running => "running",
        Retrying => "retrying",
        Succeeded => "succeeded",
        Failed => "failed",
        Cancelled => "cancelled",
        Unknown => "unknown",
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
