// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed, ordered catalog of logical pipeline steps.
//!
//! The server reports steps sparsely; projecting them through the catalog
//! always yields the same seven entries in the same order, so a renderer can
//! rely on a stable list no matter how little the backend has emitted.

use crate::job::StepRecord;
use crate::state::StepState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the seven logical stages of the dubbing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalStep {
    /// Speech recognition
    Asr,
    /// Punctuation restoration
    Punctuate,
    Translate,
    /// Speech synthesis
    Tts,
    /// Source-audio separation
    SeparateMusic,
    Mix,
    /// Audio replacement in the video container
    ReplaceAudio,
}

impl CanonicalStep {
    /// Catalog order.
    pub const ALL: [CanonicalStep; 7] = [
        CanonicalStep::Asr,
        CanonicalStep::Punctuate,
        CanonicalStep::Translate,
        CanonicalStep::Tts,
        CanonicalStep::SeparateMusic,
        CanonicalStep::Mix,
        CanonicalStep::ReplaceAudio,
    ];

    /// Wire name of the step.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalStep::Asr => "asr",
            CanonicalStep::Punctuate => "punctuate",
            CanonicalStep::Translate => "translate",
            CanonicalStep::Tts => "tts",
            CanonicalStep::SeparateMusic => "separate_music",
            CanonicalStep::Mix => "mix",
            CanonicalStep::ReplaceAudio => "replace_audio",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.as_str() == name)
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalStep::Asr => "speech recognition",
            CanonicalStep::Punctuate => "punctuation",
            CanonicalStep::Translate => "translation",
            CanonicalStep::Tts => "speech synthesis",
            CanonicalStep::SeparateMusic => "audio separation",
            CanonicalStep::Mix => "mixing",
            CanonicalStep::ReplaceAudio => "audio replacement",
        }
    }
}

impl std::fmt::Display for CanonicalStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog step paired with whatever the server reported for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepEntry {
    pub step: CanonicalStep,
    pub state: StepState,
    pub progress: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl StepEntry {
    /// Placeholder for a step the server has not reported yet.
    pub fn placeholder(step: CanonicalStep) -> Self {
        Self { step, state: StepState::Pending, progress: None, started_at: None, finished_at: None }
    }

    pub fn name(&self) -> &'static str {
        self.step.as_str()
    }

    fn from_record(step: CanonicalStep, record: &StepRecord) -> Self {
        Self {
            step,
            state: record.state,
            progress: record.progress,
            started_at: record.started_at,
            finished_at: record.finished_at,
        }
    }
}

/// The full catalog mapped against a snapshot's raw steps.
///
/// Always holds exactly one entry per [`CanonicalStep`], in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OrderedStepView {
    entries: Vec<StepEntry>,
}

impl OrderedStepView {
    pub fn iter(&self) -> std::slice::Iter<'_, StepEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a OrderedStepView {
    type Item = &'a StepEntry;
    type IntoIter = std::slice::Iter<'a, StepEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Project raw step records onto the catalog.
///
/// Names are matched exactly. Records outside the catalog are dropped; when a
/// name appears more than once the last record wins.
pub fn project(raw_steps: &[StepRecord]) -> OrderedStepView {
    let entries = CanonicalStep::ALL
        .into_iter()
        .map(|step| {
            raw_steps
                .iter()
                .rev()
                .find(|r| r.name == step.as_str())
                .map(|r| StepEntry::from_record(step, r))
                .unwrap_or_else(|| StepEntry::placeholder(step))
        })
        .collect();
    OrderedStepView { entries }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
