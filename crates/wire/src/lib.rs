// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP payloads exchanged with the dubbing service.
//!
//! Raw bodies are decoded here and normalized into `dw-core` types; nothing
//! past this crate sees a raw server string for a state or a step.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod response;
mod status;
mod wire;

pub use response::{error_message, PresignResponse};
pub use status::{timestamp, RawJobStatus};
pub use wire::{decode, ProtocolError};

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
