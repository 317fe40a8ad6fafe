// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dw-adapters: transport and persistence ports with their implementations

pub mod api;
pub mod http;
pub mod store;

pub use api::{ApiError, JobApi};
pub use http::{HttpJobApi, HttpSettings, DEFAULT_TIMEOUT};
pub use store::{FileJobIdStore, JobIdStore, MemoryJobIdStore, StoreError, CURRENT_JOB_FILE};

#[cfg(any(test, feature = "test-support"))]
pub use api::{ApiCall, FakeJobApi};
