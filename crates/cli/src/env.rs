// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;

/// Version string shown by `--version`
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH"));

pub const API_URL: &str = "DUBWATCH_API_URL";
pub const POLL_MS: &str = "DUBWATCH_POLL_MS";
pub const TIMEOUT_MS: &str = "DUBWATCH_TIMEOUT_MS";
pub const STATE_DIR: &str = "DUBWATCH_STATE_DIR";
pub const TOKEN: &str = "DUBWATCH_TOKEN";
pub const CONFIG: &str = "DUBWATCH_CONFIG";
pub const LOG: &str = "DUBWATCH_LOG";

/// Non-empty value of an environment variable.
pub fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// Config file path: DUBWATCH_CONFIG > {config_dir}/dubwatch/config.toml
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = var(CONFIG) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("dubwatch").join("config.toml"))
}

/// Default state directory: {state_dir}/dubwatch, falling back to the data dir.
pub fn default_state_dir() -> Option<PathBuf> {
    dirs::state_dir().or_else(dirs::data_local_dir).map(|dir| dir.join("dubwatch"))
}

/// Tracing filter directive, `warn` unless DUBWATCH_LOG says otherwise.
pub fn log_filter() -> String {
    var(LOG).unwrap_or_else(|| "warn".to_string())
}
