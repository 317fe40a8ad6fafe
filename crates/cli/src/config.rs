// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Resolved from built-in defaults, then the optional TOML file, then
//! environment variables; later sources win.

use crate::env;
use dw_adapters::{HttpSettings, DEFAULT_TIMEOUT};
use dw_engine::DEFAULT_POLL_INTERVAL;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },
    #[error("could not determine a state directory; set DUBWATCH_STATE_DIR")]
    NoStateDir,
}

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub poll_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub state_dir: Option<PathBuf>,
    pub token: Option<String>,
}

impl FileConfig {
    /// Read `path`; a missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub state_dir: PathBuf,
    pub token: Option<String>,
}

impl Config {
    /// Resolve from every source.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match env::config_path() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config file");
                FileConfig::load(&path)?
            }
            None => FileConfig::default(),
        };
        Self::resolve(file)
    }

    /// Layer environment overrides over `file` and the defaults.
    pub fn resolve(file: FileConfig) -> Result<Self, ConfigError> {
        let api_url = env::var(env::API_URL)
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let poll_interval = match millis(env::POLL_MS)? {
            Some(ms) => Duration::from_millis(ms),
            None => file.poll_ms.map(Duration::from_millis).unwrap_or(DEFAULT_POLL_INTERVAL),
        };
        let timeout = match millis(env::TIMEOUT_MS)? {
            Some(ms) => Duration::from_millis(ms),
            None => file.timeout_ms.map(Duration::from_millis).unwrap_or(DEFAULT_TIMEOUT),
        };
        for (name, value) in [(env::POLL_MS, poll_interval), (env::TIMEOUT_MS, timeout)] {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue { name: name.to_string(), value: "0".into() });
            }
        }

        let state_dir = env::var(env::STATE_DIR)
            .map(PathBuf::from)
            .or(file.state_dir)
            .or_else(env::default_state_dir)
            .ok_or(ConfigError::NoStateDir)?;

        let token = env::var(env::TOKEN).or(file.token.filter(|t| !t.is_empty()));

        Ok(Self { api_url, poll_interval, timeout, state_dir, token })
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings { base_url: self.api_url.clone(), timeout: self.timeout, token: self.token.clone() }
    }
}

fn millis(name: &str) -> Result<Option<u64>, ConfigError> {
    let Some(value) = env::var(name) else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue { name: name.to_string(), value })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
