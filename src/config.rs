// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! Timing values are whole seconds in the environment and `Duration`s in
//! memory so tests can shrink them freely.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend (no trailing slash)
    pub api_url: String,
    /// File backing durable local storage
    pub storage_path: PathBuf,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Minimum interval between two executed sync attempts
    pub sync_throttle: Duration,
    /// First backoff delay after a rate-limited response
    pub retry_base_delay: Duration,
    /// Retries after the initial attempt (rate-limited responses only)
    pub max_retries: u32,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api".to_string(),
            storage_path: PathBuf::from(".hidden-spots/storage.json"),
            request_timeout: Duration::from_secs(5),
            sync_throttle: Duration::from_secs(2),
            retry_base_delay: Duration::from_secs(1),
            max_retries: 3,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_url = env::var("HIDDEN_SPOTS_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .map_err(|_| ConfigError::Missing("HIDDEN_SPOTS_API_URL"))?;
        if api_url.is_empty() {
            return Err(ConfigError::Invalid("HIDDEN_SPOTS_API_URL", api_url));
        }

        Ok(Self {
            api_url,
            storage_path: env::var("HIDDEN_SPOTS_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            request_timeout: secs_var("HIDDEN_SPOTS_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout),
            sync_throttle: secs_var("HIDDEN_SPOTS_SYNC_THROTTLE_SECS")?
                .unwrap_or(defaults.sync_throttle),
            retry_base_delay: secs_var("HIDDEN_SPOTS_RETRY_BASE_SECS")?
                .unwrap_or(defaults.retry_base_delay),
            max_retries: match env::var("HIDDEN_SPOTS_MAX_RETRIES") {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("HIDDEN_SPOTS_MAX_RETRIES", raw))?,
                Err(_) => defaults.max_retries,
            },
        })
    }
}

fn secs_var(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
