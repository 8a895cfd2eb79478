// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue configuration.
//!
//! Configuration is stored as TOML (by default in `.rq/config.toml`) and
//! includes:
//! - `store_path`: where the queue file lives
//! - retry policy: `max_retries`, `retry_delay_ms`, `max_backoff_ms`
//! - `request_timeout_ms` and `direct_retries` for sends
//! - optional `max_succeeded` retention and `base_url` for relative urls

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rq_core::QueuePolicy;

use crate::error::{Error, Result};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".rq/config.toml";

/// Queue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue file (relative to the working directory or absolute).
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Retries granted after the first failed attempt (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff delay in milliseconds (default: 1000).
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Ceiling for the exponential backoff in milliseconds (default: 30000).
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Per-attempt timeout in milliseconds (default: 10000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Extra direct attempts before a request falls back to the queue (default: 0).
    #[serde(default)]
    pub direct_retries: u32,
    /// Keep at most this many succeeded records. Unset keeps them all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_succeeded: Option<usize>,
    /// Base for resolving relative request urls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".rq/queue.jsonl")
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            store_path: default_store_path(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            direct_retries: 0,
            max_succeeded: None,
            base_url: None,
        }
    }
}

impl QueueConfig {
    /// Loads and validates configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: QueueConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`QueueConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Saves configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Rejects settings the queue cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(Error::Config(
                "request_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_backoff_ms < self.retry_delay_ms {
            return Err(Error::Config(format!(
                "max_backoff_ms ({}) must not be less than retry_delay_ms ({})",
                self.max_backoff_ms, self.retry_delay_ms
            )));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(Error::Config("store_path cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Retry and retention settings for the queue store.
    pub fn policy(&self) -> QueuePolicy {
        QueuePolicy {
            max_retries: self.max_retries,
            retry_delay_ms: self.retry_delay_ms,
            max_backoff_ms: self.max_backoff_ms,
            max_succeeded: self.max_succeeded,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
