// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod config;
pub mod drain;
pub mod enqueue;
pub mod list;
pub mod remove;
pub mod retry;
pub mod show;
pub mod status;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rq_core::{JsonlStore, QueueStore, SystemClock};

use crate::config::{QueueConfig, DEFAULT_CONFIG_PATH};
use crate::env;
use crate::error::Result;

/// Resolved global options shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: QueueConfig,
    pub config_path: PathBuf,
}

impl Context {
    /// Load the config and apply the queue override.
    ///
    /// Flags win over `RQ_CONFIG` / `RQ_QUEUE`, which win over the defaults.
    pub fn load(queue: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path
            .or_else(env::config_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = QueueConfig::load_or_default(&config_path)?;
        if let Some(queue) = queue.or_else(env::queue_path) {
            config.store_path = queue;
        }
        Ok(Context { config, config_path })
    }

    pub fn store_path(&self) -> &Path {
        &self.config.store_path
    }
}

/// Helper to open the queue file named by the config.
pub fn open_queue(config: &QueueConfig) -> Result<QueueStore> {
    let store = JsonlStore::open(&config.store_path)?;
    Ok(QueueStore::open(Box::new(store), Arc::new(SystemClock), config.policy()))
}
