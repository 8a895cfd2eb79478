// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Test infrastructure for command testing without filesystem setup.
//!
//! This module provides a `TestContext` that wraps an in-memory queue and a
//! manual clock, enabling commands to be tested without a queue file.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::commands::testing::TestContext;
//!
//! #[test]
//! fn test_some_command() {
//!     let mut ctx = TestContext::new();
//!     let id = ctx.enqueue("https://api.example.com/a", 1);
//!
//!     // Test command logic using ctx.queue
//! }
//! ```

use crate::config::QueueConfig;
use rq_core::{
    EnqueueOptions, ManualClock, MemoryStore, Method, QueueStore, RequestDescription, Status,
};
use std::sync::Arc;

pub const START_MS: u64 = 1_700_000_000_000;

/// Test context providing an in-memory queue and a controllable clock.
pub struct TestContext {
    pub queue: QueueStore,
    pub store: MemoryStore,
    pub clock: Arc<ManualClock>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let clock = Arc::new(ManualClock::new(START_MS));
        let queue = QueueStore::open(
            Box::new(store.clone()),
            clock.clone(),
            QueueConfig::default().policy(),
        );
        TestContext { queue, store, clock }
    }

    /// Enqueue a GET for `url` with `priority`, returning its id.
    pub fn enqueue(&mut self, url: &str, priority: i32) -> String {
        self.enqueue_with(url, EnqueueOptions::new().priority(priority))
    }

    pub fn enqueue_with(&mut self, url: &str, options: EnqueueOptions) -> String {
        self.clock.advance(1);
        self.queue
            .enqueue(RequestDescription::new(Method::Get, url), options)
            .unwrap()
    }

    /// Drive a record to `failed` with a permanent error.
    pub fn fail(&mut self, id: &str) -> &mut Self {
        self.queue.mark_attempt_started(id).unwrap();
        assert_eq!(
            self.queue.mark_failed(id, "server responded 400: bad request", false).unwrap(),
            Status::Failed
        );
        self
    }

    /// Drive a record to `succeeded`.
    pub fn succeed(&mut self, id: &str) -> &mut Self {
        self.queue.mark_attempt_started(id).unwrap();
        self.queue.mark_succeeded(id).unwrap();
        self
    }

    pub fn status(&self, id: &str) -> Option<Status> {
        self.queue.get(id).map(|r| r.status)
    }
}
