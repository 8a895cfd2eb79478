// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rq-core: data model and storage for the rq request queue
//!
//! This crate provides the request record types, the priority-ordered
//! [`QueueStore`], and the persistent stores it writes through to. It has no
//! async runtime or network dependency; the scheduler and transports live in
//! the `rq` crate.

pub mod clock;
pub mod error;
pub mod id;
pub mod queue;
pub mod record;
pub mod store;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use queue::{NextAttempt, QueueCounts, QueueStore};
pub use record::{
    EnqueueOptions, Method, QueuePolicy, RequestDescription, RequestRecord, Status,
};
pub use store::{JsonlStore, MemoryStore, PersistentStore};
