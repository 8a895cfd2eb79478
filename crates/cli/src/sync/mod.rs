// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Async delivery of queued requests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Client    │────►│  Transport  │────►│   Remote    │
//! │(QueueClient)│◄────│   (trait)   │◄────│     API     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   ▲
//!        ▼                   │
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ SharedQueue │◄────│  Scheduler  │◄────│   Network   │
//! │ (QueueStore)│     │ (drain task)│     │   Monitor   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Direct send while online, queue fallback on transient failure
//! - Priority-ordered background drain with exponential backoff
//! - Drain follows online/offline transitions
//! - Injectable transport trait for testing

mod client;
mod network;
mod scheduler;
mod shared;
mod transport;

pub use client::{QueueClient, QueueStats, RequestOptions, RequestOutcome};
pub use network::{ListenerId, NetworkMonitor};
pub use scheduler::{QueueEvent, Scheduler};
pub use shared::SharedQueue;
pub use transport::{
    HttpTransport, Response, SendFuture, Transport, TransportError, TransportResult,
};

#[cfg(test)]
pub(crate) mod test_helpers;
