// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::TransportError;

/// All possible errors that can occur in the rqrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Queue(#[from] rq_core::Error),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("invalid header '{0}'\n  hint: headers are written as 'Name: value'")]
    InvalidHeader(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("queue not drained after {secs}s: {remaining} request(s) still active\n  hint: run 'rq list --status retrying' to inspect them")]
    DrainTimeout { secs: u64, remaining: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for rqrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
