// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for rq-core operations.

use thiserror::Error;

/// All possible errors that can occur in rq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("request not found: {0}")]
    RecordNotFound(String),

    #[error("cannot {action} request {id}: status is {from}\n  hint: {hint}")]
    InvalidTransition {
        id: String,
        from: String,
        action: &'static str,
        hint: &'static str,
    },

    #[error("invalid status: '{0}'\n  hint: valid statuses are: pending, retrying, succeeded, failed")]
    InvalidStatus(String),

    #[error(
        "invalid method: '{0}'\n  hint: valid methods are: GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS"
    )]
    InvalidMethod(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("queue store is locked by another process: {0}\n  hint: only one process may own a queue file")]
    Locked(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for rq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
