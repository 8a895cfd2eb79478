// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request records: the unit of queued work.
//!
//! A [`RequestRecord`] pairs an immutable [`RequestDescription`] with the
//! lifecycle metadata the scheduler mutates (status, retry count, backoff
//! deadline, last error).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Lifecycle status of a queued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Waiting for its first attempt, or manually retried.
    Pending,
    /// At least one attempt failed; waiting for its backoff to elapse.
    Retrying,
    /// An attempt succeeded.
    Succeeded,
    /// Retry budget exhausted or a permanent failure occurred.
    Failed,
}

impl Status {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Retrying => "retrying",
            Status::Succeeded => "succeeded",
            Status::Failed => "failed",
        }
    }

    /// Returns true for statuses the scheduler never touches again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Succeeded | Status::Failed)
    }

    /// Returns true for statuses still eligible for attempts.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "retrying" => Ok(Status::Retrying),
            "succeeded" => Ok(Status::Succeeded),
            "failed" => Ok(Status::Failed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// HTTP method of a queued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// What to send: immutable once a record is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescription {
    pub url: String,
    pub method: Method,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RequestDescription {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        RequestDescription { url: url.into(), method, headers: BTreeMap::new(), body: None }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Rejects descriptions that can never be sent.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::InvalidInput("request url is required".to_string()));
        }
        if self.url.chars().any(char::is_whitespace) {
            return Err(Error::InvalidInput(format!(
                "request url must not contain whitespace: '{}'",
                self.url
            )));
        }
        if let Some(name) = self.headers.keys().find(|name| name.trim().is_empty()) {
            return Err(Error::InvalidInput(format!("empty header name: '{name}'")));
        }
        Ok(())
    }
}

/// Queue-wide defaults applied when enqueue options leave them unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuePolicy {
    /// Retries granted after the first failed attempt.
    pub max_retries: u32,
    /// Base backoff delay in milliseconds.
    pub retry_delay_ms: u64,
    /// Upper bound for the exponential backoff delay.
    pub max_backoff_ms: u64,
    /// Keep at most this many succeeded records (oldest pruned first).
    pub max_succeeded: Option<usize>,
}

impl Default for QueuePolicy {
    fn default() -> Self {
        QueuePolicy {
            max_retries: 3,
            retry_delay_ms: 1_000,
            max_backoff_ms: 30_000,
            max_succeeded: None,
        }
    }
}

/// Caller-chosen metadata and retry overrides for one enqueue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnqueueOptions {
    pub priority: i32,
    pub tags: BTreeSet<String>,
    pub group_id: Option<String>,
    pub max_retries: Option<u32>,
    pub retry_delay: Option<Duration>,
}

impl EnqueueOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }
}

/// A queued request plus its lifecycle metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Unique identifier (format: `req-{hash}`).
    pub id: String,
    pub request: RequestDescription,
    /// Higher values are attempted first.
    pub priority: i32,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub status: Status,
    pub retry_count: u32,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Creation time in milliseconds since Unix epoch.
    pub created_at_ms: u64,
    /// Enqueue sequence number; breaks ties within one millisecond.
    pub seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_attempt_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl RequestRecord {
    /// True when the record may be attempted at `now_ms`.
    pub fn is_ready(&self, now_ms: u64) -> bool {
        self.status.is_active() && self.next_attempt_at_ms.is_none_or(|at| at <= now_ms)
    }

    /// Backoff before the next attempt, given the retries used so far.
    ///
    /// `retry_delay * 2^retry_count`, capped at `max_backoff_ms`.
    pub fn backoff_delay_ms(&self, max_backoff_ms: u64) -> u64 {
        let factor = 1u64.checked_shl(self.retry_count).unwrap_or(u64::MAX);
        self.retry_delay_ms.saturating_mul(factor).min(max_backoff_ms)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn in_group(&self, group_id: &str) -> bool {
        self.group_id.as_deref() == Some(group_id)
    }

    /// Creation time as a UTC timestamp, for display.
    pub fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.created_at_ms as i64).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
