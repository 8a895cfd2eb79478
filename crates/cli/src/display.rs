// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rq_core::{QueueCounts, RequestRecord, Status};

use crate::colors;
use crate::sync::QueueEvent;

/// Human-readable span of milliseconds ("850ms", "12s", "4m", "3h", "2d").
pub fn format_duration_ms(ms: u64) -> String {
    const SECOND: u64 = 1_000;
    const MINUTE: u64 = 60 * SECOND;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    match ms {
        ms if ms < SECOND => format!("{ms}ms"),
        ms if ms < MINUTE => format!("{}s", ms / SECOND),
        ms if ms < HOUR => format!("{}m", ms / MINUTE),
        ms if ms < DAY => format!("{}h", ms / HOUR),
        ms => format!("{}d", ms / DAY),
    }
}

/// Relative past time ("just now", "5m ago").
pub fn time_ago(then_ms: u64, now_ms: u64) -> String {
    let elapsed = now_ms.saturating_sub(then_ms);
    if elapsed < 1_000 {
        "just now".to_string()
    } else {
        format!("{} ago", format_duration_ms(elapsed))
    }
}

/// Note shown after a record's url: retry progress or backoff.
fn retry_note(record: &RequestRecord, now_ms: u64) -> Option<String> {
    match record.status {
        Status::Retrying => {
            let mut note = format!("retry {}/{}", record.retry_count, record.max_retries);
            if let Some(at) = record.next_attempt_at_ms.filter(|at| *at > now_ms) {
                note.push_str(&format!(", next in {}", format_duration_ms(at - now_ms)));
            }
            Some(note)
        }
        Status::Failed if record.retry_count > 0 => {
            Some(format!("after {} retries", record.retry_count))
        }
        _ => None,
    }
}

/// One-line summary of a record.
///
/// Output format:
/// ```text
/// - [retrying] req-1a2b3c4d p5 POST https://api.example.com/scores (retry 1/3, next in 2s)
/// ```
pub fn format_record_line(record: &RequestRecord, now_ms: u64, colorize: bool) -> String {
    let mut line = format!(
        "- [{}] {} p{} {} {}",
        colors::status(record.status, colorize),
        record.id,
        record.priority,
        record.request.method,
        record.request.url
    );
    if let Some(note) = retry_note(record, now_ms) {
        line.push_str(&format!(" ({note})"));
    }
    line
}

/// Multi-line detail view of a record.
pub fn format_record_details(record: &RequestRecord, now_ms: u64) -> Vec<String> {
    let mut lines = vec![
        format!("[{}] {}", record.status, record.id),
        format!("{} {}", record.request.method, record.request.url),
        format!("Priority: {}", record.priority),
        format!(
            "Created: {} ({})",
            record.created_at().format("%Y-%m-%d %H:%M:%S"),
            time_ago(record.created_at_ms, now_ms)
        ),
        format!("Retries: {}/{}", record.retry_count, record.max_retries),
    ];

    if !record.tags.is_empty() {
        let tags: Vec<&str> = record.tags.iter().map(String::as_str).collect();
        lines.push(format!("Tags: {}", tags.join(", ")));
    }
    if let Some(group) = &record.group_id {
        lines.push(format!("Group: {group}"));
    }
    if let Some(at) = record.last_attempt_at_ms {
        lines.push(format!("Last attempt: {}", time_ago(at, now_ms)));
    }
    if record.status == Status::Retrying {
        if let Some(at) = record.next_attempt_at_ms {
            let when = if at > now_ms {
                format!("in {}", format_duration_ms(at - now_ms))
            } else {
                "now".to_string()
            };
            lines.push(format!("Next attempt: {when}"));
        }
    }
    if let Some(error) = &record.error_message {
        lines.push(format!("Error: {error}"));
    }

    if !record.request.headers.is_empty() {
        lines.push(String::new());
        lines.push("Headers:".to_string());
        for (name, value) in &record.request.headers {
            lines.push(format!("  {name}: {value}"));
        }
    }
    if let Some(body) = &record.request.body {
        lines.push(String::new());
        lines.push("Body:".to_string());
        lines.extend(body.lines().map(|line| format!("  {line}")));
    }

    lines
}

/// Single-line count summary.
pub fn format_counts(counts: &QueueCounts) -> String {
    format!(
        "total: {}  pending: {}  retrying: {}  failed: {}  succeeded: {}",
        counts.total, counts.pending, counts.retrying, counts.failed, counts.succeeded
    )
}

/// Progress line for a drain event. Lifecycle events print nothing.
pub fn format_event(event: &QueueEvent) -> Option<String> {
    match event {
        QueueEvent::Succeeded { id, status } => Some(format!("sent {id} ({status})")),
        QueueEvent::Retrying { id, retry_count, error } => {
            Some(format!("retrying {id} (retry {retry_count}): {error}"))
        }
        QueueEvent::Failed { id, error } => Some(format!("failed {id}: {error}")),
        QueueEvent::Discarded { id } => Some(format!("discarded {id}")),
        QueueEvent::Started
        | QueueEvent::Stopped
        | QueueEvent::Enqueued { .. }
        | QueueEvent::AttemptStarted { .. } => None,
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
