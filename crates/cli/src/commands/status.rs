// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use rq_core::{QueueCounts, QueueStore};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::display::{format_counts, format_duration_ms};
use crate::error::Result;

use super::{open_queue, Context};

/// JSON output structure for the status command.
#[derive(Debug, Serialize)]
pub(crate) struct StatusJson {
    store_path: String,
    #[serde(flatten)]
    counts: QueueCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_attempt_at_ms: Option<u64>,
}

pub fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let queue = open_queue(&ctx.config)?;
    print!("{}", run_impl(&queue, ctx.store_path(), output)?);
    Ok(())
}

/// Internal implementation that accepts the queue for testing.
pub(crate) fn run_impl(queue: &QueueStore, store_path: &Path, output: OutputFormat) -> Result<String> {
    let counts = queue.counts();
    let next_attempt_at_ms = queue.next_wake_at();

    match output {
        OutputFormat::Json => {
            let status = StatusJson {
                store_path: store_path.display().to_string(),
                counts,
                next_attempt_at_ms,
            };
            Ok(format!("{}\n", serde_json::to_string(&status)?))
        }
        OutputFormat::Text => {
            let mut out = format!("queue: {}\n{}\n", store_path.display(), format_counts(&counts));
            if let Some(at) = next_attempt_at_ms {
                let wait = at.saturating_sub(queue.now_ms());
                out.push_str(&format!("next retry in {}\n", format_duration_ms(wait)));
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
