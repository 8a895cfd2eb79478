// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rq_core::QueueStore;

use crate::cli::OutputFormat;
use crate::display::format_record_details;
use crate::error::Result;

use super::{open_queue, Context};

pub fn run(ctx: &Context, id: &str, output: OutputFormat) -> Result<()> {
    let queue = open_queue(&ctx.config)?;
    print!("{}", run_impl(&queue, id, output)?);
    Ok(())
}

/// Internal implementation that accepts the queue for testing.
pub(crate) fn run_impl(queue: &QueueStore, id: &str, output: OutputFormat) -> Result<String> {
    let record = queue
        .get(id)
        .ok_or_else(|| rq_core::Error::RecordNotFound(id.to_string()))?;

    match output {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(record)?)),
        OutputFormat::Text => {
            let mut out = format_record_details(record, queue.now_ms()).join("\n");
            out.push('\n');
            Ok(out)
        }
    }
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
