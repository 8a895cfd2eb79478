// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::str::FromStr;

use rq_core::{QueueStore, RequestRecord, Status};

use crate::cli::{ListFilterArgs, OutputFormat};
use crate::colors;
use crate::display::format_record_line;
use crate::error::Result;

use super::{open_queue, Context};

pub fn run(ctx: &Context, filter: &ListFilterArgs, output: OutputFormat) -> Result<()> {
    let queue = open_queue(&ctx.config)?;
    print!("{}", run_impl(&queue, filter, output, colors::should_colorize())?);
    Ok(())
}

/// Internal implementation that accepts the queue for testing.
pub(crate) fn run_impl(
    queue: &QueueStore,
    filter: &ListFilterArgs,
    output: OutputFormat,
    colorize: bool,
) -> Result<String> {
    let records = filtered(queue, filter)?;

    match output {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string(&records)?)),
        OutputFormat::Text if records.is_empty() => Ok("no requests\n".to_string()),
        OutputFormat::Text => {
            let now = queue.now_ms();
            Ok(records
                .iter()
                .map(|record| format!("{}\n", format_record_line(record, now, colorize)))
                .collect())
        }
    }
}

/// Records matching every given filter, in priority order.
fn filtered<'a>(queue: &'a QueueStore, filter: &ListFilterArgs) -> Result<Vec<&'a RequestRecord>> {
    let statuses = filter
        .status
        .iter()
        .map(|s| Status::from_str(s.trim()))
        .collect::<rq_core::Result<Vec<_>>>()?;

    let base = match (&filter.tag, &filter.group) {
        (Some(tag), _) => queue.list_by_tag(tag),
        (None, Some(group)) => queue.list_by_group(group),
        (None, None) => queue.list(),
    };

    Ok(base
        .into_iter()
        .filter(|r| statuses.is_empty() || statuses.contains(&r.status))
        .filter(|r| filter.group.as_deref().is_none_or(|g| r.in_group(g)))
        .collect())
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
