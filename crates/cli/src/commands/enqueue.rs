// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use rq_core::{EnqueueOptions, Method, QueueStore, RequestDescription};

use crate::cli::EnqueueArgs;
use crate::error::{Error, Result};

use super::{open_queue, Context};

pub fn run(ctx: &Context, method: &str, url: &str, args: &EnqueueArgs) -> Result<()> {
    let mut queue = open_queue(&ctx.config)?;
    let id = run_impl(&mut queue, method, url, args)?;
    println!("{}", id);
    Ok(())
}

/// Internal implementation that accepts the queue for testing.
pub(crate) fn run_impl(
    queue: &mut QueueStore,
    method: &str,
    url: &str,
    args: &EnqueueArgs,
) -> Result<String> {
    let method: Method = method.parse()?;
    let mut request = RequestDescription::new(method, url.trim());
    for header in &args.headers {
        let (name, value) = parse_header(header)?;
        request = request.with_header(name, value);
    }
    if let Some(body) = &args.body {
        request = request.with_body(body.clone());
    }

    let mut options = EnqueueOptions::new().priority(args.priority);
    for tag in &args.tags {
        options = options.tag(tag.trim());
    }
    if let Some(group) = &args.group {
        options = options.group(group.trim());
    }
    if let Some(max_retries) = args.max_retries {
        options = options.max_retries(max_retries);
    }
    if let Some(delay_ms) = args.retry_delay_ms {
        options = options.retry_delay(Duration::from_millis(delay_ms));
    }

    let id = queue.enqueue(request, options)?;
    tracing::info!(%id, %method, url, "enqueued request");
    Ok(id)
}

/// Split a `Name: value` header argument.
pub(crate) fn parse_header(raw: &str) -> Result<(&str, &str)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::InvalidHeader(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(Error::InvalidHeader(raw.to_string()));
    }
    Ok((name, value.trim()))
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
