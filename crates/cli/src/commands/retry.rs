// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rq_core::QueueStore;

use crate::error::Result;

use super::{open_queue, Context};

pub fn run(ctx: &Context, id: Option<&str>, all: bool) -> Result<()> {
    let mut queue = open_queue(&ctx.config)?;
    println!("{}", run_impl(&mut queue, id, all)?);
    Ok(())
}

/// Internal implementation that accepts the queue for testing.
pub(crate) fn run_impl(queue: &mut QueueStore, id: Option<&str>, all: bool) -> Result<String> {
    match id {
        Some(id) if !all => {
            queue.retry(id)?;
            tracing::info!(%id, "retried request");
            Ok(format!("retrying {}", id))
        }
        _ => {
            let count = queue.retry_all_failed()?;
            tracing::info!(count, "retried failed requests");
            Ok(format!("retrying {} failed request(s)", count))
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
