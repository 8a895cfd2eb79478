// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rq_core::QueueStore;

use crate::error::Result;

use super::{open_queue, Context};

pub fn run(ctx: &Context, failed: bool, succeeded: bool, all: bool) -> Result<()> {
    let mut queue = open_queue(&ctx.config)?;
    println!("{}", run_impl(&mut queue, failed, succeeded, all)?);
    Ok(())
}

/// Internal implementation that accepts the queue for testing.
pub(crate) fn run_impl(
    queue: &mut QueueStore,
    failed: bool,
    succeeded: bool,
    all: bool,
) -> Result<String> {
    let removed = if all {
        queue.clear_all()?
    } else {
        let mut removed = 0;
        if failed {
            removed += queue.clear_failed()?;
        }
        if succeeded {
            removed += queue.clear_succeeded()?;
        }
        removed
    };

    tracing::info!(removed, "cleared requests");
    Ok(format!("removed {} request(s)", removed))
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
