// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use rq_core::QueueStore;

use crate::error::{Error, Result};

use super::{open_queue, Context};

pub fn run(ctx: &Context, id: Option<&str>, group: Option<&str>) -> Result<()> {
    let mut queue = open_queue(&ctx.config)?;
    println!("{}", run_impl(&mut queue, id, group)?);
    Ok(())
}

/// Internal implementation that accepts the queue for testing.
pub(crate) fn run_impl(
    queue: &mut QueueStore,
    id: Option<&str>,
    group: Option<&str>,
) -> Result<String> {
    match (id, group) {
        (Some(id), None) => {
            if !queue.remove(id)? {
                return Err(rq_core::Error::RecordNotFound(id.to_string()).into());
            }
            tracing::info!(%id, "removed request");
            Ok(format!("removed {}", id))
        }
        (None, Some(group)) => {
            let count = queue.remove_group(group)?;
            tracing::info!(group, count, "removed group");
            Ok(format!("removed {} request(s) in group {}", count, group))
        }
        _ => Err(Error::InvalidInput(
            "pass either a request id or --group".to_string(),
        )),
    }
}

#[cfg(test)]
#[path = "remove_tests.rs"]
mod tests;
