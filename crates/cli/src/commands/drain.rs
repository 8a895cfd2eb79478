// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;

use crate::display::{format_counts, format_event};
use crate::error::{Error, Result};
use crate::sync::{QueueClient, QueueEvent, Transport};

use super::Context;

pub fn run(ctx: &Context, timeout_secs: u64) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let client = QueueClient::open_http(&ctx.config)?;
        let mut stdout = std::io::stdout();
        drain_impl(&client, Duration::from_secs(timeout_secs), &mut stdout).await
    })
}

/// Start the client's drain and report progress to `out` until nothing is
/// pending or retrying.
pub(crate) async fn drain_impl<T, W>(
    client: &QueueClient<T>,
    timeout: Duration,
    out: &mut W,
) -> Result<()>
where
    T: Transport + 'static,
    W: Write,
{
    let mut events = client.subscribe();
    let stats = client.stats();
    tracing::info!(pending = stats.pending, retrying = stats.retrying, "draining queue");
    client.start();

    let drained = client.wait_until_drained(timeout);
    tokio::pin!(drained);

    let drained = loop {
        tokio::select! {
            done = &mut drained => break done,
            event = events.recv() => match event {
                Ok(event) => report(out, &event)?,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "drain output fell behind");
                }
                Err(RecvError::Closed) => break (&mut drained).await,
            },
        }
    };

    client.shutdown();
    while let Ok(event) = events.try_recv() {
        report(out, &event)?;
    }

    let counts = *client.watch_counts().borrow();
    writeln!(out, "{}", format_counts(&counts))?;

    if drained {
        Ok(())
    } else {
        Err(Error::DrainTimeout {
            secs: timeout.as_secs(),
            remaining: counts.active(),
        })
    }
}

fn report<W: Write>(out: &mut W, event: &QueueEvent) -> Result<()> {
    if let Some(line) = format_event(event) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
