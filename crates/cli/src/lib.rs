// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rqrs - an offline-resilient priority request queue.
//!
//! This crate provides the async side of the `rq` queue and the `rq` CLI
//! that operates on its queue file.
//!
//! # Main Components
//!
//! - [`sync::QueueClient`] - send-or-queue entry point for applications
//! - [`sync::Scheduler`] - background drain with retry and backoff
//! - [`sync::NetworkMonitor`] - online/offline state and change listeners
//! - [`sync::Transport`] - the seam HTTP delivery goes through
//! - [`QueueConfig`] - TOML configuration for paths and retry policy
//! - [`Error`] - Error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use rqrs::sync::{QueueClient, RequestOptions};
//! use rqrs::QueueConfig;
//! use rq_core::{Method, RequestDescription};
//!
//! let client = QueueClient::open_http(&QueueConfig::default())?;
//! client.start();
//!
//! let request = RequestDescription::new(Method::Post, "https://api.example.com/scores")
//!     .with_body("{\"score\":42}");
//! let outcome = client.request(request, RequestOptions::new()).await;
//! if let Some(id) = outcome.queued_id() {
//!     println!("queued as {id}");
//! }
//! ```

mod cli;
pub mod colors;
mod commands;
mod display;
mod env;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, ConfigCommand, EnqueueArgs, ListFilterArgs, OutputFormat};
pub use config::QueueConfig;
pub use error::{Error, Result};

use commands::Context;

/// Run one CLI invocation against the configured queue.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context::load(cli.queue, cli.config)?;
    tracing::debug!("using queue {}", ctx.store_path().display());

    match cli.command {
        Command::Status { output } => commands::status::run(&ctx, output),
        Command::List { filter, output } => commands::list::run(&ctx, &filter, output),
        Command::Show { id, output } => commands::show::run(&ctx, &id, output),
        Command::Enqueue { method, url, args } => commands::enqueue::run(&ctx, &method, &url, &args),
        Command::Retry { id, all } => commands::retry::run(&ctx, id.as_deref(), all),
        Command::Remove { id, group } => {
            commands::remove::run(&ctx, id.as_deref(), group.as_deref())
        }
        Command::Clear {
            failed,
            succeeded,
            all,
        } => commands::clear::run(&ctx, failed, succeeded, all),
        Command::Drain { timeout_secs } => commands::drain::run(&ctx, timeout_secs),
        Command::Config(cmd) => commands::config::run(&ctx, &cmd),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
