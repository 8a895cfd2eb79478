// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.

use clap::Args;

/// Filters for listing requests.
#[derive(Args, Clone, Debug, Default)]
pub struct ListFilterArgs {
    /// Filter by status (comma-separated for OR)
    #[arg(long, short, value_delimiter = ',')]
    pub status: Vec<String>,

    /// Filter by tag
    #[arg(long, short)]
    pub tag: Option<String>,

    /// Filter by group
    #[arg(long, short)]
    pub group: Option<String>,
}

/// Request metadata for `rq enqueue`.
#[derive(Args, Clone, Debug, Default)]
pub struct EnqueueArgs {
    /// Header as 'Name: value' (repeatable)
    #[arg(long = "header", short = 'H')]
    pub headers: Vec<String>,

    /// Request body
    #[arg(long, short)]
    pub body: Option<String>,

    /// Priority; higher is sent first
    #[arg(long, short, default_value_t = 0, allow_negative_numbers = true)]
    pub priority: i32,

    /// Tag (repeatable)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,

    /// Group id
    #[arg(long, short)]
    pub group: Option<String>,

    /// Retries after the first failed attempt (default from config)
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Base backoff delay in milliseconds (default from config)
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,
}
