// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use crate::colors;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

pub use args::{EnqueueArgs, ListFilterArgs};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "rq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operate an offline-resilient priority request queue")]
#[command(
    long_about = "Operate an offline-resilient priority request queue.\n\n\
    Inspect, edit and drain the queue file an application writes when its requests \
    cannot be delivered."
)]
#[command(styles = colors::styles())]
pub struct Cli {
    /// Queue file (overrides store_path from the config)
    #[arg(long, global = true, value_name = "path")]
    pub queue: Option<PathBuf>,

    /// Config file [default: .rq/config.toml]
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show queue counts
    Status {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List queued requests in priority order
    #[command(after_help = "\
Examples:
  rq list                       List every request
  rq list -s failed             List failed requests
  rq list -s pending,retrying   List requests still waiting
  rq list -t scores -o json     List requests tagged 'scores' as JSON")]
    List {
        #[command(flatten)]
        filter: ListFilterArgs,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show one request in detail
    #[command(arg_required_else_help = true)]
    Show {
        /// Request id
        id: String,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Add a request to the queue
    #[command(
        arg_required_else_help = true,
        after_help = "\
Examples:
  rq enqueue GET https://api.example.com/ping
  rq enqueue POST https://api.example.com/scores -H 'Content-Type: application/json' \\
      --body '{\"score\":42}' -p 5 -t scores -g level-3"
    )]
    Enqueue {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS)
        method: String,

        /// Absolute url, or a path when base_url is configured
        url: String,

        #[command(flatten)]
        args: EnqueueArgs,
    },

    /// Move failed request(s) back to pending
    #[command(arg_required_else_help = true)]
    Retry {
        /// Request id
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<String>,

        /// Retry every failed request
        #[arg(long)]
        all: bool,
    },

    /// Delete a request, or every request in a group
    #[command(arg_required_else_help = true)]
    Remove {
        /// Request id
        #[arg(required_unless_present = "group", conflicts_with = "group")]
        id: Option<String>,

        /// Remove every request in this group
        #[arg(long, short)]
        group: Option<String>,
    },

    /// Delete requests in bulk
    #[command(arg_required_else_help = true)]
    Clear {
        /// Delete failed requests
        #[arg(long, required_unless_present_any = ["succeeded", "all"])]
        failed: bool,

        /// Delete succeeded requests
        #[arg(long)]
        succeeded: bool,

        /// Delete every request
        #[arg(long, conflicts_with_all = ["failed", "succeeded"])]
        all: bool,
    },

    /// Send queued requests until none are pending or retrying
    Drain {
        /// Give up after this many seconds
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Configuration management commands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
