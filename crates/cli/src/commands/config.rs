// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::cli::ConfigCommand;
use crate::config::QueueConfig;
use crate::error::{Error, Result};

use super::Context;

pub fn run(ctx: &Context, cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => print!("{}", show_impl(&ctx.config)?),
        ConfigCommand::Init { force } => println!("{}", init_impl(&ctx.config_path, *force)?),
    }
    Ok(())
}

/// Render the effective configuration as TOML.
pub(crate) fn show_impl(config: &QueueConfig) -> Result<String> {
    toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))
}

/// Write the default configuration to `path`.
pub(crate) fn init_impl(path: &Path, force: bool) -> Result<String> {
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists\n  hint: pass --force to overwrite it",
            path.display()
        )));
    }
    QueueConfig::default().save(path)?;
    tracing::info!("wrote default config to {}", path.display());
    Ok(format!("wrote {}", path.display()))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
