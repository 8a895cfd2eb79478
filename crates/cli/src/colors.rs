// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color utilities for help and status output.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

use clap::builder::styling::Styles;
use rq_core::Status;

use crate::env;

/// ANSI 256-color codes.
pub mod codes {
    /// Section headers: pastel cyan/steel blue
    pub const HEADER: u8 = 74;
    /// Commands/literals: light grey
    pub const LITERAL: u8 = 250;
    /// Default values/context: medium grey
    pub const CONTEXT: u8 = 245;
    /// Waiting for an attempt: yellow
    pub const PENDING: u8 = 179;
    /// Failed: soft red
    pub const FAILED: u8 = 167;
    /// Succeeded: green
    pub const SUCCEEDED: u8 = 108;
}

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if env::no_color() {
        return false;
    }

    if env::force_color() {
        return true;
    }

    std::io::stdout().is_terminal()
}

/// Format a 256-color ANSI escape sequence for foreground color.
fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

const RESET: &str = "\x1b[0m";

fn paint(code: u8, text: &str) -> String {
    format!("{}{}{}", fg256(code), text, RESET)
}

/// Status label, colored when `colorize` is set.
pub fn status(status: Status, colorize: bool) -> String {
    let label = status.as_str();
    if !colorize {
        return label.to_string();
    }
    let code = match status {
        Status::Pending | Status::Retrying => codes::PENDING,
        Status::Failed => codes::FAILED,
        Status::Succeeded => codes::SUCCEEDED,
    };
    paint(code, label)
}

/// Clap styles for help output.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let color = |code| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));
    Styles::styled()
        .header(color(codes::HEADER))
        .usage(color(codes::HEADER))
        .literal(color(codes::LITERAL))
        .placeholder(color(codes::CONTEXT))
        .valid(color(codes::CONTEXT))
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
