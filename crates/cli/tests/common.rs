// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Url on a port nothing listens on, so sends fail fast.
pub const UNREACHABLE: &str = "http://127.0.0.1:1/scores";

pub fn rq() -> Command {
    let mut cmd = cargo_bin_cmd!("rq");
    cmd.env_remove("RQ_QUEUE").env_remove("RQ_CONFIG");
    cmd
}

/// `rq` run inside `temp` with its own queue and config files.
pub fn rq_in(temp: &TempDir) -> Command {
    let mut cmd = rq();
    cmd.current_dir(temp.path())
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--queue")
        .arg(temp.path().join("queue.jsonl"))
        .arg("--config")
        .arg(temp.path().join("config.toml"));
    cmd
}

/// Enqueue a request and return its id.
pub fn enqueue(temp: &TempDir, method: &str, url: &str, extra: &[&str]) -> String {
    let output = rq_in(temp)
        .arg("enqueue")
        .arg(method)
        .arg(url)
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success(), "enqueue failed: {output:?}");

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Config with a short timeout so drains against [`UNREACHABLE`] finish fast.
pub fn write_fast_config(temp: &TempDir) {
    std::fs::write(
        temp.path().join("config.toml"),
        "retry_delay_ms = 10\nmax_backoff_ms = 20\nrequest_timeout_ms = 500\n",
    )
    .unwrap();
}

/// Enqueue an unreachable request with no retries and drain it to `failed`.
pub fn failed_request(temp: &TempDir, extra: &[&str]) -> String {
    write_fast_config(temp);
    let mut args = vec!["--max-retries", "0"];
    args.extend_from_slice(extra);
    let id = enqueue(temp, "POST", UNREACHABLE, &args);
    rq_in(temp).arg("drain").arg("--timeout-secs").arg("10").assert().success();
    id
}

pub fn list_json(temp: &TempDir, extra: &[&str]) -> Vec<serde_json::Value> {
    let output = rq_in(temp)
        .args(["list", "-o", "json"])
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success(), "list failed: {output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}
