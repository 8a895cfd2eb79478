// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::run_impl;
use crate::cli::OutputFormat;
use crate::commands::testing::TestContext;
use crate::error::Error;

#[test]
fn test_show_text() {
    let mut ctx = TestContext::new();
    let id = ctx.enqueue("https://api.example.com/scores", 4);
    ctx.fail(&id);

    let out = run_impl(&ctx.queue, &id, OutputFormat::Text).unwrap();

    assert!(out.starts_with(&format!("[failed] {id}\n")));
    assert!(out.contains("GET https://api.example.com/scores\n"));
    assert!(out.contains("Priority: 4\n"));
    assert!(out.contains("Error: server responded 400: bad request\n"));
}

#[test]
fn test_show_json() {
    let mut ctx = TestContext::new();
    let id = ctx.enqueue("https://api.example.com/scores", 2);

    let out = run_impl(&ctx.queue, &id, OutputFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["status"], "pending");
    assert_eq!(json["request"]["method"], "GET");
    assert_eq!(json["request"]["url"], "https://api.example.com/scores");
}

#[test]
fn test_show_missing_record() {
    let ctx = TestContext::new();
    let err = run_impl(&ctx.queue, "req-missing", OutputFormat::Text).unwrap_err();
    assert!(matches!(
        err,
        Error::Queue(rq_core::Error::RecordNotFound(ref id)) if id == "req-missing"
    ));
}
