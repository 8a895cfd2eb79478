// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::run_impl;
use crate::commands::testing::TestContext;
use crate::error::Error;
use rq_core::Status;

#[test]
fn test_retry_one() {
    let mut ctx = TestContext::new();
    let id = ctx.enqueue("https://api.example.com/a", 0);
    ctx.fail(&id);

    let out = run_impl(&mut ctx.queue, Some(&id), false).unwrap();

    assert_eq!(out, format!("retrying {id}"));
    let record = ctx.queue.get(&id).unwrap();
    assert_eq!(record.status, Status::Pending);
    assert_eq!(record.retry_count, 0);
    assert!(record.error_message.is_none());
}

#[test]
fn test_retry_rejects_pending() {
    let mut ctx = TestContext::new();
    let id = ctx.enqueue("https://api.example.com/a", 0);

    let err = run_impl(&mut ctx.queue, Some(&id), false).unwrap_err();

    assert!(matches!(err, Error::Queue(rq_core::Error::InvalidTransition { .. })));
    assert!(err.to_string().contains("only failed requests can be retried"));
}

#[test]
fn test_retry_missing() {
    let mut ctx = TestContext::new();
    let err = run_impl(&mut ctx.queue, Some("req-missing"), false).unwrap_err();
    assert!(matches!(err, Error::Queue(rq_core::Error::RecordNotFound(_))));
}

#[test]
fn test_retry_all() {
    let mut ctx = TestContext::new();
    let a = ctx.enqueue("https://api.example.com/a", 0);
    let b = ctx.enqueue("https://api.example.com/b", 0);
    let c = ctx.enqueue("https://api.example.com/c", 0);
    ctx.fail(&a).fail(&b).succeed(&c);

    let out = run_impl(&mut ctx.queue, None, true).unwrap();

    assert_eq!(out, "retrying 2 failed request(s)");
    assert_eq!(ctx.status(&a), Some(Status::Pending));
    assert_eq!(ctx.status(&b), Some(Status::Pending));
    assert_eq!(ctx.status(&c), Some(Status::Succeeded));
}

#[test]
fn test_retry_all_with_nothing_failed() {
    let mut ctx = TestContext::new();
    ctx.enqueue("https://api.example.com/a", 0);
    assert_eq!(
        run_impl(&mut ctx.queue, None, true).unwrap(),
        "retrying 0 failed request(s)"
    );
}
