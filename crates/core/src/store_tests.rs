// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::record::{Method, RequestDescription, Status};
use std::collections::BTreeSet;
use tempfile::TempDir;

fn make_record(id: &str, priority: i32) -> RequestRecord {
    RequestRecord {
        id: id.to_string(),
        request: RequestDescription::new(Method::Put, "https://api.example.com/decks/7")
            .with_header("Authorization", "Bearer t0k3n")
            .with_body("{\"cards\":[1,2,3]}"),
        priority,
        tags: BTreeSet::from(["decks".to_string()]),
        group_id: Some("deck-editor".to_string()),
        status: Status::Retrying,
        retry_count: 2,
        max_retries: 4,
        retry_delay_ms: 500,
        created_at_ms: 1_700_000_000_123,
        seq: 9,
        next_attempt_at_ms: Some(1_700_000_002_123),
        last_attempt_at_ms: Some(1_700_000_000_623),
        error_message: Some("connection refused".to_string()),
    }
}

#[test]
fn load_returns_empty_for_missing_file() {
    let dir = TempDir::new().unwrap();
    let store = JsonlStore::open(&dir.path().join("queue.jsonl")).unwrap();
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn open_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".rq").join("nested").join("queue.jsonl");
    let store = JsonlStore::open(&path).unwrap();
    store.save(&[]).unwrap();
    assert!(path.exists());
}

#[test]
fn save_and_load_is_lossless() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.jsonl");
    let a = make_record("req-aaaaaaaa", 5);
    let b = make_record("req-bbbbbbbb", -1);

    {
        let store = JsonlStore::open(&path).unwrap();
        store.save(&[&a, &b]).unwrap();
    }

    let store = JsonlStore::open(&path).unwrap();
    let loaded = store.load().unwrap();
    assert_eq!(loaded, vec![a, b]);
}

#[test]
fn save_replaces_previous_image() {
    let dir = TempDir::new().unwrap();
    let store = JsonlStore::open(&dir.path().join("queue.jsonl")).unwrap();
    let a = make_record("req-aaaaaaaa", 1);
    let b = make_record("req-bbbbbbbb", 2);

    store.save(&[&a, &b]).unwrap();
    store.save(&[&b]).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "req-bbbbbbbb");
    assert!(!sibling(store.path(), ".tmp").exists());
}

#[test]
fn load_skips_blank_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.jsonl");
    let json = serde_json::to_string(&make_record("req-aaaaaaaa", 1)).unwrap();
    std::fs::write(&path, format!("\n{json}\n   \n")).unwrap();

    let store = JsonlStore::open(&path).unwrap();
    assert_eq!(store.load().unwrap().len(), 1);
}

#[test]
fn load_reports_corrupt_line_number() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.jsonl");
    let json = serde_json::to_string(&make_record("req-aaaaaaaa", 1)).unwrap();
    std::fs::write(&path, format!("{json}\n{{not json\n")).unwrap();

    let store = JsonlStore::open(&path).unwrap();
    let err = store.load().unwrap_err();
    assert!(matches!(err, Error::CorruptedData(_)));
    assert!(err.to_string().contains(":2:"));
}

#[test]
fn quarantine_moves_file_aside() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.jsonl");
    std::fs::write(&path, "garbage").unwrap();

    let store = JsonlStore::open(&path).unwrap();
    store.quarantine().unwrap();

    assert!(!path.exists());
    assert_eq!(std::fs::read_to_string(store.quarantine_path()).unwrap(), "garbage");
}

#[test]
fn second_open_is_locked_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queue.jsonl");

    let first = JsonlStore::open(&path).unwrap();
    assert!(matches!(JsonlStore::open(&path), Err(Error::Locked(_))));

    drop(first);
    JsonlStore::open(&path).unwrap();
}

#[test]
fn memory_store_shares_image_between_clones() {
    let store = MemoryStore::new();
    let handle = store.clone();
    let a = make_record("req-aaaaaaaa", 1);

    store.save(&[&a]).unwrap();

    assert_eq!(handle.snapshot(), vec![a]);
    assert_eq!(handle.save_count(), 1);
}

#[test]
fn memory_store_simulates_failures() {
    let store = MemoryStore::with_records(vec![make_record("req-aaaaaaaa", 1)]);

    store.set_fail_saves(true);
    assert!(matches!(store.save(&[]), Err(Error::Io(_))));
    assert_eq!(store.snapshot().len(), 1);

    store.set_corrupt(true);
    assert!(matches!(store.load(), Err(Error::CorruptedData(_))));
    store.quarantine().unwrap();
    assert!(store.load().unwrap().is_empty());
}
