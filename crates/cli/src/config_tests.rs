// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[test]
fn test_defaults() {
    let config = QueueConfig::default();
    assert_eq!(config.store_path, PathBuf::from(".rq/queue.jsonl"));
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.retry_delay_ms, 1_000);
    assert_eq!(config.max_backoff_ms, 30_000);
    assert_eq!(config.request_timeout(), Duration::from_secs(10));
    assert_eq!(config.direct_retries, 0);
    assert!(config.max_succeeded.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_file_uses_defaults() {
    let config: QueueConfig = toml::from_str("").unwrap();
    assert_eq!(config, QueueConfig::default());
}

#[test]
fn test_partial_file_overrides_only_given_keys() {
    let config: QueueConfig = toml::from_str(
        r#"
store_path = "/var/lib/app/queue.jsonl"
max_retries = 5
max_succeeded = 50
"#,
    )
    .unwrap();
    assert_eq!(config.store_path, PathBuf::from("/var/lib/app/queue.jsonl"));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.retry_delay_ms, 1_000);
    assert_eq!(config.max_succeeded, Some(50));
}

#[test]
fn test_policy_carries_retry_settings() {
    let config = QueueConfig {
        max_retries: 7,
        retry_delay_ms: 250,
        max_backoff_ms: 4_000,
        max_succeeded: Some(10),
        ..QueueConfig::default()
    };
    let policy = config.policy();
    assert_eq!(policy.max_retries, 7);
    assert_eq!(policy.retry_delay_ms, 250);
    assert_eq!(policy.max_backoff_ms, 4_000);
    assert_eq!(policy.max_succeeded, Some(10));
}

#[parameterized(
    zero_timeout = { "request_timeout_ms = 0", "request_timeout_ms" },
    backoff_below_delay = { "retry_delay_ms = 5000\nmax_backoff_ms = 100", "max_backoff_ms" },
    empty_store_path = { "store_path = \"\"", "store_path" },
)]
fn test_validate_rejects(toml_text: &str, field: &str) {
    let config: QueueConfig = toml::from_str(toml_text).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains(field), "{err}");
}

#[test]
fn test_save_and_load_roundtrip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".rq").join("config.toml");
    let config = QueueConfig {
        base_url: Some("https://api.example.com".to_string()),
        direct_retries: 2,
        ..QueueConfig::default()
    };

    config.save(&path).unwrap();
    assert_eq!(QueueConfig::load(&path).unwrap(), config);
}

#[test]
fn test_load_missing_file_errors() {
    let temp = TempDir::new().unwrap();
    let err = QueueConfig::load(&temp.path().join("config.toml")).unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}

#[test]
fn test_load_or_default_missing_file() {
    let temp = TempDir::new().unwrap();
    let config = QueueConfig::load_or_default(&temp.path().join("config.toml")).unwrap();
    assert_eq!(config, QueueConfig::default());
}

#[test]
fn test_load_malformed_toml_errors() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "max_retries = \"three\"").unwrap();

    let err = QueueConfig::load_or_default(&path).unwrap_err();
    assert!(err.to_string().contains("failed to parse"));
}

#[test]
fn test_load_validates() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "request_timeout_ms = 0").unwrap();

    assert!(matches!(QueueConfig::load(&path), Err(Error::Config(_))));
}
