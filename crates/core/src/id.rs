// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sha2::{Digest, Sha256};

use crate::record::RequestDescription;

/// Prefix shared by every request id.
pub const ID_PREFIX: &str = "req";

/// Generate a request ID from its description, creation time and sequence.
/// Format: req-{hash} where hash is first 8 hex chars of SHA256(method url time seq)
pub fn generate_id(request: &RequestDescription, created_at_ms: u64, seq: u64) -> String {
    let input = format!("{} {} {} {}", request.method, request.url, created_at_ms, seq);
    let hash = Sha256::digest(input.as_bytes());
    let short_hash = hex::encode(&hash[..4]);
    format!("{}-{}", ID_PREFIX, short_hash)
}

/// Generate a unique ID, handling collisions by appending incrementing suffix.
pub fn generate_unique_id<F>(
    request: &RequestDescription,
    created_at_ms: u64,
    seq: u64,
    exists: F,
) -> String
where
    F: Fn(&str) -> bool,
{
    let base_id = generate_id(request, created_at_ms, seq);

    if !exists(&base_id) {
        return base_id;
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id) {
            return id;
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
