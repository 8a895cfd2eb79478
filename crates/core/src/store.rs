// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable storage for request records.
//!
//! [`JsonlStore`] keeps one JSON record per line. Every save rewrites the
//! whole image into a temp file, fsyncs it and renames it over the target,
//! so a crash leaves either the previous image or the new one.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::record::RequestRecord;

/// Key-value durable store for the full set of records.
pub trait PersistentStore: Send {
    /// Read every persisted record.
    fn load(&self) -> Result<Vec<RequestRecord>>;

    /// Replace the persisted image with `records`.
    fn save(&self, records: &[&RequestRecord]) -> Result<()>;

    /// Move an unreadable image aside so the next save does not destroy it.
    fn quarantine(&self) -> Result<()> {
        Ok(())
    }
}

/// JSONL file store guarded by an exclusive lock file.
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    /// Held for the lifetime of the store; dropping it releases the lock.
    _lock: File,
}

impl JsonlStore {
    /// Open (or prepare to create) a store at `path`.
    ///
    /// Fails with [`Error::Locked`] if another process owns the file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock = acquire_lock(&sibling(path, ".lock"))?;

        Ok(JsonlStore {
            path: path.to_path_buf(),
            _lock: lock,
        })
    }

    /// Path of the queue file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where [`PersistentStore::quarantine`] moves a corrupt image.
    pub fn quarantine_path(&self) -> PathBuf {
        sibling(&self.path, ".corrupt")
    }
}

impl PersistentStore for JsonlStore {
    fn load(&self) -> Result<Vec<RequestRecord>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: RequestRecord = serde_json::from_str(&line).map_err(|e| {
                Error::CorruptedData(format!("{}:{}: {}", self.path.display(), index + 1, e))
            })?;
            records.push(record);
        }

        Ok(records)
    }

    fn save(&self, records: &[&RequestRecord]) -> Result<()> {
        let tmp_path = sibling(&self.path, ".tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            for record in records {
                let json = serde_json::to_string(record)?;
                writeln!(writer, "{json}")?;
            }
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn quarantine(&self) -> Result<()> {
        if self.path.exists() {
            fs::rename(&self.path, self.quarantine_path())?;
        }
        Ok(())
    }
}

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn acquire_lock(lock_path: &Path) -> Result<File> {
    use fs2::FileExt;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| Error::Locked(lock_path.display().to_string()))?;
    Ok(file)
}

#[derive(Debug, Default)]
struct MemoryImage {
    records: Vec<RequestRecord>,
    corrupt: bool,
    fail_saves: bool,
    saves: usize,
}

/// In-process store for ephemeral queues and tests.
///
/// Clones share the same image, so a test can keep one handle and "restart"
/// a queue by opening a second one on a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    image: Arc<Mutex<MemoryImage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `records`.
    pub fn with_records(records: Vec<RequestRecord>) -> Self {
        let store = Self::new();
        store.lock().records = records;
        store
    }

    /// Make the next loads fail as if the image could not be parsed.
    pub fn set_corrupt(&self, corrupt: bool) {
        self.lock().corrupt = corrupt;
    }

    /// Make subsequent saves fail with an I/O error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    /// Records as of the last successful save.
    pub fn snapshot(&self) -> Vec<RequestRecord> {
        self.lock().records.clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryImage> {
        self.image.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PersistentStore for MemoryStore {
    fn load(&self) -> Result<Vec<RequestRecord>> {
        let image = self.lock();
        if image.corrupt {
            return Err(Error::CorruptedData("memory image marked corrupt".to_string()));
        }
        Ok(image.records.clone())
    }

    fn save(&self, records: &[&RequestRecord]) -> Result<()> {
        let mut image = self.lock();
        if image.fail_saves {
            return Err(Error::Io(std::io::Error::other("simulated save failure")));
        }
        image.records = records.iter().map(|r| (*r).clone()).collect();
        image.saves += 1;
        Ok(())
    }

    fn quarantine(&self) -> Result<()> {
        let mut image = self.lock();
        image.records.clear();
        image.corrupt = false;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
