// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue store shared between the client and the scheduler.

use std::sync::{Mutex, MutexGuard};

use rq_core::{QueueCounts, QueueStore};
use tokio::sync::watch;

/// Mutex-guarded [`QueueStore`] that republishes counts after every write.
///
/// The lock is never held across an await point.
pub struct SharedQueue {
    store: Mutex<QueueStore>,
    counts: watch::Sender<QueueCounts>,
}

impl SharedQueue {
    pub fn new(store: QueueStore) -> Self {
        let (counts, _) = watch::channel(store.counts());
        SharedQueue { store: Mutex::new(store), counts }
    }

    /// Run a read-only closure against the store.
    pub fn read<R>(&self, f: impl FnOnce(&QueueStore) -> R) -> R {
        f(&self.lock())
    }

    /// Run a mutating closure, then publish the resulting counts.
    pub fn write<R>(&self, f: impl FnOnce(&mut QueueStore) -> R) -> R {
        let mut store = self.lock();
        let result = f(&mut store);
        let counts = store.counts();
        drop(store);
        self.counts.send_if_modified(|current| {
            let changed = *current != counts;
            *current = counts;
            changed
        });
        result
    }

    pub fn counts(&self) -> QueueCounts {
        self.read(QueueStore::counts)
    }

    /// Receiver that observes every change in counts.
    pub fn watch_counts(&self) -> watch::Receiver<QueueCounts> {
        self.counts.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, QueueStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for SharedQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedQueue").field("counts", &self.counts()).finish()
    }
}
