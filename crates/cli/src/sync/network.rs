// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity tracking.
//!
//! [`NetworkMonitor`] holds the current online flag and fans changes out to
//! registered callbacks and `watch` subscribers. Notifications are
//! edge-triggered: setting the same value twice notifies once.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle returned by [`NetworkMonitor::on_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(bool) + Send + Sync>;

/// Shared online/offline state with change notification.
pub struct NetworkMonitor {
    online: AtomicBool,
    sender: watch::Sender<bool>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
}

impl NetworkMonitor {
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        NetworkMonitor {
            online: AtomicBool::new(online),
            sender,
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Record a new connectivity state.
    ///
    /// Returns true if the state changed; listeners only run on a change.
    pub fn set_online(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous == online {
            return false;
        }

        tracing::info!(online, "network state changed");
        self.sender.send_if_modified(|current| {
            let changed = *current != online;
            *current = online;
            changed
        });

        // Callbacks run outside the lock so they may register or remove
        // listeners themselves.
        let listeners: Vec<Listener> = self
            .lock_listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(online);
        }
        true
    }

    /// Register a callback run on every online/offline transition.
    pub fn on_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.lock_listeners().push((id, Arc::new(listener)));
        id
    }

    /// Unregister a callback. Returns false if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Async view of the online flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    /// Poll `check` every `interval` and feed the result into the monitor.
    ///
    /// Stops when `cancel` fires.
    pub fn spawn_probe<F, Fut>(
        self: &Arc<Self>,
        interval: Duration,
        check: F,
        cancel: CancellationToken,
    ) -> JoinHandle<()>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let online = tokio::select! {
                    _ = cancel.cancelled() => break,
                    online = check() => online,
                };
                monitor.set_online(online);

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            tracing::debug!("network probe stopped");
        })
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for NetworkMonitor {
    /// Starts online, so a queue without a monitor source drains immediately.
    fn default() -> Self {
        Self::new(true)
    }
}

impl std::fmt::Debug for NetworkMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkMonitor")
            .field("online", &self.is_online())
            .field("listeners", &self.lock_listeners().len())
            .finish()
    }
}
