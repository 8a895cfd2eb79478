// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-facing queue client.
//!
//! Provides a high-level interface for:
//! - Sending requests directly while online, with queue fallback
//! - Queue management (cancel, retry, clear)
//! - Live statistics and event subscription
//! - Starting and stopping the background drain

use std::sync::Arc;
use std::time::Duration;

use rq_core::{
    ClockSource, EnqueueOptions, JsonlStore, PersistentStore, QueueCounts, QueueStore,
    RequestDescription, RequestRecord, SystemClock,
};
use serde::Serialize;
use tokio::sync::{broadcast, watch};

use super::network::NetworkMonitor;
use super::scheduler::{QueueEvent, Scheduler};
use super::shared::SharedQueue;
use super::transport::{HttpTransport, Response, Transport, TransportError};
use crate::config::QueueConfig;
use crate::error::{Error, Result};

/// Per-call options for [`QueueClient::request`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra direct attempts before falling back to the queue.
    /// Defaults to the configured `direct_retries`.
    pub retries: Option<u32>,
    /// Per-attempt timeout. Defaults to the configured request timeout.
    pub timeout: Option<Duration>,
    /// Metadata used if the request ends up queued.
    pub offline: EnqueueOptions,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn offline(mut self, options: EnqueueOptions) -> Self {
        self.offline = options;
        self
    }
}

/// How a [`QueueClient::request`] call ended.
#[derive(Debug)]
pub enum RequestOutcome {
    /// The server answered with a success status.
    Success(Response),
    /// The request was stored for later delivery.
    Queued { id: String },
    /// The request was rejected and not queued.
    Error(Error),
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success(_))
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, RequestOutcome::Queued { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RequestOutcome::Error(_))
    }

    /// Id of the queued record, if the request was queued.
    pub fn queued_id(&self) -> Option<&str> {
        match self {
            RequestOutcome::Queued { id } => Some(id),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            RequestOutcome::Success(response) => Some(response),
            _ => None,
        }
    }
}

/// Aggregate queue statistics for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub total: usize,
    pub pending: usize,
    pub retrying: usize,
    pub failed: usize,
    pub succeeded: usize,
    pub is_online: bool,
    pub is_processing: bool,
}

impl QueueStats {
    fn new(counts: QueueCounts, is_online: bool, is_processing: bool) -> Self {
        QueueStats {
            total: counts.total,
            pending: counts.pending,
            retrying: counts.retrying,
            failed: counts.failed,
            succeeded: counts.succeeded,
            is_online,
            is_processing,
        }
    }
}

/// Offline-resilient request client.
///
/// Dropping the client shuts its scheduler down.
pub struct QueueClient<T: Transport + 'static = HttpTransport> {
    queue: Arc<SharedQueue>,
    scheduler: Arc<Scheduler<T>>,
    transport: Arc<T>,
    network: Arc<NetworkMonitor>,
    request_timeout: Duration,
    direct_retries: u32,
    retry_delay: Duration,
    max_backoff: Duration,
}

impl QueueClient<HttpTransport> {
    /// Open the file-backed queue at `config.store_path` with an HTTP transport.
    pub fn open_http(config: &QueueConfig) -> Result<Self> {
        let transport = match &config.base_url {
            Some(base) => HttpTransport::with_base_url(base)?,
            None => HttpTransport::new(),
        };
        Self::open(config, transport)
    }
}

impl<T: Transport + 'static> QueueClient<T> {
    /// Open the file-backed queue at `config.store_path`.
    ///
    /// The network monitor starts online.
    pub fn open(config: &QueueConfig, transport: T) -> Result<Self> {
        let store = JsonlStore::open(&config.store_path)?;
        Ok(Self::with_parts(
            config,
            Box::new(store),
            Arc::new(SystemClock),
            Arc::new(NetworkMonitor::default()),
            transport,
        ))
    }

    /// Assemble a client from injected parts.
    pub fn with_parts(
        config: &QueueConfig,
        store: Box<dyn PersistentStore>,
        clock: Arc<dyn ClockSource>,
        network: Arc<NetworkMonitor>,
        transport: T,
    ) -> Self {
        let queue = Arc::new(SharedQueue::new(QueueStore::open(store, clock, config.policy())));
        let transport = Arc::new(transport);
        let scheduler = Arc::new(Scheduler::new(
            Arc::clone(&queue),
            Arc::clone(&transport),
            Arc::clone(&network),
            config.request_timeout(),
        ));

        QueueClient {
            queue,
            scheduler,
            transport,
            network,
            request_timeout: config.request_timeout(),
            direct_retries: config.direct_retries,
            retry_delay: config.retry_delay(),
            max_backoff: config.max_backoff(),
        }
    }

    /// Send `request` now if possible, otherwise queue it.
    ///
    /// Offline: queued without touching the transport. Online: up to
    /// `1 + retries` direct attempts; a final transient failure queues the
    /// request, a permanent one is returned as an error.
    pub async fn request(
        &self,
        request: RequestDescription,
        options: RequestOptions,
    ) -> RequestOutcome {
        if let Err(e) = request.validate() {
            return RequestOutcome::Error(e.into());
        }

        let timeout = options.timeout.unwrap_or(self.request_timeout);
        let attempts = options.retries.unwrap_or(self.direct_retries).saturating_add(1);
        let mut delay = self.retry_delay;

        for attempt in 1..=attempts {
            if !self.network.is_online() {
                tracing::debug!("offline, queueing {} {}", request.method, request.url);
                break;
            }

            let send = self.transport.send(&request, timeout);
            let result = match tokio::time::timeout(timeout, send).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(timeout)),
            };

            match result {
                Ok(response) => return RequestOutcome::Success(response),
                Err(e) if !e.is_retryable() => {
                    tracing::debug!("{} {} rejected: {}", request.method, request.url, e);
                    return RequestOutcome::Error(e.into());
                }
                Err(e) => {
                    tracing::debug!(attempt, "{} {} failed: {}", request.method, request.url, e);
                    if attempt < attempts {
                        tokio::time::sleep(delay).await;
                        delay = std::cmp::min(delay.saturating_mul(2), self.max_backoff);
                    }
                }
            }
        }

        match self.enqueue(request, options.offline) {
            Ok(id) => RequestOutcome::Queued { id },
            Err(e) => RequestOutcome::Error(e),
        }
    }

    /// Queue `request` for background delivery. Returns the new id.
    pub fn enqueue(&self, request: RequestDescription, options: EnqueueOptions) -> Result<String> {
        let id = self.queue.write(|q| q.enqueue(request, options))?;
        self.scheduler.emit(QueueEvent::Enqueued { id: id.clone() });
        self.scheduler.wake();
        Ok(id)
    }

    /// Remove a record. An in-flight attempt's result is discarded.
    pub fn cancel(&self, id: &str) -> Result<bool> {
        Ok(self.queue.write(|q| q.remove(id))?)
    }

    pub fn cancel_group(&self, group_id: &str) -> Result<usize> {
        Ok(self.queue.write(|q| q.remove_group(group_id))?)
    }

    /// Move a failed record back to pending with a fresh retry budget.
    pub fn retry(&self, id: &str) -> Result<()> {
        self.queue.write(|q| q.retry(id))?;
        self.scheduler.wake();
        Ok(())
    }

    pub fn retry_all_failed(&self) -> Result<usize> {
        let count = self.queue.write(|q| q.retry_all_failed())?;
        if count > 0 {
            self.scheduler.wake();
        }
        Ok(count)
    }

    pub fn clear_failed(&self) -> Result<usize> {
        Ok(self.queue.write(|q| q.clear_failed())?)
    }

    pub fn clear_succeeded(&self) -> Result<usize> {
        Ok(self.queue.write(|q| q.clear_succeeded())?)
    }

    pub fn clear_all(&self) -> Result<usize> {
        Ok(self.queue.write(|q| q.clear_all())?)
    }

    pub fn get(&self, id: &str) -> Option<RequestRecord> {
        self.queue.read(|q| q.get(id).cloned())
    }

    /// All records in priority order.
    pub fn list(&self) -> Vec<RequestRecord> {
        self.queue.read(|q| q.list().into_iter().cloned().collect())
    }

    pub fn list_by_tag(&self, tag: &str) -> Vec<RequestRecord> {
        self.queue.read(|q| q.list_by_tag(tag).into_iter().cloned().collect())
    }

    pub fn list_by_group(&self, group_id: &str) -> Vec<RequestRecord> {
        self.queue.read(|q| q.list_by_group(group_id).into_iter().cloned().collect())
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats::new(
            self.queue.counts(),
            self.network.is_online(),
            self.scheduler.is_processing(),
        )
    }

    /// Receiver updated whenever the queue counts change.
    pub fn watch_counts(&self) -> watch::Receiver<QueueCounts> {
        self.queue.watch_counts()
    }

    /// Receiver updated whenever counts, connectivity or processing change.
    ///
    /// Must be called from within a tokio runtime. The forwarding task ends
    /// when the receiver is dropped or the client shuts down.
    pub fn watch_stats(&self) -> watch::Receiver<QueueStats> {
        let (tx, rx) = watch::channel(self.stats());
        let mut counts = self.queue.watch_counts();
        let mut online = self.network.subscribe();
        let mut processing = self.scheduler.watch_processing();
        let shutdown = self.scheduler.shutdown_token();

        tokio::spawn(async move {
            loop {
                let changed = tokio::select! {
                    biased;
                    _ = tx.closed() => break,
                    changed = counts.changed() => changed,
                    changed = online.changed() => changed,
                    changed = processing.changed() => changed,
                    _ = shutdown.cancelled() => break,
                };
                if changed.is_err() {
                    break;
                }
                let stats = QueueStats::new(
                    *counts.borrow_and_update(),
                    *online.borrow_and_update(),
                    *processing.borrow_and_update(),
                );
                tx.send_if_modified(|current| {
                    let modified = *current != stats;
                    *current = stats;
                    modified
                });
            }
            tracing::debug!("stats watcher stopped");
        });
        rx
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.scheduler.subscribe()
    }

    pub fn network(&self) -> &Arc<NetworkMonitor> {
        &self.network
    }

    /// Follow the network monitor and start draining if online.
    pub fn start(&self) {
        self.scheduler.watch_network();
        if self.network.is_online() {
            self.scheduler.start_processing();
        }
    }

    pub fn start_processing(&self) {
        self.scheduler.start_processing();
    }

    pub fn stop_processing(&self) {
        self.scheduler.stop_processing();
    }

    pub fn is_processing(&self) -> bool {
        self.scheduler.is_processing()
    }

    /// Wait until no pending or retrying records remain.
    ///
    /// Returns false if `timeout` elapsed first.
    pub async fn wait_until_drained(&self, timeout: Duration) -> bool {
        let mut counts = self.queue.watch_counts();
        let drained = counts.wait_for(|c| c.active() == 0);
        let done = matches!(tokio::time::timeout(timeout, drained).await, Ok(Ok(_)));
        done
    }

    /// Stop processing and end background tasks.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }
}

impl<T: Transport + 'static> Drop for QueueClient<T> {
    fn drop(&mut self) {
        self.scheduler.shutdown();
    }
}

impl<T: Transport + 'static> std::fmt::Debug for QueueClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueClient")
            .field("stats", &self.stats())
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
