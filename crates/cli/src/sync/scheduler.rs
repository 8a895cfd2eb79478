// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background drain loop.
//!
//! The [`Scheduler`] owns at most one drain task on the tokio runtime. The
//! task repeatedly takes the highest-priority ready record, sends it through
//! the transport and records the outcome in the shared queue. When nothing
//! is ready it parks on a [`Notify`] until an enqueue, a network change, a
//! stop request or the nearest backoff deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rq_core::{NextAttempt, RequestRecord, Status};
use tokio::sync::{broadcast, watch, Notify};
use tokio_util::sync::CancellationToken;

use super::network::NetworkMonitor;
use super::shared::SharedQueue;
use super::transport::{Transport, TransportError};

/// Capacity of the event broadcast channel. Slow subscribers lag.
const EVENT_CAPACITY: usize = 256;

/// Notification emitted as the queue is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// Processing was switched on.
    Started,
    /// Processing was switched off.
    Stopped,
    /// A record was added to the queue.
    Enqueued { id: String },
    AttemptStarted { id: String },
    /// The transport returned a success response.
    Succeeded { id: String, status: u16 },
    /// The attempt failed and the record will be tried again.
    Retrying { id: String, retry_count: u32, error: String },
    /// The record reached `failed`.
    Failed { id: String, error: String },
    /// The record was removed while in flight; its result was dropped.
    Discarded { id: String },
}

/// Drives queued records to a terminal status, one attempt at a time.
pub struct Scheduler<T: Transport> {
    queue: Arc<SharedQueue>,
    transport: Arc<T>,
    network: Arc<NetworkMonitor>,
    request_timeout: Duration,
    /// Whether the caller wants the queue drained.
    processing: watch::Sender<bool>,
    /// Whether a drain task is alive.
    running: AtomicBool,
    /// Whether a network watcher task is alive.
    watching: AtomicBool,
    wake: Notify,
    events: broadcast::Sender<QueueEvent>,
    cancel: CancellationToken,
}

impl<T: Transport + 'static> Scheduler<T> {
    pub fn new(
        queue: Arc<SharedQueue>,
        transport: Arc<T>,
        network: Arc<NetworkMonitor>,
        request_timeout: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Scheduler {
            queue,
            transport,
            network,
            request_timeout,
            processing: watch::Sender::new(false),
            running: AtomicBool::new(false),
            watching: AtomicBool::new(false),
            wake: Notify::new(),
            events,
            cancel: CancellationToken::new(),
        }
    }

    /// Switch processing on and make sure a drain task is running.
    ///
    /// Calling this while already processing does not start a second task.
    /// Must be called from within a tokio runtime.
    pub fn start_processing(self: &Arc<Self>) {
        if self.cancel.is_cancelled() {
            tracing::debug!("scheduler shut down, ignoring start");
            return;
        }
        if !self.processing.send_replace(true) {
            tracing::info!("queue processing started");
            self.emit(QueueEvent::Started);
        }
        self.spawn_drain();
    }

    /// Switch processing off.
    ///
    /// An attempt already in flight runs to completion and its outcome is
    /// recorded; no further record is taken.
    pub fn stop_processing(&self) {
        if self.processing.send_replace(false) {
            tracing::info!("queue processing stopped");
            self.emit(QueueEvent::Stopped);
        }
        self.wake.notify_one();
    }

    pub fn is_processing(&self) -> bool {
        *self.processing.borrow()
    }

    /// Receiver that observes processing being switched on and off.
    pub fn watch_processing(&self) -> watch::Receiver<bool> {
        self.processing.subscribe()
    }

    /// Token cancelled by [`Scheduler::shutdown`].
    pub(crate) fn shutdown_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether a drain task is currently alive.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Follow the network monitor: online starts processing, offline stops it.
    ///
    /// Idempotent. The watcher ends on [`Scheduler::shutdown`].
    pub fn watch_network(self: &Arc<Self>) {
        if self.watching.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut online = self.network.subscribe();
        let weak = Arc::downgrade(self);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = online.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                let is_online = *online.borrow_and_update();
                let Some(scheduler) = weak.upgrade() else {
                    break;
                };
                if is_online {
                    scheduler.start_processing();
                } else {
                    scheduler.stop_processing();
                }
            }
            tracing::debug!("network watcher stopped");
        });
    }

    /// Stop processing for good and end the network watcher.
    pub fn shutdown(&self) {
        self.stop_processing();
        self.cancel.cancel();
        self.wake.notify_one();
    }

    /// Nudge an idle drain task to look for ready work.
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    pub fn emit(&self, event: QueueEvent) {
        // No receivers is not an error.
        let _ = self.events.send(event);
    }

    fn should_run(&self) -> bool {
        self.is_processing() && self.network.is_online() && !self.cancel.is_cancelled()
    }

    fn spawn_drain(self: &Arc<Self>) {
        if !self.claim_drain() {
            self.wake.notify_one();
            return;
        }

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                scheduler.drain().await;
                scheduler.running.store(false, Ordering::SeqCst);
                // A start racing with this exit saw `running` still set and
                // only notified; re-claim so its work is not stranded.
                if !scheduler.should_run() || !scheduler.claim_drain() {
                    break;
                }
            }
            tracing::debug!("drain task exited");
        });
    }

    fn claim_drain(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    async fn drain(&self) {
        let mut online = self.network.subscribe();
        let mut attempts = 0usize;

        while self.should_run() {
            match self.queue.read(|q| q.next_attempt()) {
                NextAttempt::Ready(record) => {
                    self.attempt(record).await;
                    attempts += 1;
                }
                NextAttempt::Wait { wait_ms } => {
                    self.idle(Some(Duration::from_millis(wait_ms)), &mut online).await;
                }
                NextAttempt::Idle => self.idle(None, &mut online).await,
            }
        }

        if attempts > 0 {
            tracing::info!(attempts, "drain pass finished");
        }
    }

    /// Park until there may be new work.
    async fn idle(&self, backoff: Option<Duration>, online: &mut watch::Receiver<bool>) {
        let backoff = async {
            match backoff {
                Some(wait) => tokio::time::sleep(wait).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = self.wake.notified() => {}
            _ = backoff => {}
            _ = online.changed() => {}
            _ = self.cancel.cancelled() => {}
        }
    }

    async fn attempt(&self, record: RequestRecord) {
        let id = record.id;
        match self.queue.write(|q| q.mark_attempt_started(&id)) {
            Ok(()) => {}
            Err(e) if is_gone(&e) => {
                tracing::debug!("request {} no longer eligible: {}", id, e);
                return;
            }
            Err(e) => tracing::warn!("failed to persist attempt start for {}: {}", id, e),
        }
        self.emit(QueueEvent::AttemptStarted { id: id.clone() });
        tracing::debug!(
            attempt = record.retry_count + 1,
            "sending {} {} ({})",
            record.request.method,
            record.request.url,
            id
        );

        let send = self.transport.send(&record.request, self.request_timeout);
        let result = match tokio::time::timeout(self.request_timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.request_timeout)),
        };

        match result {
            Ok(response) => self.record_success(&id, response.status),
            Err(error) => self.record_failure(&id, &error),
        }
    }

    fn record_success(&self, id: &str, status: u16) {
        match self.queue.write(|q| q.mark_succeeded(id)) {
            Ok(()) => {}
            Err(e) if is_gone(&e) => {
                self.discard(id);
                return;
            }
            Err(e) => tracing::warn!("failed to persist success of {}: {}", id, e),
        }
        tracing::debug!("request {} succeeded ({})", id, status);
        self.emit(QueueEvent::Succeeded { id: id.to_string(), status });
    }

    fn record_failure(&self, id: &str, error: &TransportError) {
        let message = error.to_string();
        let retryable = error.is_retryable();

        let (result, current) = self.queue.write(|q| {
            let result = q.mark_failed(id, &message, retryable);
            let current = q.get(id).map(|r| (r.status, r.retry_count));
            (result, current)
        });

        if let Err(e) = &result {
            if is_gone(e) {
                self.discard(id);
                return;
            }
            tracing::warn!("failed to persist failure of {}: {}", id, e);
        }

        match current {
            Some((Status::Retrying, retry_count)) => {
                tracing::warn!("request {} failed, retry {}: {}", id, retry_count, message);
                self.emit(QueueEvent::Retrying {
                    id: id.to_string(),
                    retry_count,
                    error: message,
                });
            }
            Some((Status::Failed, _)) => {
                tracing::warn!("request {} failed permanently: {}", id, message);
                self.emit(QueueEvent::Failed { id: id.to_string(), error: message });
            }
            _ => {}
        }
    }

    fn discard(&self, id: &str) {
        tracing::debug!("request {} removed while in flight, discarding result", id);
        self.emit(QueueEvent::Discarded { id: id.to_string() });
    }
}

impl<T: Transport + 'static> std::fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("processing", &self.is_processing())
            .field("running", &self.running.load(Ordering::SeqCst))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// The record was removed or finished by someone else mid-attempt.
fn is_gone(error: &rq_core::Error) -> bool {
    matches!(
        error,
        rq_core::Error::RecordNotFound(_) | rq_core::Error::InvalidTransition { .. }
    )
}
