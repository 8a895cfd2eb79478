// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rq_core::{
    ClockSource, EnqueueOptions, ManualClock, MemoryStore, Method, QueueStore, RequestDescription,
};
use tokio::sync::Semaphore;

use super::client::QueueClient;
use super::network::NetworkMonitor;
use super::scheduler::Scheduler;
use super::shared::SharedQueue;
use super::transport::{Response, SendFuture, Transport, TransportError, TransportResult};
use crate::config::QueueConfig;

/// Mock transport with scripted results and a call log.
///
/// Clones share state, so a test can keep a handle after moving one into a
/// client.
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Results returned in order; once empty, every send succeeds with 200.
    script: Arc<Mutex<VecDeque<TransportResult<Response>>>>,
    /// Result returned once the script runs out.
    fallback: Arc<Mutex<Option<TransportResult<Response>>>>,
    /// Urls of every request sent, in order.
    calls: Arc<Mutex<Vec<String>>>,
    /// When set, each send waits for a permit before answering.
    gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for the next unanswered send.
    pub fn push(&self, result: TransportResult<Response>) -> &Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    /// Result for every send after the script is exhausted.
    pub fn always(&self, result: TransportResult<Response>) -> &Self {
        *self.fallback.lock().unwrap() = Some(result);
        self
    }

    /// Hold every send until [`MockTransport::release`] hands out a permit.
    pub fn block(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `n` blocked sends complete.
    pub fn release(&self, n: usize) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn send<'a>(&'a self, request: &'a RequestDescription, _timeout: Duration) -> SendFuture<'a> {
        self.calls.lock().unwrap().push(request.url.clone());
        let gate = self.gate.lock().unwrap().clone();
        let result = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.fallback.lock().unwrap().clone())
            .unwrap_or_else(|| Ok(Response::new(200, "ok")));

        Box::pin(async move {
            if let Some(gate) = gate {
                gate.acquire().await.unwrap().forget();
            }
            result
        })
    }
}

pub fn transient() -> TransportResult<Response> {
    Err(TransportError::Network("connection refused".to_string()))
}

pub fn server_error() -> TransportResult<Response> {
    Err(TransportError::Status { code: 503, body: "unavailable".to_string() })
}

pub fn rejected() -> TransportResult<Response> {
    Err(TransportError::Status { code: 400, body: "bad request".to_string() })
}

pub fn ok() -> TransportResult<Response> {
    Ok(Response::new(200, "ok"))
}

pub fn get(url: &str) -> RequestDescription {
    RequestDescription::new(Method::Get, url)
}

pub fn post(url: &str, body: &str) -> RequestDescription {
    RequestDescription::new(Method::Post, url).with_body(body)
}

/// Config with no backoff delay so retries happen immediately.
pub fn fast_config() -> QueueConfig {
    QueueConfig {
        retry_delay_ms: 0,
        max_backoff_ms: 0,
        request_timeout_ms: 1_000,
        ..QueueConfig::default()
    }
}

/// Clock that moves forward one millisecond on every read, so consecutive
/// reads inside one drain step never agree.
#[derive(Debug)]
pub struct TickingClock(AtomicU64);

impl TickingClock {
    pub fn new(start_ms: u64) -> Self {
        TickingClock(AtomicU64::new(start_ms))
    }
}

impl ClockSource for TickingClock {
    fn now_ms(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(1_700_000_000_000))
}

/// Client over a memory store with the given network state.
pub fn make_client(
    transport: &MockTransport,
    online: bool,
) -> (QueueClient<MockTransport>, MemoryStore) {
    make_client_with(transport, online, fast_config())
}

pub fn make_client_with(
    transport: &MockTransport,
    online: bool,
    config: QueueConfig,
) -> (QueueClient<MockTransport>, MemoryStore) {
    let store = MemoryStore::new();
    let client = QueueClient::with_parts(
        &config,
        Box::new(store.clone()),
        clock(),
        Arc::new(NetworkMonitor::new(online)),
        transport.clone(),
    );
    (client, store)
}

/// Scheduler plus its shared queue, for tests that drive it directly.
pub fn make_scheduler(
    transport: &MockTransport,
    online: bool,
) -> (Arc<Scheduler<MockTransport>>, Arc<SharedQueue>, Arc<NetworkMonitor>) {
    make_scheduler_with(transport, online, fast_config(), clock())
}

/// Scheduler with an explicit config and clock, for backoff timing tests.
pub fn make_scheduler_with(
    transport: &MockTransport,
    online: bool,
    config: QueueConfig,
    clock: Arc<dyn ClockSource>,
) -> (Arc<Scheduler<MockTransport>>, Arc<SharedQueue>, Arc<NetworkMonitor>) {
    let queue = Arc::new(SharedQueue::new(QueueStore::open(
        Box::new(MemoryStore::new()),
        clock,
        config.policy(),
    )));
    let network = Arc::new(NetworkMonitor::new(online));
    let scheduler = Arc::new(Scheduler::new(
        Arc::clone(&queue),
        Arc::new(transport.clone()),
        Arc::clone(&network),
        config.request_timeout(),
    ));
    (scheduler, queue, network)
}

pub fn enqueue(queue: &SharedQueue, url: &str, options: EnqueueOptions) -> String {
    queue.write(|q| q.enqueue(get(url), options)).unwrap()
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn wait_for<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 2s"
        );
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

/// Wait until the queue has no pending or retrying records.
pub async fn wait_drained(queue: &SharedQueue) {
    let mut counts = queue.watch_counts();
    tokio::time::timeout(Duration::from_secs(2), counts.wait_for(|c| c.active() == 0))
        .await
        .expect("queue should drain")
        .unwrap();
}
