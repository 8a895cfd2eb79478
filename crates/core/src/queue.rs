// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Priority-ordered, persisted collection of request records.
//!
//! Records are held in a map for O(1) lookup. Active records (pending or
//! retrying) are also indexed by `(priority desc, created_at, seq)` so the
//! next ready record is found without scanning terminal ones. Every mutation
//! is written through to the [`PersistentStore`] before it returns.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::clock::ClockSource;
use crate::error::{Error, Result};
use crate::id::generate_unique_id;
use crate::record::{EnqueueOptions, QueuePolicy, RequestDescription, RequestRecord, Status};
use crate::store::PersistentStore;

/// Index key: higher priority first, then oldest, then enqueue order.
type OrderKey = (Reverse<i32>, u64, u64, String);

fn order_key(record: &RequestRecord) -> OrderKey {
    (Reverse(record.priority), record.created_at_ms, record.seq, record.id.clone())
}

/// Next step for a worker draining the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAttempt {
    /// This record may be attempted now.
    Ready(RequestRecord),
    /// Nothing is ready; the earliest backoff ends in `wait_ms`.
    Wait { wait_ms: u64 },
    /// No record is waiting.
    Idle,
}

/// Per-status record counts, maintained incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueCounts {
    pub total: usize,
    pub pending: usize,
    pub retrying: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl QueueCounts {
    fn slot(&mut self, status: Status) -> &mut usize {
        match status {
            Status::Pending => &mut self.pending,
            Status::Retrying => &mut self.retrying,
            Status::Succeeded => &mut self.succeeded,
            Status::Failed => &mut self.failed,
        }
    }

    fn add(&mut self, status: Status) {
        self.total += 1;
        *self.slot(status) += 1;
    }

    fn remove(&mut self, status: Status) {
        self.total = self.total.saturating_sub(1);
        let slot = self.slot(status);
        *slot = slot.saturating_sub(1);
    }

    fn shift(&mut self, from: Status, to: Status) {
        let from_slot = self.slot(from);
        *from_slot = from_slot.saturating_sub(1);
        *self.slot(to) += 1;
    }

    /// Records still waiting for an attempt.
    pub fn active(&self) -> usize {
        self.pending + self.retrying
    }
}

/// The authoritative in-memory queue, backed by a persistent store.
pub struct QueueStore {
    records: HashMap<String, RequestRecord>,
    active: BTreeSet<OrderKey>,
    in_flight: HashSet<String>,
    counts: QueueCounts,
    next_seq: u64,
    policy: QueuePolicy,
    store: Box<dyn PersistentStore>,
    clock: Arc<dyn ClockSource>,
}

impl QueueStore {
    /// Load the persisted image and build the in-memory index.
    ///
    /// An unreadable image is quarantined and the queue starts empty.
    pub fn open(
        store: Box<dyn PersistentStore>,
        clock: Arc<dyn ClockSource>,
        policy: QueuePolicy,
    ) -> Self {
        let loaded = match store.load() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("queue image unreadable, starting empty: {}", e);
                if let Err(e) = store.quarantine() {
                    tracing::warn!("failed to quarantine queue image: {}", e);
                }
                Vec::new()
            }
        };

        let mut queue = QueueStore {
            records: HashMap::with_capacity(loaded.len()),
            active: BTreeSet::new(),
            in_flight: HashSet::new(),
            counts: QueueCounts::default(),
            next_seq: 0,
            policy,
            store,
            clock,
        };

        for record in loaded {
            if queue.records.contains_key(&record.id) {
                tracing::warn!("dropping duplicate request {} from queue image", record.id);
                continue;
            }
            queue.next_seq = queue.next_seq.max(record.seq.saturating_add(1));
            queue.insert(record);
        }

        tracing::debug!(
            "queue opened: {} records ({} active)",
            queue.counts.total,
            queue.counts.active()
        );
        queue
    }

    pub fn policy(&self) -> &QueuePolicy {
        &self.policy
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Create a pending record and persist it. Returns the new id.
    pub fn enqueue(
        &mut self,
        request: RequestDescription,
        options: EnqueueOptions,
    ) -> Result<String> {
        request.validate()?;

        let now = self.clock.now_ms();
        let seq = self.next_seq;
        let id = generate_unique_id(&request, now, seq, |candidate| {
            self.records.contains_key(candidate)
        });

        let record = RequestRecord {
            id: id.clone(),
            request,
            priority: options.priority,
            tags: options.tags,
            group_id: options.group_id,
            status: Status::Pending,
            retry_count: 0,
            max_retries: options.max_retries.unwrap_or(self.policy.max_retries),
            retry_delay_ms: options
                .retry_delay
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
                .unwrap_or(self.policy.retry_delay_ms),
            created_at_ms: now,
            seq,
            next_attempt_at_ms: None,
            last_attempt_at_ms: None,
            error_message: None,
        };

        self.next_seq += 1;
        self.insert(record);

        if let Err(e) = self.persist() {
            self.detach(&id);
            return Err(e);
        }

        tracing::debug!("enqueued {}", id);
        Ok(id)
    }

    /// Highest-priority record that may be attempted now.
    pub fn peek_next_ready(&self) -> Option<RequestRecord> {
        self.ready_at(self.clock.now_ms()).cloned()
    }

    /// Earliest backoff deadline among records not in flight, due or not.
    pub fn next_wake_at(&self) -> Option<u64> {
        self.waiting()
            .filter_map(|record| record.next_attempt_at_ms)
            .min()
    }

    /// Decide what a worker should do next from a single clock reading.
    pub fn next_attempt(&self) -> NextAttempt {
        let now = self.clock.now_ms();
        if let Some(record) = self.ready_at(now) {
            return NextAttempt::Ready(record.clone());
        }
        match self.next_wake_at() {
            Some(at) => NextAttempt::Wait {
                wait_ms: at.saturating_sub(now),
            },
            None => NextAttempt::Idle,
        }
    }

    fn ready_at(&self, now_ms: u64) -> Option<&RequestRecord> {
        self.waiting().find(|record| record.is_ready(now_ms))
    }

    /// Active records not currently in flight, in priority order.
    fn waiting(&self) -> impl Iterator<Item = &RequestRecord> + '_ {
        self.active
            .iter()
            .filter(|(_, _, _, id)| !self.in_flight.contains(id))
            .filter_map(|(_, _, _, id)| self.records.get(id))
    }

    pub fn mark_attempt_started(&mut self, id: &str) -> Result<()> {
        let now = self.clock.now_ms();
        let record = self.active_record_mut(id, "start an attempt for")?;
        record.last_attempt_at_ms = Some(now);
        self.in_flight.insert(id.to_string());
        self.persist()
    }

    pub fn mark_succeeded(&mut self, id: &str) -> Result<()> {
        let record = self.active_record_mut(id, "mark succeeded")?;
        record.next_attempt_at_ms = None;
        self.in_flight.remove(id);
        self.transition(id, Status::Succeeded);
        self.apply_retention();
        self.persist()
    }

    /// Record a failed attempt and decide between `retrying` and `failed`.
    ///
    /// Retryable failures consume one retry while budget remains; anything
    /// else ends in `failed`. Returns the resulting status.
    pub fn mark_failed(&mut self, id: &str, message: &str, retryable: bool) -> Result<Status> {
        let now = self.clock.now_ms();
        let max_backoff_ms = self.policy.max_backoff_ms;

        let record = self.active_record_mut(id, "mark failed")?;
        record.error_message = Some(message.to_string());
        let next = if retryable && record.retry_count < record.max_retries {
            let delay = record.backoff_delay_ms(max_backoff_ms);
            record.retry_count += 1;
            record.next_attempt_at_ms = Some(now.saturating_add(delay));
            Status::Retrying
        } else {
            record.next_attempt_at_ms = None;
            Status::Failed
        };

        self.in_flight.remove(id);
        self.transition(id, next);
        self.persist()?;
        Ok(next)
    }

    /// Manually retry a failed record with a fresh retry budget.
    pub fn retry(&mut self, id: &str) -> Result<()> {
        let record = self.records.get(id).ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
        if record.status != Status::Failed {
            return Err(Error::InvalidTransition {
                id: id.to_string(),
                from: record.status.to_string(),
                action: "retry",
                hint: "only failed requests can be retried",
            });
        }
        self.reset(id);
        self.persist()
    }

    /// Retry every failed record. Returns how many were reset.
    pub fn retry_all_failed(&mut self) -> Result<usize> {
        let ids = self.ids_where(|r| r.status == Status::Failed);
        for id in &ids {
            self.reset(id);
        }
        if !ids.is_empty() {
            self.persist()?;
        }
        Ok(ids.len())
    }

    /// Delete a record regardless of status. Returns whether it existed.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        if self.detach(id).is_none() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Delete every record in `group_id`.
    pub fn remove_group(&mut self, group_id: &str) -> Result<usize> {
        self.remove_where(|r| r.in_group(group_id))
    }

    pub fn clear_failed(&mut self) -> Result<usize> {
        self.remove_where(|r| r.status == Status::Failed)
    }

    pub fn clear_succeeded(&mut self) -> Result<usize> {
        self.remove_where(|r| r.status == Status::Succeeded)
    }

    pub fn clear_all(&mut self) -> Result<usize> {
        let removed = self.records.len();
        self.records.clear();
        self.active.clear();
        self.in_flight.clear();
        self.counts = QueueCounts::default();
        self.persist()?;
        Ok(removed)
    }

    pub fn counts(&self) -> QueueCounts {
        self.counts
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn is_in_flight(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    pub fn get(&self, id: &str) -> Option<&RequestRecord> {
        self.records.get(id)
    }

    /// All records in priority order.
    pub fn list(&self) -> Vec<&RequestRecord> {
        self.sorted(|_| true)
    }

    pub fn list_by_tag(&self, tag: &str) -> Vec<&RequestRecord> {
        self.sorted(|r| r.has_tag(tag))
    }

    pub fn list_by_group(&self, group_id: &str) -> Vec<&RequestRecord> {
        self.sorted(|r| r.in_group(group_id))
    }

    pub fn list_by_status(&self, status: Status) -> Vec<&RequestRecord> {
        self.sorted(|r| r.status == status)
    }

    fn sorted<F>(&self, keep: F) -> Vec<&RequestRecord>
    where
        F: Fn(&RequestRecord) -> bool,
    {
        let mut records: Vec<&RequestRecord> = self.records.values().filter(|&r| keep(r)).collect();
        records.sort_by_key(|r| (Reverse(r.priority), r.created_at_ms, r.seq));
        records
    }

    fn ids_where<F>(&self, keep: F) -> Vec<String>
    where
        F: Fn(&RequestRecord) -> bool,
    {
        self.records.values().filter(|&r| keep(r)).map(|r| r.id.clone()).collect()
    }

    /// Look up a record that is still eligible for scheduler transitions.
    fn active_record_mut(&mut self, id: &str, action: &'static str) -> Result<&mut RequestRecord> {
        let record =
            self.records.get_mut(id).ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
        if record.status.is_terminal() {
            return Err(Error::InvalidTransition {
                id: id.to_string(),
                from: record.status.to_string(),
                action,
                hint: "finished requests change only through retry or removal",
            });
        }
        Ok(record)
    }

    fn reset(&mut self, id: &str) {
        if let Some(record) = self.records.get_mut(id) {
            record.retry_count = 0;
            record.error_message = None;
            record.next_attempt_at_ms = None;
        }
        self.transition(id, Status::Pending);
    }

    /// Change status, keeping counts and the active index in step.
    fn transition(&mut self, id: &str, to: Status) {
        let Some(record) = self.records.get_mut(id) else {
            return;
        };
        let from = record.status;
        if from == to {
            return;
        }
        record.status = to;
        let key = order_key(record);

        self.counts.shift(from, to);
        match (from.is_active(), to.is_active()) {
            (true, false) => {
                self.active.remove(&key);
            }
            (false, true) => {
                self.active.insert(key);
            }
            _ => {}
        }
    }

    fn insert(&mut self, record: RequestRecord) {
        if record.status.is_active() {
            self.active.insert(order_key(&record));
        }
        self.counts.add(record.status);
        self.records.insert(record.id.clone(), record);
    }

    fn detach(&mut self, id: &str) -> Option<RequestRecord> {
        let record = self.records.remove(id)?;
        self.active.remove(&order_key(&record));
        self.in_flight.remove(id);
        self.counts.remove(record.status);
        Some(record)
    }

    fn remove_where<F>(&mut self, matches: F) -> Result<usize>
    where
        F: Fn(&RequestRecord) -> bool,
    {
        let ids = self.ids_where(matches);
        for id in &ids {
            self.detach(id);
        }
        if !ids.is_empty() {
            self.persist()?;
        }
        Ok(ids.len())
    }

    /// Prune the oldest succeeded records beyond the configured limit.
    fn apply_retention(&mut self) {
        let Some(limit) = self.policy.max_succeeded else {
            return;
        };
        if self.counts.succeeded <= limit {
            return;
        }

        let mut succeeded: Vec<(u64, u64, String)> = self
            .records
            .values()
            .filter(|r| r.status == Status::Succeeded)
            .map(|r| (r.created_at_ms, r.seq, r.id.clone()))
            .collect();
        succeeded.sort();

        let excess = succeeded.len().saturating_sub(limit);
        for (_, _, id) in succeeded.into_iter().take(excess) {
            self.detach(&id);
        }
    }

    fn persist(&self) -> Result<()> {
        let records = self.list();
        self.store.save(&records).inspect_err(|e| {
            tracing::warn!("failed to persist queue: {}", e);
        })
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
