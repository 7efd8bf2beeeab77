//! Submission queue: shared registry of in-flight and terminal records.
//!
//! The map itself is safe under concurrent insertion and lookup; each
//! record, once created, is mutated only by the single attempt loop that
//! owns it. Accessors hold the map entry only for the duration of a closure
//! and never across an await point.

use crate::domain::entities::{Timestamp, TransactionRecord, TransactionStatus};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Submission counters.
#[derive(Debug, Default)]
pub struct RelayStats {
    /// Submissions accepted into the queue.
    pub total_submitted: AtomicU64,
    /// Ledger append attempts across all submissions.
    pub total_attempts: AtomicU64,
    /// Submissions confirmed by the ledger.
    pub total_accepted: AtomicU64,
    /// Submissions that exhausted the retry budget on conflicts.
    pub total_conflict_failures: AtomicU64,
    /// Submissions that failed at the transport layer.
    pub total_unreachable: AtomicU64,
    /// Submissions rejected outside the success/conflict contract.
    pub total_upstream_errors: AtomicU64,
}

/// Shared registry of transaction records keyed by id.
#[derive(Clone, Default)]
pub struct SubmissionQueue {
    records: Arc<DashMap<Uuid, TransactionRecord>>,
    stats: Arc<RelayStats>,
}

impl SubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly created record.
    pub fn insert(&self, record: TransactionRecord) {
        self.stats.total_submitted.fetch_add(1, Ordering::Relaxed);
        self.records.insert(record.id, record);
    }

    /// Snapshot of a record.
    pub fn get(&self, id: &Uuid) -> Option<TransactionRecord> {
        self.records.get(id).map(|r| r.clone())
    }

    /// Applies `f` to a record under the map guard, returning its result.
    ///
    /// The guard is released when this returns; callers must not await
    /// while composing the closure's inputs.
    pub fn update<T>(&self, id: &Uuid, f: impl FnOnce(&mut TransactionRecord) -> T) -> Option<T> {
        self.records.get_mut(id).map(|mut r| f(r.value_mut()))
    }

    /// Number of registered records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no record is registered.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records still owned by an attempt loop.
    pub fn pending_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.status, TransactionStatus::Pending))
            .count()
    }

    /// Removes terminal records whose completion is older than `ttl_ms`.
    ///
    /// Pending records are never evicted. Returns the number removed.
    pub fn prune_terminal(&self, now: Timestamp, ttl_ms: u64) -> usize {
        let mut removed = 0;
        self.records.retain(|_, record| {
            let expired = match (record.status.is_terminal(), record.completed_at) {
                (true, Some(done)) => now.saturating_sub(done) >= ttl_ms,
                _ => false,
            };
            if expired {
                removed += 1;
            }
            !expired
        });
        removed
    }

    /// Shared counters.
    pub fn stats(&self) -> &RelayStats {
        &self.stats
    }
}
