//! Append-only, deduplicated log of concurrency conflict observations.
//!
//! Written only by the orchestrator's attempt loop; queryable by callers
//! for diagnostics. Deduplication distinguishes transient contention (one
//! entry per resource, however many retries it cost) from systemic failure
//! (many resources conflicting at once).

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// One observed conflict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConflictEntry {
    /// When the conflict was first observed.
    pub timestamp: DateTime<Utc>,
    /// Resource the rejected transaction targeted.
    pub resource_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Conflict listing returned to callers.
#[derive(Clone, Debug, Serialize)]
pub struct ConflictReport {
    pub total_conflicts: usize,
    pub conflicts: Vec<ConflictEntry>,
}

struct ConflictLogInner {
    entries: VecDeque<ConflictEntry>,
    /// Dedup keys: (resource_id, message).
    seen: HashSet<(String, String)>,
}

/// Shared conflict log.
///
/// A single mutex guards both the entries and the dedup set, so the
/// check-then-insert in [`record`](Self::record) cannot race, and
/// [`list`](Self::list) snapshots the log without observing a concurrent
/// append mid-iteration.
#[derive(Clone)]
pub struct ConflictLog {
    inner: Arc<Mutex<ConflictLogInner>>,
    capacity: usize,
}

impl ConflictLog {
    /// Creates a log retaining at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ConflictLogInner {
                entries: VecDeque::new(),
                seen: HashSet::new(),
            })),
            capacity,
        }
    }

    /// Appends an entry unless a structurally identical one exists.
    ///
    /// Returns true if the entry was appended. At capacity the oldest entry
    /// is evicted together with its dedup key, so a long-gone duplicate can
    /// reappear after eviction.
    pub fn record(&self, resource_id: &str, message: &str) -> bool {
        let key = (resource_id.to_string(), message.to_string());
        let mut inner = self.inner.lock();

        if inner.seen.contains(&key) {
            return false;
        }

        if inner.entries.len() >= self.capacity {
            if let Some(evicted) = inner.entries.pop_front() {
                inner.seen.remove(&(evicted.resource_id, evicted.message));
            }
        }

        inner.entries.push_back(ConflictEntry {
            timestamp: Utc::now(),
            resource_id: key.0.clone(),
            message: key.1.clone(),
        });
        inner.seen.insert(key);
        true
    }

    /// Snapshot of all entries in insertion order.
    pub fn list(&self) -> Vec<ConflictEntry> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    /// Listing plus total count, the shape callers consume.
    pub fn report(&self) -> ConflictReport {
        let conflicts = self.list();
        ConflictReport {
            total_conflicts: conflicts.len(),
            conflicts,
        }
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// True when no conflict has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
