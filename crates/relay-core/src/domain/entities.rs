//! Core domain entities for the submission orchestrator.
//!
//! Defines the transaction record state machine and the read-side model of
//! the ledger's chain.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

/// Status of a submitted transaction.
///
/// State machine:
/// ```text
/// [PENDING] ──ledger commit──→ [COMPLETED]
///     │
///     └── retries exhausted / transport fault / upstream error ──→ [FAILED]
/// ```
///
/// `Completed` and `Failed` are terminal; a terminal record never reverts
/// to `Pending`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Submission is in flight (attempt loop still running).
    #[default]
    Pending,
    /// The ledger confirmed the write.
    Completed,
    /// The submission ended without a confirmed write.
    Failed,
}

impl TransactionStatus {
    /// Returns true for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

/// One client submission against the ledger.
///
/// A record is created when `submit` accepts a request and is mutated only
/// by the single attempt loop that owns it. `version` starts at 0 and is
/// incremented exactly once, on confirmed success. `retry_count` is
/// incremented exactly once per attempt and never exceeds the configured
/// retry budget.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Globally unique identifier, assigned at submission time.
    pub id: Uuid,
    /// Logical resource (container) this transaction mutates. Not unique
    /// across records.
    pub resource_id: String,
    /// When the first attempt was made.
    pub submitted_at: Timestamp,
    /// Version this relay believes is current for the resource.
    pub version: u64,
    /// Attempts made so far.
    pub retry_count: u32,
    /// Current status.
    pub status: TransactionStatus,
    /// When the record turned terminal. Drives retention pruning.
    pub completed_at: Option<Timestamp>,
}

impl TransactionRecord {
    /// Creates a new pending record with a fresh identity.
    pub fn new(resource_id: impl Into<String>, submitted_at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            resource_id: resource_id.into(),
            submitted_at,
            version: 0,
            retry_count: 0,
            status: TransactionStatus::Pending,
            completed_at: None,
        }
    }

    /// Marks the start of an attempt. Returns the attempt number (1-based).
    pub fn begin_attempt(&mut self) -> u32 {
        self.retry_count += 1;
        self.retry_count
    }

    /// Transitions to `Completed` and bumps the version by exactly 1.
    ///
    /// No-op if the record is already terminal.
    pub fn complete(&mut self, now: Timestamp) {
        if self.status.is_terminal() {
            return;
        }
        self.status = TransactionStatus::Completed;
        self.version += 1;
        self.completed_at = Some(now);
    }

    /// Transitions to `Failed`. No-op if the record is already terminal.
    pub fn fail(&mut self, now: Timestamp) {
        if self.status.is_terminal() {
            return;
        }
        self.status = TransactionStatus::Failed;
        self.completed_at = Some(now);
    }

    /// Returns true once the attempt loop has finished with this record.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns true while the attempt loop still owns this record.
    pub fn is_pending(&self) -> bool {
        matches!(self.status, TransactionStatus::Pending)
    }
}

/// Terminal outcome of a submission, returned to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The ledger confirmed the write.
    Accepted {
        transaction_id: Uuid,
        /// Record version after the confirmed write (pre-attempt value + 1).
        version: u64,
    },
    /// The retry budget was exhausted on version conflicts.
    Conflict { transaction_id: Uuid },
    /// The ledger could not be contacted (connect failure or timeout).
    /// Never retried: the retry budget is reserved for version conflicts.
    Unreachable {
        transaction_id: Uuid,
        detail: String,
    },
    /// The ledger answered outside the recognized success/conflict contract.
    Upstream {
        transaction_id: Uuid,
        code: u16,
        detail: String,
    },
}

impl SubmitOutcome {
    /// Identity of the record this outcome belongs to.
    pub fn transaction_id(&self) -> Uuid {
        match self {
            SubmitOutcome::Accepted { transaction_id, .. }
            | SubmitOutcome::Conflict { transaction_id }
            | SubmitOutcome::Unreachable { transaction_id, .. }
            | SubmitOutcome::Upstream { transaction_id, .. } => *transaction_id,
        }
    }

    /// Returns true only for `Accepted`.
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

/// A transaction as it appears inside a ledger block.
///
/// Field names follow the ledger's JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub container_id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
}

/// Read-side model of a ledger block.
///
/// Consumed only for diagnostics (history fetch, duplicate audit); this
/// crate never computes hashes or mutates the chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(default)]
    pub transactions: Vec<LedgerTransaction>,
    pub previous_hash: String,
    pub hash: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub shard_id: Option<u32>,
}
