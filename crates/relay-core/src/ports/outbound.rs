//! Outbound (driven) ports for the submission orchestrator.
//!
//! These traits define the external collaborators the relay depends on:
//! the ledger service and a time source.

use crate::domain::entities::{Block, Timestamp};
use crate::domain::errors::LedgerError;
use async_trait::async_trait;
use uuid::Uuid;

/// Result of a ledger append within the recognized contract.
///
/// Transport-level failures are not part of this enum; they surface as
/// [`LedgerError`] so the attempt loop can distinguish "the ledger said no"
/// from "the ledger never answered".
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The ledger accepted the write.
    Committed {
        /// Chain version reported by the ledger, when its response carries
        /// one.
        ledger_version: Option<u64>,
    },
    /// The submitted version is stale.
    VersionConflict,
    /// The ledger answered outside the success/conflict contract.
    Rejected { code: u16, body: String },
}

/// Ledger service interface.
///
/// The ledger owns block creation, hash chaining, and the authoritative
/// version store; this relay only calls its submit/read endpoints.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submits one transaction for `resource_id` at the given version.
    ///
    /// # Returns
    /// - `Ok(AppendOutcome)`: the ledger answered within the contract
    /// - `Err(LedgerError)`: the ledger could not be reached in time
    async fn append(
        &self,
        resource_id: &str,
        transaction_id: Uuid,
        version: u64,
    ) -> Result<AppendOutcome, LedgerError>;

    /// Reads the full chain for diagnostics.
    async fn read_chain(&self) -> Result<Vec<Block>, LedgerError>;
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Mock ledger for testing: pops scripted responses, then repeats a default.
#[cfg(test)]
pub struct MockLedger {
    script: parking_lot::Mutex<std::collections::VecDeque<Result<AppendOutcome, LedgerError>>>,
    fallback: Result<AppendOutcome, LedgerError>,
    calls: parking_lot::Mutex<Vec<(String, Uuid, u64)>>,
    chain: Vec<Block>,
}

#[cfg(test)]
impl MockLedger {
    pub fn new() -> Self {
        Self {
            script: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            fallback: Ok(AppendOutcome::Committed {
                ledger_version: None,
            }),
            calls: parking_lot::Mutex::new(Vec::new()),
            chain: Vec::new(),
        }
    }

    pub fn always(fallback: Result<AppendOutcome, LedgerError>) -> Self {
        Self {
            fallback,
            ..Self::new()
        }
    }

    pub fn then(self, step: Result<AppendOutcome, LedgerError>) -> Self {
        self.script.lock().push_back(step);
        self
    }

    pub fn with_chain(mut self, chain: Vec<Block>) -> Self {
        self.chain = chain;
        self
    }

    pub fn calls(&self) -> Vec<(String, Uuid, u64)> {
        self.calls.lock().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl LedgerClient for MockLedger {
    async fn append(
        &self,
        resource_id: &str,
        transaction_id: Uuid,
        version: u64,
    ) -> Result<AppendOutcome, LedgerError> {
        self.calls
            .lock()
            .push((resource_id.to_string(), transaction_id, version));
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    async fn read_chain(&self) -> Result<Vec<Block>, LedgerError> {
        Ok(self.chain.clone())
    }
}

/// Mock time source for testing.
#[cfg(test)]
pub struct MockTimeSource {
    time: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl MockTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: std::sync::atomic::AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(std::sync::atomic::Ordering::SeqCst)
    }
}
