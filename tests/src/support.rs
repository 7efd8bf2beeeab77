//! Shared fixtures: a scripted ledger stub implementing the outbound port.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use uuid::Uuid;

use relay_core::ports::outbound::{AppendOutcome, LedgerClient};
use relay_core::{Block, LedgerError, LedgerTransaction, RelayConfig, RelayService};

/// One observed append call.
#[derive(Clone, Debug)]
pub struct AppendCall {
    pub resource_id: String,
    pub transaction_id: Uuid,
    pub version: u64,
}

/// Ledger stub that answers from a script, then repeats a fallback.
///
/// Scripted steps are consumed across *all* submissions in arrival order,
/// which is what the single-submission scenarios need; concurrency tests
/// use a fallback-only stub so every call behaves identically.
pub struct ScriptedLedger {
    script: Mutex<VecDeque<Result<AppendOutcome, LedgerError>>>,
    fallback: Result<AppendOutcome, LedgerError>,
    calls: Mutex<Vec<AppendCall>>,
    chain: Vec<Block>,
}

impl ScriptedLedger {
    /// Stub that commits every append.
    pub fn committing() -> Self {
        Self::with_fallback(Ok(AppendOutcome::Committed {
            ledger_version: None,
        }))
    }

    /// Stub that reports a version conflict on every append.
    pub fn conflicting() -> Self {
        Self::with_fallback(Ok(AppendOutcome::VersionConflict))
    }

    /// Stub that repeats `fallback` once the script is exhausted.
    pub fn with_fallback(fallback: Result<AppendOutcome, LedgerError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: Mutex::new(Vec::new()),
            chain: Vec::new(),
        }
    }

    /// Queues one scripted response.
    pub fn then(self, step: Result<AppendOutcome, LedgerError>) -> Self {
        self.script.lock().push_back(step);
        self
    }

    pub fn then_conflict(self) -> Self {
        self.then(Ok(AppendOutcome::VersionConflict))
    }

    /// Sets the chain served by `read_chain`.
    pub fn with_chain(mut self, chain: Vec<Block>) -> Self {
        self.chain = chain;
        self
    }

    /// Every append observed so far.
    pub fn calls(&self) -> Vec<AppendCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn append(
        &self,
        resource_id: &str,
        transaction_id: Uuid,
        version: u64,
    ) -> Result<AppendOutcome, LedgerError> {
        self.calls.lock().push(AppendCall {
            resource_id: resource_id.to_string(),
            transaction_id,
            version,
        });
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    async fn read_chain(&self) -> Result<Vec<Block>, LedgerError> {
        Ok(self.chain.clone())
    }
}

/// Service wired to the given stub with default configuration.
pub fn relay(ledger: ScriptedLedger) -> (Arc<RelayService<ScriptedLedger>>, Arc<ScriptedLedger>) {
    let ledger = Arc::new(ledger);
    let service = Arc::new(RelayService::new(ledger.clone(), RelayConfig::default()));
    (service, ledger)
}

/// A minimal chain block for audit and fetch tests.
pub fn block(index: u64, resources: &[&str]) -> Block {
    Block {
        index,
        timestamp: "2025-03-01T10:00:00Z".to_string(),
        container_id: None,
        transactions: resources
            .iter()
            .map(|resource| LedgerTransaction {
                container_id: resource.to_string(),
                timestamp: "2025-03-01T10:00:00Z".to_string(),
                transaction_id: None,
                version: None,
            })
            .collect(),
        previous_hash: if index == 0 {
            "0".to_string()
        } else {
            format!("hash-{}", index - 1)
        },
        hash: format!("hash-{index}"),
        version: index + 1,
        shard_id: None,
    }
}
