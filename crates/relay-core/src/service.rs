//! # Relay Service
//!
//! The submission orchestrator. Owns the submission queue and the conflict
//! log, drives the bounded retry loop against the ledger port, and exposes
//! the read-side diagnostics.
//!
//! ## Thread Safety
//!
//! The service is shared across async tasks via `Arc`. Every `submit` call
//! runs its own attempt loop over its own record; backoff suspends only the
//! calling future. Queue access never holds a map guard across an await.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::audit::{scan_duplicate_resources, ChainAuditFinding};
use crate::domain::config::RelayConfig;
use crate::domain::conflict_log::{ConflictLog, ConflictReport};
use crate::domain::entities::{Block, SubmitOutcome, TransactionRecord};
use crate::domain::errors::RelayError;
use crate::domain::queue::{RelayStats, SubmissionQueue};
use crate::ports::outbound::{AppendOutcome, LedgerClient, SystemTimeSource, TimeSource};

/// Transaction submission orchestrator.
///
/// Generic over the ledger port so tests can script ledger behavior; the
/// production instantiation uses
/// [`HttpLedgerClient`](crate::adapters::http::HttpLedgerClient).
pub struct RelayService<L: LedgerClient> {
    ledger: Arc<L>,
    queue: SubmissionQueue,
    conflicts: ConflictLog,
    config: RelayConfig,
    time: Arc<dyn TimeSource>,
}

impl<L: LedgerClient> RelayService<L> {
    /// Creates a service backed by the system clock.
    pub fn new(ledger: Arc<L>, config: RelayConfig) -> Self {
        Self::with_time_source(ledger, config, Arc::new(SystemTimeSource))
    }

    /// Creates a service with an explicit time source.
    pub fn with_time_source(
        ledger: Arc<L>,
        config: RelayConfig,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            ledger,
            queue: SubmissionQueue::new(),
            conflicts: ConflictLog::new(config.retention.max_conflict_entries),
            config,
            time,
        }
    }

    /// Submits one transaction for `resource_id` and runs the full attempt
    /// loop to a terminal outcome.
    ///
    /// # Errors
    /// `RelayError::MissingResourceId` if `resource_id` is empty or blank;
    /// no record is allocated in that case. Every other path returns a
    /// terminal [`SubmitOutcome`].
    pub async fn submit(&self, resource_id: &str) -> Result<SubmitOutcome, RelayError> {
        if resource_id.trim().is_empty() {
            return Err(RelayError::MissingResourceId);
        }

        let record = TransactionRecord::new(resource_id, self.time.now());
        let transaction_id = record.id;
        self.queue.insert(record);

        debug!(
            transaction_id = %transaction_id,
            resource_id = resource_id,
            "registered submission"
        );

        Ok(self.run_attempts(transaction_id, resource_id).await)
    }

    /// The bounded retry loop for one registered record.
    ///
    /// The record is owned by this loop: nothing else mutates it while the
    /// loop runs, and its status moves monotonically to a terminal state
    /// before the loop returns.
    async fn run_attempts(&self, transaction_id: Uuid, resource_id: &str) -> SubmitOutcome {
        let max_retries = self.config.retry.max_retries;

        loop {
            let (attempt, version) = self
                .queue
                .update(&transaction_id, |r| (r.begin_attempt(), r.version))
                .unwrap_or((1, 0));
            self.stats().total_attempts.fetch_add(1, Ordering::Relaxed);

            match self.ledger.append(resource_id, transaction_id, version).await {
                Ok(AppendOutcome::Committed { ledger_version }) => {
                    let now = self.time.now();
                    let new_version = self
                        .queue
                        .update(&transaction_id, |r| {
                            r.complete(now);
                            r.version
                        })
                        .unwrap_or(version + 1);
                    self.stats().total_accepted.fetch_add(1, Ordering::Relaxed);

                    info!(
                        transaction_id = %transaction_id,
                        resource_id = resource_id,
                        version = new_version,
                        attempt = attempt,
                        "transaction accepted"
                    );
                    if let Some(chain_version) = ledger_version {
                        debug!(
                            transaction_id = %transaction_id,
                            chain_version = chain_version,
                            "ledger reported chain version"
                        );
                    }

                    return SubmitOutcome::Accepted {
                        transaction_id,
                        version: new_version,
                    };
                }

                Ok(AppendOutcome::VersionConflict) => {
                    let message =
                        format!("concurrency conflict detected for resource {resource_id}");
                    self.conflicts.record(resource_id, &message);
                    warn!(
                        transaction_id = %transaction_id,
                        resource_id = resource_id,
                        attempt = attempt,
                        "version conflict reported by ledger"
                    );

                    if attempt < max_retries {
                        let delay = self.config.retry.backoff(attempt);
                        debug!(
                            transaction_id = %transaction_id,
                            delay_ms = delay.as_millis() as u64,
                            "backing off before retry"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let now = self.time.now();
                    self.queue.update(&transaction_id, |r| r.fail(now));
                    self.stats()
                        .total_conflict_failures
                        .fetch_add(1, Ordering::Relaxed);
                    error!(
                        transaction_id = %transaction_id,
                        resource_id = resource_id,
                        attempts = attempt,
                        "retry budget exhausted on version conflicts"
                    );
                    return SubmitOutcome::Conflict { transaction_id };
                }

                Ok(AppendOutcome::Rejected { code, body }) => {
                    let now = self.time.now();
                    self.queue.update(&transaction_id, |r| r.fail(now));
                    self.stats()
                        .total_upstream_errors
                        .fetch_add(1, Ordering::Relaxed);
                    error!(
                        transaction_id = %transaction_id,
                        resource_id = resource_id,
                        code = code,
                        "ledger rejected submission outside the conflict contract"
                    );
                    return SubmitOutcome::Upstream {
                        transaction_id,
                        code,
                        detail: body,
                    };
                }

                Err(transport) => {
                    let now = self.time.now();
                    self.queue.update(&transaction_id, |r| r.fail(now));
                    self.stats()
                        .total_unreachable
                        .fetch_add(1, Ordering::Relaxed);
                    error!(
                        transaction_id = %transaction_id,
                        resource_id = resource_id,
                        error = %transport,
                        "ledger unreachable; not retrying"
                    );
                    return SubmitOutcome::Unreachable {
                        transaction_id,
                        detail: transport.to_string(),
                    };
                }
            }
        }
    }

    /// Conflict log snapshot with total count.
    pub fn list_conflicts(&self) -> ConflictReport {
        self.conflicts.report()
    }

    /// Fetches the chain from the ledger (read-side passthrough).
    pub async fn fetch_chain(&self) -> Result<Vec<Block>, RelayError> {
        Ok(self.ledger.read_chain().await?)
    }

    /// Fetches the chain and scans it for duplicated resources.
    pub async fn audit_chain(&self) -> Result<Vec<ChainAuditFinding>, RelayError> {
        let chain = self.ledger.read_chain().await?;
        let findings = scan_duplicate_resources(&chain);
        if !findings.is_empty() {
            warn!(
                findings = findings.len(),
                blocks = chain.len(),
                "chain audit found duplicated resources"
            );
        }
        Ok(findings)
    }

    /// Snapshot of one record by transaction id.
    pub fn record(&self, transaction_id: &Uuid) -> Option<TransactionRecord> {
        self.queue.get(transaction_id)
    }

    /// Number of records still in flight.
    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }

    /// Submission counters.
    pub fn stats(&self) -> &RelayStats {
        self.queue.stats()
    }

    /// The shared submission queue (for the retention sweep).
    pub fn queue(&self) -> &SubmissionQueue {
        &self.queue
    }

    /// The service's time source (for the retention sweep).
    pub fn time_source(&self) -> Arc<dyn TimeSource> {
        self.time.clone()
    }
}

/// Background task pruning terminal records past their retention TTL.
pub async fn retention_task(
    queue: SubmissionQueue,
    time: Arc<dyn TimeSource>,
    ttl: Duration,
    interval: Duration,
) {
    let mut sweep = tokio::time::interval(interval);
    sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        sweep.tick().await;
        let removed = queue.prune_terminal(time.now(), ttl.as_millis() as u64);
        if removed > 0 {
            debug!(removed = removed, "pruned terminal records");
        }
    }
}
