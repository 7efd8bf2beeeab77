//! # Ledger-Relay Core
//!
//! Client-side submission orchestrator for an externally-owned container
//! activity ledger (a chain of hash-linked blocks) that enforces optimistic
//! concurrency control.
//!
//! ## Purpose
//!
//! The ledger rejects any submission whose version is stale. This crate owns
//! the client half of that contract: it assigns transaction identity, tracks
//! per-record version state, retries version conflicts with bounded
//! exponential backoff, records conflicts for diagnostics, and returns a
//! terminal outcome for every submission. The ledger itself (block creation,
//! hashing, persistence, the authoritative version store) is an external
//! collaborator reached over HTTP.
//!
//! ## Control Flow
//!
//! ```text
//! caller ──submit(resource)──→ RelayService
//!                                   │ register TransactionRecord
//!                                   ↓
//!                         LedgerClient::append ──201──→ Accepted (version +1)
//!                                   │
//!                                   ├──409──→ ConflictLog.record (deduplicated)
//!                                   │         retry_count < max? backoff, retry
//!                                   │         else → Conflict (failed)
//!                                   │
//!                                   ├──transport fault──→ Unreachable (no retry)
//!                                   └──anything else──→ Upstream (no retry)
//! ```
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/ - HttpLedgerClient (reqwest) for the ledger HTTP API │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/outbound.rs - LedgerClient, TimeSource traits            │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  service.rs            - RelayService (attempt loop, sweeps)    │
//! │  domain/entities.rs    - TransactionRecord, status machine      │
//! │  domain/queue.rs       - SubmissionQueue, RelayStats            │
//! │  domain/conflict_log.rs- deduplicated conflict observations     │
//! │  domain/audit.rs       - cross-block duplicate scan             │
//! │  domain/config.rs      - RelayConfig with validation            │
//! │  domain/errors.rs      - RelayError, LedgerError                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Many `submit` calls may run at once; each owns its record exclusively and
//! suspends only its own future during backoff. The queue and conflict log
//! are the only shared structures and are safe under concurrent access. No
//! client-side cross-transaction locking exists: the ledger's version check
//! is the arbiter when two submissions race on the same resource.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use service::{retention_task, RelayService};
