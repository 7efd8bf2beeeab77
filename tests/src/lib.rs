//! # Ledger-Relay Test Suite
//!
//! Unified test crate covering end-to-end behavior of the submission
//! orchestrator against a scripted ledger.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Scripted ledger stub and fixtures
//! └── integration/
//!     ├── submission.rs # Attempt loop: retries, backoff, short-circuits
//!     └── diagnostics.rs# Conflict log, chain fetch, chain audit
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p relay-tests
//! ```

pub mod integration;
pub mod support;
