//! Port definitions (traits) for the submission orchestrator.

pub mod outbound;

pub use outbound::*;
