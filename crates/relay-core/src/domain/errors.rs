//! Relay error types.

use crate::domain::config::ConfigError;

/// Transport-level failure reaching the ledger.
///
/// These are never retried by the attempt loop; the retry budget is
/// reserved for version conflicts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The ledger endpoint could not be contacted.
    #[error("ledger unreachable: {0}")]
    Unreachable(String),

    /// The request exceeded its bounded timeout.
    #[error("ledger request timed out after {0} ms")]
    Timeout(u64),

    /// The ledger answered with a body this client cannot decode.
    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),
}

/// Top-level relay error, surfaced to callers of the read paths and of
/// `submit` input validation.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The submission named no resource.
    #[error("missing resource identifier")]
    MissingResourceId,

    /// A ledger read failed at the transport layer.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
