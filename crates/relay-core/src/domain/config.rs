//! Relay configuration with validation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main relay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Ledger endpoint configuration.
    pub ledger: LedgerConfig,
    /// Conflict retry policy.
    pub retry: RetryConfig,
    /// In-memory retention policy for records and conflict entries.
    pub retention: RetentionConfig,
}

impl RelayConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidEndpoint(
                "base_url cannot be empty".into(),
            ));
        }

        if self.ledger.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "request_timeout_ms cannot be 0".into(),
            ));
        }

        if self.ledger.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "connect_timeout_ms cannot be 0".into(),
            ));
        }

        if self.retry.max_retries == 0 {
            return Err(ConfigError::InvalidRetry(
                "max_retries must be at least 1".into(),
            ));
        }

        if self.retry.backoff_base_ms == 0 {
            return Err(ConfigError::InvalidRetry(
                "backoff_base_ms cannot be 0".into(),
            ));
        }

        if self.retention.max_conflict_entries == 0 {
            return Err(ConfigError::InvalidRetention(
                "max_conflict_entries cannot be 0".into(),
            ));
        }

        if self.retention.sweep_interval_ms == 0 {
            return Err(ConfigError::InvalidRetention(
                "sweep_interval_ms cannot be 0".into(),
            ));
        }

        Ok(())
    }
}

/// Ledger endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Base URL of the ledger HTTP API.
    pub base_url: String,
    /// Bound on each ledger request; expiry is treated as unreachable.
    pub request_timeout_ms: u64,
    /// Bound on connection establishment.
    pub connect_timeout_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_ms: 5_000,
            connect_timeout_ms: 2_000,
        }
    }
}

impl LedgerConfig {
    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Connect timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Conflict retry policy.
///
/// Backoff is exponential with no jitter and no upper cap:
/// `backoff(n) = backoff_base * 2^n` after the n-th conflicted attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum attempts per submission.
    pub max_retries: u32,
    /// Backoff base in milliseconds.
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

impl RetryConfig {
    /// Delay to apply after the `attempt`-th conflicted attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

/// Retention policy for process-scoped state.
///
/// The source of this behavior kept every record and conflict forever;
/// bounded retention closes that leak. Pending records are never evicted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Maximum conflict log entries; oldest are evicted beyond this.
    pub max_conflict_entries: usize,
    /// Terminal records older than this are pruned.
    pub record_ttl_ms: u64,
    /// Cadence of the background pruning sweep.
    pub sweep_interval_ms: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_conflict_entries: 1024,
            record_ttl_ms: 600_000, // 10 minutes
            sweep_interval_ms: 30_000,
        }
    }
}

impl RetentionConfig {
    /// Record TTL as a `Duration`.
    pub fn record_ttl(&self) -> Duration {
        Duration::from_millis(self.record_ttl_ms)
    }

    /// Sweep interval as a `Duration`.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Ledger endpoint is unusable.
    #[error("invalid ledger endpoint: {0}")]
    InvalidEndpoint(String),
    /// Invalid timeout value.
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Invalid retry policy.
    #[error("invalid retry policy: {0}")]
    InvalidRetry(String),
    /// Invalid retention policy.
    #[error("invalid retention policy: {0}")]
    InvalidRetention(String),
    /// General configuration error.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
