//! HTTP adapter for the ledger service.
//!
//! Maps the ledger's REST surface onto the [`LedgerClient`] port:
//! `POST /addTransaction` for appends, `GET /blockchain` for the read-side
//! chain. Success is signaled by `201 Created`, a stale version by
//! `409 Conflict`; any other status is an upstream rejection.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::config::{ConfigError, LedgerConfig};
use crate::domain::entities::Block;
use crate::domain::errors::{LedgerError, RelayError};
use crate::ports::outbound::{AppendOutcome, LedgerClient};

/// Append request body, in the ledger's field naming.
#[derive(Debug, Serialize)]
struct AppendTransactionRequest<'a> {
    #[serde(rename = "containerID")]
    container_id: &'a str,
    #[serde(rename = "transactionID")]
    transaction_id: String,
    version: u64,
}

/// Append success body. The ledger may or may not report a chain version.
#[derive(Debug, Default, Deserialize)]
struct AppendTransactionResponse {
    #[serde(default)]
    #[allow(dead_code)]
    message: Option<String>,
    #[serde(default)]
    version: Option<u64>,
}

/// Ledger HTTP client with bounded request and connect timeouts.
pub struct HttpLedgerClient {
    client: Client,
    base_url: String,
    request_timeout_ms: u64,
}

impl HttpLedgerClient {
    /// Builds a client from the ledger endpoint configuration.
    pub fn new(config: &LedgerConfig) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| RelayError::Config(ConfigError::Invalid(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout_ms: config.request_timeout_ms,
        })
    }

    fn map_transport(&self, error: reqwest::Error) -> LedgerError {
        if error.is_timeout() {
            LedgerError::Timeout(self.request_timeout_ms)
        } else if error.is_connect() {
            LedgerError::Unreachable(format!("cannot connect to {}", self.base_url))
        } else {
            LedgerError::Unreachable(error.to_string())
        }
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn append(
        &self,
        resource_id: &str,
        transaction_id: Uuid,
        version: u64,
    ) -> Result<AppendOutcome, LedgerError> {
        let request = AppendTransactionRequest {
            container_id: resource_id,
            transaction_id: transaction_id.to_string(),
            version,
        };

        let response = self
            .client
            .post(format!("{}/addTransaction", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        match response.status() {
            StatusCode::CREATED => {
                // A missing or undecodable success body is still a commit.
                let body: AppendTransactionResponse = response.json().await.unwrap_or_default();
                Ok(AppendOutcome::Committed {
                    ledger_version: body.version,
                })
            }
            StatusCode::CONFLICT => {
                let body = response.text().await.unwrap_or_default();
                debug!(resource_id = resource_id, body = %body, "ledger reported conflict");
                Ok(AppendOutcome::VersionConflict)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Ok(AppendOutcome::Rejected {
                    code: status.as_u16(),
                    body,
                })
            }
        }
    }

    async fn read_chain(&self) -> Result<Vec<Block>, LedgerError> {
        let response = self
            .client
            .get(format!("{}/blockchain", self.base_url))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::InvalidResponse(format!(
                "chain read answered {status}"
            )));
        }

        response
            .json::<Vec<Block>>()
            .await
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))
    }
}
