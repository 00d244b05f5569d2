//! Faucet client for funding accounts on local chains.

use super::FaucetService;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// A transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaucetRequest {
    /// Recipient address.
    pub address: String,
    /// Denom to send; the faucet's default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denom: Option<String>,
    /// Amount to send; the faucet's default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
}

impl FaucetRequest {
    /// A request for the faucet's default coins.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            denom: None,
            amount: None,
        }
    }
}

/// The faucet's answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FaucetResponse {
    /// Request-level error.
    #[serde(default)]
    pub error: Option<String>,
    /// One entry per coin transferred.
    #[serde(default)]
    pub transfers: Vec<FaucetTransfer>,
}

/// Outcome of one transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FaucetTransfer {
    /// Recipient address.
    #[serde(default)]
    pub recipient: Option<String>,
    /// Coin sent, e.g. `10token`.
    #[serde(default)]
    pub coin: Option<String>,
    /// Transfer status reported by the faucet.
    #[serde(default)]
    pub status: Option<String>,
    /// Transfer-level error.
    #[serde(default)]
    pub error: Option<String>,
}

impl FaucetResponse {
    /// Returns the first error, request-level before transfer-level.
    /// Empty strings are not errors.
    pub fn first_error(&self) -> Option<&str> {
        std::iter::once(self.error.as_deref())
            .chain(self.transfers.iter().map(|t| t.error.as_deref()))
            .flatten()
            .find(|e| !e.is_empty())
    }
}

/// HTTP client for a token faucet.
///
/// Requests are sent once; a faucet transfer is not idempotent.
#[derive(Debug, Clone)]
pub struct FaucetClient {
    url: Url,
    client: Client,
}

impl FaucetClient {
    /// Creates a faucet client for the service at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(url: Url, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Http)?;
        Ok(Self { url, client })
    }

    /// Returns the faucet URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl FaucetService for FaucetClient {
    async fn transfer(&self, request: &FaucetRequest) -> ClientResult<FaucetResponse> {
        let response = self
            .client
            .post(self.url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Faucets report rejected transfers with an error status and a
        // structured body; classify those by body, not status.
        let parsed = serde_json::from_str::<FaucetResponse>(&body);
        match parsed {
            Ok(parsed) if status.is_success() || parsed.first_error().is_some() => Ok(parsed),
            _ if !status.is_success() => Err(ClientError::Status {
                status_code: status.as_u16(),
                message: body,
            }),
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ClientError::connection(format!(
                "malformed faucet response: {e}"
            ))),
        }
    }
}
