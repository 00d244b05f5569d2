//! Transaction submission and result classification.
//!
//! [`Broadcaster`] submits signed bytes and waits for block inclusion, then
//! sorts the outcome into one of three classes:
//!
//! - the node could not be reached, or answered with garbage: a connection
//!   error ([`ClientError::is_connection_error`]), except that a transport
//!   error mentioning "not found" becomes [`ClientError::AccountUnfunded`]
//! - the ledger ran the transaction and rejected it:
//!   [`ClientError::BroadcastRejected`] with the code and raw log verbatim
//! - success: a [`BroadcastResponse`], decodable with
//!   [`BroadcastResponse::decode`]

mod response;

pub use response::BroadcastResponse;

use crate::api::LedgerNode;
use crate::error::{ClientError, ClientResult};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Submits signed transactions in commit mode.
#[derive(Clone)]
pub struct Broadcaster {
    node: Arc<dyn LedgerNode>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Broadcaster {
    /// Creates a broadcaster submitting to `node`.
    pub fn new(node: Arc<dyn LedgerNode>) -> Self {
        Self {
            node,
            timeout: None,
        }
    }

    /// Bounds how long a submission may wait for inclusion.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Submits `tx_bytes` and waits for the result.
    ///
    /// # Errors
    ///
    /// See the [module documentation](self).
    pub async fn submit(&self, tx_bytes: &[u8]) -> ClientResult<BroadcastResponse> {
        self.submit_with_cancel(tx_bytes, &CancellationToken::new())
            .await
    }

    /// Submits `tx_bytes`, giving up when `cancel` fires.
    ///
    /// Giving up only stops waiting: a transaction the node already accepted
    /// may still be included.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Cancelled`] or [`ClientError::Timeout`] if the
    /// wait was cut short, otherwise see the [module documentation](self).
    pub async fn submit_with_cancel(
        &self,
        tx_bytes: &[u8],
        cancel: &CancellationToken,
    ) -> ClientResult<BroadcastResponse> {
        let submission = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, self.node.broadcast_commit(tx_bytes))
                    .await
                    .map_err(|_| ClientError::Timeout {
                        operation: "broadcast".to_string(),
                        timeout_secs: limit.as_secs(),
                    })?,
                None => self.node.broadcast_commit(tx_bytes).await,
            }
        };

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ClientError::Cancelled),
            result = submission => result,
        };
        classify(result)
    }
}

fn classify(result: ClientResult<BroadcastResponse>) -> ClientResult<BroadcastResponse> {
    match result {
        Err(err) if err.is_connection_error() && mentions_not_found(&err) => {
            warn!(error = %err.sanitized_message(), "Broadcast failed, account may be unfunded");
            Err(ClientError::AccountUnfunded(err.to_string()))
        }
        Err(err) => Err(err),
        Ok(response) if !response.is_success() => {
            warn!(
                code = response.code,
                codespace = %response.codespace,
                tx_hash = %response.tx_hash,
                "Transaction rejected"
            );
            Err(ClientError::BroadcastRejected {
                code: response.code,
                codespace: response.codespace,
                raw_log: response.raw_log,
                tx_hash: response.tx_hash,
            })
        }
        Ok(response) => {
            info!(
                tx_hash = %response.tx_hash,
                height = response.height,
                "Transaction committed"
            );
            Ok(response)
        }
    }
}

fn mentions_not_found(err: &ClientError) -> bool {
    let detail = match err {
        ClientError::Rpc {
            data: Some(data), ..
        } => data.as_str(),
        _ => "",
    };
    err.to_string().contains("not found") || detail.contains("not found")
}
