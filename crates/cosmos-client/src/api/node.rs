//! CometBFT JSON-RPC client.

use super::response::{
    decode_base64, parse_height, AbciQueryResponse, AbciQueryResult, BroadcastCommitResult,
    RpcResponse, StatusResult,
};
use super::{AccountInfo, LedgerNode, NodeStatus};
use crate::broadcast::BroadcastResponse;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::proto;
use crate::retry::{RetryConfig, RetryExecutor};
use crate::types::Coin;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use prost::{Message, Name};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json";

const ACCOUNT_QUERY_PATH: &str = "/cosmos.auth.v1beta1.Query/Account";
const ALL_BALANCES_QUERY_PATH: &str = "/cosmos.bank.v1beta1.Query/AllBalances";
const SIMULATE_QUERY_PATH: &str = "/cosmos.tx.v1beta1.Service/Simulate";

/// Client for a node's CometBFT JSON-RPC endpoint.
///
/// Read-only calls are retried with exponential backoff according to the
/// configured [`RetryConfig`]. `broadcast_tx_commit` is sent exactly once.
///
/// # Example
///
/// ```rust,no_run
/// use cosmos_client::api::{LedgerNode, NodeClient};
/// use cosmos_client::config::ClientConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let node = NodeClient::new(&ClientConfig::local())?;
///     let status = node.status().await?;
///     println!("chain id: {}", status.chain_id);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct NodeClient {
    url: Url,
    client: Client,
    retry_config: Arc<RetryConfig>,
    next_id: Arc<AtomicU64>,
}

impl NodeClient {
    /// Creates a new node client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            url: config.node_url().clone(),
            client,
            retry_config: Arc::new(config.retry_config().clone()),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Returns the RPC endpoint.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Sends one JSON-RPC request without retry.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> ClientResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        // CometBFT reports RPC errors with a JSON body on non-2xx statuses too.
        let parsed = serde_json::from_str::<RpcResponse<T>>(&text);
        match parsed {
            Ok(envelope) if envelope.error.is_some() || status.is_success() => {
                envelope.into_result()
            }
            _ if !status.is_success() => Err(ClientError::Status {
                status_code: status.as_u16(),
                message: if text.is_empty() {
                    status.canonical_reason().unwrap_or("unknown").to_string()
                } else {
                    text
                },
            }),
            Ok(envelope) => envelope.into_result(),
            Err(e) => Err(ClientError::connection(format!(
                "malformed {method} response: {e}"
            ))),
        }
    }

    async fn call_with_retry<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> ClientResult<T> {
        let executor = RetryExecutor::new((*self.retry_config).clone());
        executor.execute(|| self.call(method, params.clone())).await
    }

    async fn abci_query(&self, path: &str, data: Vec<u8>) -> ClientResult<AbciQueryResponse> {
        let params = json!({
            "path": path,
            "data": hex::encode(data),
            "prove": false,
        });
        let result: AbciQueryResult = self.call_with_retry("abci_query", params).await?;
        Ok(result.response)
    }
}

fn query_failed(path: &str, response: &AbciQueryResponse) -> ClientError {
    ClientError::Rpc {
        code: i64::from(response.code),
        message: format!("query {path} failed: {}", response.log),
        data: (!response.codespace.is_empty()).then(|| response.codespace.clone()),
    }
}

fn decode_account(any: proto::Any) -> ClientResult<AccountInfo> {
    let base = if any.type_url == proto::BaseAccount::type_url() {
        proto::BaseAccount::decode(any.value.as_slice()).map_err(ClientError::decode)?
    } else if any.type_url == proto::ModuleAccount::type_url() {
        proto::ModuleAccount::decode(any.value.as_slice())
            .map_err(ClientError::decode)?
            .base_account
            .ok_or_else(|| ClientError::decode("module account without base account"))?
    } else {
        return Err(ClientError::decode(format!(
            "unsupported account type {}",
            any.type_url
        )));
    };

    Ok(AccountInfo {
        address: base.address,
        account_number: base.account_number,
        sequence: base.sequence,
    })
}

#[async_trait]
impl LedgerNode for NodeClient {
    async fn status(&self) -> ClientResult<NodeStatus> {
        let result: StatusResult = self.call_with_retry("status", json!({})).await?;
        Ok(NodeStatus {
            chain_id: result.node_info.network,
            moniker: result.node_info.moniker,
            latest_block_height: parse_height(&result.sync_info.latest_block_height)?,
        })
    }

    async fn account(&self, address: &str) -> ClientResult<Option<AccountInfo>> {
        let request = proto::QueryAccountRequest {
            address: address.to_string(),
        };
        let response = self
            .abci_query(ACCOUNT_QUERY_PATH, request.encode_to_vec())
            .await?;

        if response.code != 0 {
            if response.log.contains("not found") {
                debug!(address, "Account not found on chain");
                return Ok(None);
            }
            return Err(query_failed(ACCOUNT_QUERY_PATH, &response));
        }

        let decoded = proto::QueryAccountResponse::decode(response.value_bytes()?.as_slice())
            .map_err(ClientError::decode)?;
        match decoded.account {
            Some(any) => decode_account(any).map(Some),
            None => Ok(None),
        }
    }

    async fn all_balances(&self, address: &str) -> ClientResult<Vec<Coin>> {
        let mut balances = Vec::new();
        let mut key = Vec::new();

        loop {
            let request = proto::QueryAllBalancesRequest {
                address: address.to_string(),
                pagination: Some(proto::PageRequest {
                    key: std::mem::take(&mut key),
                    offset: 0,
                    limit: 0,
                    count_total: false,
                    reverse: false,
                }),
            };
            let response = self
                .abci_query(ALL_BALANCES_QUERY_PATH, request.encode_to_vec())
                .await?;
            if response.code != 0 {
                return Err(query_failed(ALL_BALANCES_QUERY_PATH, &response));
            }

            let page =
                proto::QueryAllBalancesResponse::decode(response.value_bytes()?.as_slice())
                    .map_err(ClientError::decode)?;
            for coin in page.balances {
                balances.push(Coin::saturating_from_proto(coin)?);
            }

            match page.pagination {
                Some(pagination) if !pagination.next_key.is_empty() => {
                    key = pagination.next_key;
                }
                _ => break,
            }
        }

        Ok(balances)
    }

    async fn simulate(&self, tx_bytes: &[u8]) -> ClientResult<u64> {
        let request = proto::SimulateRequest {
            tx_bytes: tx_bytes.to_vec(),
        };
        let response = self
            .abci_query(SIMULATE_QUERY_PATH, request.encode_to_vec())
            .await?;
        if response.code != 0 {
            return Err(ClientError::Simulation {
                code: response.code,
                log: response.log,
            });
        }

        let decoded = proto::SimulateResponse::decode(response.value_bytes()?.as_slice())
            .map_err(ClientError::decode)?;
        decoded
            .gas_info
            .map(|info| info.gas_used)
            .ok_or_else(|| ClientError::decode("simulation response has no gas info"))
    }

    async fn broadcast_commit(&self, tx_bytes: &[u8]) -> ClientResult<BroadcastResponse> {
        let params = json!({ "tx": BASE64.encode(tx_bytes) });
        let result: BroadcastCommitResult = self.call("broadcast_tx_commit", params).await?;

        let executed = result.tx_result.or(result.deliver_tx).unwrap_or_default();
        let outcome = if result.check_tx.code != 0 {
            &result.check_tx
        } else {
            &executed
        };

        Ok(BroadcastResponse {
            code: outcome.code,
            codespace: outcome.codespace.clone(),
            raw_log: outcome.log.clone(),
            data: decode_base64(executed.data.as_deref())?,
            tx_hash: result.hash,
            height: parse_height(&result.height)?,
        })
    }
}
