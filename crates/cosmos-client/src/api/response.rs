//! CometBFT JSON-RPC response types.
//!
//! CometBFT encodes 64-bit integers as strings and binary fields as base64;
//! the types here mirror that and convert on access.

use crate::error::{ClientError, ClientResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    /// Request id echoed back.
    #[serde(default)]
    pub id: serde_json::Value,
    /// Result, on success.
    pub result: Option<T>,
    /// Error object, on failure.
    pub error: Option<RpcErrorObject>,
}

impl<T: DeserializeOwned> RpcResponse<T> {
    /// Converts the envelope into its result or an `Rpc` error.
    pub fn into_result(self) -> ClientResult<T> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        self.result
            .ok_or_else(|| ClientError::connection("response has neither result nor error"))
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorObject {
    /// Error code.
    pub code: i64,
    /// Short description.
    pub message: String,
    /// Details, usually the underlying cause.
    #[serde(default)]
    pub data: Option<String>,
}

impl From<RpcErrorObject> for ClientError {
    fn from(error: RpcErrorObject) -> Self {
        ClientError::Rpc {
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}

/// Result of the `status` method.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResult {
    /// Node identity.
    pub node_info: NodeInfo,
    /// Sync progress.
    pub sync_info: SyncInfo,
}

/// Node identity.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeInfo {
    /// Chain id.
    pub network: String,
    /// Node moniker.
    #[serde(default)]
    pub moniker: String,
}

/// Sync progress.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncInfo {
    /// Latest block height, as a decimal string.
    pub latest_block_height: String,
}

/// Result of the `abci_query` method.
#[derive(Debug, Clone, Deserialize)]
pub struct AbciQueryResult {
    /// The application's answer.
    pub response: AbciQueryResponse,
}

/// The application's answer to an ABCI query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AbciQueryResponse {
    /// Zero on success.
    #[serde(default)]
    pub code: u32,
    /// Error log.
    #[serde(default)]
    pub log: String,
    /// Base64 encoded protobuf answer.
    #[serde(default)]
    pub value: Option<String>,
    /// Module namespace of `code`.
    #[serde(default)]
    pub codespace: String,
}

impl AbciQueryResponse {
    /// Decodes the base64 value. An absent value decodes to empty bytes.
    pub fn value_bytes(&self) -> ClientResult<Vec<u8>> {
        decode_base64(self.value.as_deref())
    }
}

/// Result of the `broadcast_tx_commit` method.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastCommitResult {
    /// Mempool admission result.
    pub check_tx: TxResult,
    /// Execution result (CometBFT 0.37+).
    #[serde(default)]
    pub tx_result: Option<TxResult>,
    /// Execution result (CometBFT 0.34).
    #[serde(default)]
    pub deliver_tx: Option<TxResult>,
    /// Upper-case hex hash of the transaction.
    pub hash: String,
    /// Height the transaction was included at.
    #[serde(default)]
    pub height: String,
}

/// An ABCI `CheckTx` or `DeliverTx` result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxResult {
    /// Zero on success.
    #[serde(default)]
    pub code: u32,
    /// Base64 encoded `TxMsgData`.
    #[serde(default)]
    pub data: Option<String>,
    /// Execution log.
    #[serde(default)]
    pub log: String,
    /// Module namespace of `code`.
    #[serde(default)]
    pub codespace: String,
    /// Gas limit declared by the tx.
    #[serde(default)]
    pub gas_wanted: String,
    /// Gas consumed.
    #[serde(default)]
    pub gas_used: String,
}

pub(crate) fn decode_base64(value: Option<&str>) -> ClientResult<Vec<u8>> {
    match value {
        None | Some("") => Ok(Vec::new()),
        Some(value) => BASE64
            .decode(value)
            .map_err(|e| ClientError::connection(format!("invalid base64 in response: {e}"))),
    }
}

pub(crate) fn parse_height(value: &str) -> ClientResult<u64> {
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|e| ClientError::connection(format!("invalid height {value:?}: {e}")))
}
