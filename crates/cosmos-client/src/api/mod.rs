//! Remote services the pipeline talks to.
//!
//! - [`LedgerNode`] / [`NodeClient`] - CometBFT JSON-RPC access to a node
//! - [`FaucetService`] / [`FaucetClient`] - token faucet for local chains
//!
//! The traits are the seams the pipeline is written against; the HTTP
//! clients are the default implementations.

mod faucet;
mod node;
pub mod response;

pub use faucet::{FaucetClient, FaucetRequest, FaucetResponse, FaucetTransfer};
pub use node::NodeClient;

use crate::broadcast::BroadcastResponse;
use crate::error::ClientResult;
use crate::types::Coin;
use async_trait::async_trait;

/// Node identity and sync height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    /// Chain id the node serves.
    pub chain_id: String,
    /// Node moniker.
    pub moniker: String,
    /// Height of the latest block the node has.
    pub latest_block_height: u64,
}

/// On-chain account state needed for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// Bech32 address.
    pub address: String,
    /// Account number assigned at creation.
    pub account_number: u64,
    /// Next sequence (nonce) to sign with.
    pub sequence: u64,
}

/// A ledger node.
#[async_trait]
pub trait LedgerNode: Send + Sync + 'static {
    /// Returns the node status.
    async fn status(&self) -> ClientResult<NodeStatus>;

    /// Looks up an account. `None` means the ledger does not know it.
    async fn account(&self, address: &str) -> ClientResult<Option<AccountInfo>>;

    /// Returns every balance held by `address`.
    async fn all_balances(&self, address: &str) -> ClientResult<Vec<Coin>>;

    /// Dry-runs a transaction and returns the gas it used.
    async fn simulate(&self, tx_bytes: &[u8]) -> ClientResult<u64>;

    /// Submits a transaction and waits until it is included in a block.
    async fn broadcast_commit(&self, tx_bytes: &[u8]) -> ClientResult<BroadcastResponse>;
}

/// A token faucet.
#[async_trait]
pub trait FaucetService: Send + Sync + 'static {
    /// Requests a transfer. Service-level failures are reported inside the
    /// response, not as `Err`.
    async fn transfer(&self, request: &FaucetRequest) -> ClientResult<FaucetResponse>;
}
