//! In-process node, faucet and key store.

use async_trait::async_trait;
use cosmos_client::address_config;
use cosmos_client::api::{
    AccountInfo, FaucetRequest, FaucetResponse, FaucetService, LedgerNode, NodeStatus,
};
use cosmos_client::keyring::{KeyInfo, Keyring, KeyringError, MemoryKeyring};
use cosmos_client::proto::SignMode;
use cosmos_client::{AddressFormat, BroadcastResponse, ClientError, ClientResult, Coin};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub struct Node {
    pub account: Option<(u64, u64)>,
    pub simulated_gas: u64,
    pub balances: Mutex<VecDeque<Vec<Coin>>>,
    pub broadcast: Mutex<Option<ClientResult<BroadcastResponse>>>,
    pub broadcast_delay: Option<Duration>,
    pub account_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub broadcasts: Mutex<Vec<Vec<u8>>>,
}

impl Node {
    pub fn new() -> Self {
        Self {
            account: Some((7, 3)),
            simulated_gas: 61_234,
            balances: Mutex::new(VecDeque::from([vec![Coin::new(1_000, "token")]])),
            broadcast: Mutex::new(None),
            broadcast_delay: None,
            account_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            broadcasts: Mutex::new(Vec::new()),
        }
    }

    pub fn unknown_account(mut self) -> Self {
        self.account = None;
        self
    }

    /// Each balance query takes the next entry; the last one repeats.
    pub fn with_balances(self, steps: Vec<Vec<Coin>>) -> Self {
        *self.balances.lock().unwrap() = steps.into();
        self
    }

    pub fn with_broadcast(self, result: ClientResult<BroadcastResponse>) -> Self {
        *self.broadcast.lock().unwrap() = Some(result);
        self
    }

    pub fn with_broadcast_delay(mut self, delay: Duration) -> Self {
        self.broadcast_delay = Some(delay);
        self
    }

    pub fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn broadcasts(&self) -> Vec<Vec<u8>> {
        self.broadcasts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerNode for Node {
    async fn status(&self) -> ClientResult<NodeStatus> {
        Ok(NodeStatus {
            chain_id: "testchain".to_string(),
            moniker: "mock".to_string(),
            latest_block_height: 1,
        })
    }

    async fn account(&self, address: &str) -> ClientResult<Option<AccountInfo>> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .account
            .map(|(account_number, sequence)| AccountInfo {
                address: address.to_string(),
                account_number,
                sequence,
            }))
    }

    async fn all_balances(&self, _address: &str) -> ClientResult<Vec<Coin>> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        let mut steps = self.balances.lock().unwrap();
        let step = if steps.len() > 1 {
            steps.pop_front()
        } else {
            steps.front().cloned()
        };
        Ok(step.unwrap_or_default())
    }

    async fn simulate(&self, _tx_bytes: &[u8]) -> ClientResult<u64> {
        Ok(self.simulated_gas)
    }

    async fn broadcast_commit(&self, tx_bytes: &[u8]) -> ClientResult<BroadcastResponse> {
        self.broadcasts.lock().unwrap().push(tx_bytes.to_vec());
        if let Some(delay) = self.broadcast_delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.broadcast.lock().unwrap().take();
        scripted.unwrap_or_else(|| {
            Ok(BroadcastResponse {
                tx_hash: "HASH".to_string(),
                height: 5,
                ..BroadcastResponse::default()
            })
        })
    }
}

#[derive(Default)]
pub struct Faucet {
    pub response: FaucetResponse,
    pub requests: Mutex<Vec<FaucetRequest>>,
}

#[async_trait]
impl FaucetService for Faucet {
    async fn transfer(&self, request: &FaucetRequest) -> ClientResult<FaucetResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.response.clone())
    }
}

/// A key store that, like legacy stores, encodes addresses with the
/// process-wide prefix instead of the one it is given.
#[derive(Default)]
pub struct GlobalPrefixKeyring {
    pub inner: MemoryKeyring,
}

#[async_trait]
impl Keyring for GlobalPrefixKeyring {
    async fn key(&self, name: &str) -> Result<KeyInfo, KeyringError> {
        self.inner.key(name).await
    }

    async fn address(&self, name: &str, _format: &AddressFormat) -> Result<String, KeyringError> {
        let info = self.inner.key(name).await?;
        let before = address_config::current();
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        let after = address_config::current();
        if before != after {
            return Err(KeyringError::InvalidKey(format!(
                "prefix changed from {} to {}",
                before.account_prefix(),
                after.account_prefix()
            )));
        }
        info.acc_address()
            .to_bech32(&after)
            .map_err(|e: ClientError| KeyringError::InvalidKey(e.to_string()))
    }

    async fn sign(
        &self,
        name: &str,
        payload: &[u8],
        mode: SignMode,
    ) -> Result<Vec<u8>, KeyringError> {
        self.inner.sign(name, payload, mode).await
    }
}
