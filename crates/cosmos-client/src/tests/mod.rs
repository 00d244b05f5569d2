//! In-process collaborators for unit tests.

use crate::api::{AccountInfo, FaucetRequest, FaucetResponse, FaucetService, LedgerNode, NodeStatus};
use crate::broadcast::BroadcastResponse;
use crate::error::{ClientError, ClientResult};
use crate::types::Coin;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A scriptable ledger node that counts its calls.
#[derive(Debug)]
pub(crate) struct MockNode {
    account: Option<AccountInfo>,
    // `None` entries fail; the last entry repeats.
    balances: Mutex<VecDeque<Option<Vec<Coin>>>>,
    simulation: Result<u64, (u32, String)>,
    broadcast: Mutex<Option<ClientResult<BroadcastResponse>>>,
    broadcast_delay: Option<Duration>,
    account_calls: AtomicUsize,
    balance_calls: AtomicUsize,
    simulate_calls: AtomicUsize,
    last_simulated: Mutex<Option<Vec<u8>>>,
    last_broadcast: Mutex<Option<Vec<u8>>>,
}

impl MockNode {
    pub(crate) fn new() -> Self {
        Self {
            account: None,
            balances: Mutex::new(VecDeque::from([Some(Vec::new())])),
            simulation: Ok(50_000),
            broadcast: Mutex::new(None),
            broadcast_delay: None,
            account_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            simulate_calls: AtomicUsize::new(0),
            last_simulated: Mutex::new(None),
            last_broadcast: Mutex::new(None),
        }
    }

    pub(crate) fn with_account(mut self, account_number: u64, sequence: u64) -> Self {
        self.account = Some(AccountInfo {
            address: String::new(),
            account_number,
            sequence,
        });
        self
    }

    pub(crate) fn with_balances(self, steps: Vec<Option<Vec<Coin>>>) -> Self {
        *self.balances.lock().unwrap() = steps.into();
        self
    }

    pub(crate) fn with_simulated_gas(mut self, gas: u64) -> Self {
        self.simulation = Ok(gas);
        self
    }

    pub(crate) fn failing_simulation(mut self, code: u32, log: &str) -> Self {
        self.simulation = Err((code, log.to_string()));
        self
    }

    pub(crate) fn with_broadcast(self, result: ClientResult<BroadcastResponse>) -> Self {
        *self.broadcast.lock().unwrap() = Some(result);
        self
    }

    pub(crate) fn with_broadcast_delay(mut self, delay: Duration) -> Self {
        self.broadcast_delay = Some(delay);
        self
    }

    pub(crate) fn account_calls(&self) -> usize {
        self.account_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn simulate_calls(&self) -> usize {
        self.simulate_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_simulated(&self) -> Option<Vec<u8>> {
        self.last_simulated.lock().unwrap().clone()
    }

    pub(crate) fn last_broadcast(&self) -> Option<Vec<u8>> {
        self.last_broadcast.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerNode for MockNode {
    async fn status(&self) -> ClientResult<NodeStatus> {
        Ok(NodeStatus {
            chain_id: "localnet".to_string(),
            moniker: "mock".to_string(),
            latest_block_height: 1,
        })
    }

    async fn account(&self, address: &str) -> ClientResult<Option<AccountInfo>> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.account.clone().map(|account| AccountInfo {
            address: address.to_string(),
            ..account
        }))
    }

    async fn all_balances(&self, _address: &str) -> ClientResult<Vec<Coin>> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut steps = self.balances.lock().unwrap();
            if steps.len() > 1 {
                steps.pop_front().flatten()
            } else {
                steps.front().cloned().flatten()
            }
        };
        step.ok_or_else(|| ClientError::connection("balance query failed"))
    }

    async fn simulate(&self, tx_bytes: &[u8]) -> ClientResult<u64> {
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_simulated.lock().unwrap() = Some(tx_bytes.to_vec());
        self.simulation
            .clone()
            .map_err(|(code, log)| ClientError::Simulation { code, log })
    }

    async fn broadcast_commit(&self, tx_bytes: &[u8]) -> ClientResult<BroadcastResponse> {
        *self.last_broadcast.lock().unwrap() = Some(tx_bytes.to_vec());
        if let Some(delay) = self.broadcast_delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.broadcast.lock().unwrap().take();
        scripted.unwrap_or_else(|| {
            Ok(BroadcastResponse {
                tx_hash: "HASH".to_string(),
                height: 1,
                ..BroadcastResponse::default()
            })
        })
    }
}

/// A faucet that answers every request with the same response.
#[derive(Debug, Default)]
pub(crate) struct MockFaucet {
    response: FaucetResponse,
    requests: Mutex<Vec<FaucetRequest>>,
}

impl MockFaucet {
    pub(crate) fn new(response: FaucetResponse) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<FaucetRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FaucetService for MockFaucet {
    async fn transfer(&self, request: &FaucetRequest) -> ClientResult<FaucetResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.response.clone())
    }
}
