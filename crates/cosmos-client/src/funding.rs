//! Automatic account funding from a faucet.
//!
//! [`FaucetFunder::ensure_funded`] checks the balance of an address and, if it
//! holds less than the configured minimum of the configured denom, asks the
//! faucet once and then polls the balance until it is sufficient or the
//! deadline passes. The deadline counts from when funding began, so the
//! faucet call itself is part of the budget.

use crate::api::{FaucetRequest, FaucetService, LedgerNode};
use crate::config::FaucetConfig;
use crate::error::{ClientError, ClientResult};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Tops up accounts from a faucet.
#[derive(Clone)]
pub struct FaucetFunder {
    node: Arc<dyn LedgerNode>,
    faucet: Arc<dyn FaucetService>,
    config: FaucetConfig,
}

impl std::fmt::Debug for FaucetFunder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaucetFunder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FaucetFunder {
    /// Creates a funder checking balances on `node` and requesting from
    /// `faucet`.
    pub fn new(
        node: Arc<dyn LedgerNode>,
        faucet: Arc<dyn FaucetService>,
        config: FaucetConfig,
    ) -> Self {
        Self {
            node,
            faucet,
            config,
        }
    }

    /// Returns the funding settings.
    pub fn config(&self) -> &FaucetConfig {
        &self.config
    }

    /// Returns true if `address` holds at least the minimum amount of the
    /// configured denom.
    ///
    /// # Errors
    ///
    /// Returns an error if the balance query fails.
    pub async fn check_balance(&self, address: &str) -> ClientResult<bool> {
        let balances = self.node.all_balances(address).await?;
        Ok(balances.iter().any(|coin| {
            coin.denom == self.config.denom() && coin.amount >= self.config.min_amount()
        }))
    }

    /// Makes sure `address` is funded, requesting tokens if it is not.
    ///
    /// # Errors
    ///
    /// - the initial balance query fails
    /// - the faucet cannot be reached, or reports an error for the request
    ///   or any transfer in it ([`ClientError::FaucetRequest`])
    /// - the balance is still short when the deadline passes
    ///   ([`ClientError::InsufficientBalance`])
    pub async fn ensure_funded(&self, address: &str) -> ClientResult<()> {
        if self.check_balance(address).await? {
            debug!(address, "Account already funded");
            return Ok(());
        }

        let started = Instant::now();
        let deadline = started + self.config.deadline();
        self.request_funds(address).await?;

        let polled = tokio::time::timeout_at(deadline, self.poll_balance(address)).await;
        if polled.is_ok() {
            info!(
                address,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Account funded from faucet"
            );
            return Ok(());
        }

        Err(ClientError::InsufficientBalance {
            address: address.to_string(),
            denom: self.config.denom().to_string(),
            min_amount: self.config.min_amount(),
            waited_secs: started.elapsed().as_secs(),
        })
    }

    async fn request_funds(&self, address: &str) -> ClientResult<()> {
        info!(address, faucet = %self.config.url(), "Requesting tokens from faucet");
        let response = self.faucet.transfer(&FaucetRequest::new(address)).await?;
        match response.first_error() {
            Some(error) => Err(ClientError::FaucetRequest(error.to_string())),
            None => Ok(()),
        }
    }

    // Runs until the balance is sufficient; the caller bounds it.
    async fn poll_balance(&self, address: &str) {
        loop {
            tokio::time::sleep(self.config.poll_interval()).await;
            match self.check_balance(address).await {
                Ok(true) => return,
                Ok(false) => debug!(address, "Balance still below minimum"),
                Err(e) => warn!(
                    address,
                    error = %e.sanitized_message(),
                    "Balance query failed while waiting for faucet"
                ),
            }
        }
    }
}
