//! Main client entry point.
//!
//! The [`Client`] runs the broadcast pipeline for a named signer:
//! optional faucet funding, account resolution and gas estimation in
//! [`Client::quote`], then signing and broadcast in [`Quote::commit`].

use crate::address_config::with_address_prefix;
use crate::api::{FaucetClient, FaucetService, LedgerNode, NodeClient};
use crate::broadcast::{BroadcastResponse, Broadcaster};
use crate::config::{ClientConfig, FaucetConfig};
use crate::error::{ClientError, ClientResult};
use crate::funding::FaucetFunder;
use crate::keyring::{self, KeyInfo, Keyring};
use crate::transaction::{GasEstimator, Message, Quote, SequenceResolver, TxFactory};
use crate::types::AddressFormat;
use std::sync::Arc;
use tracing::debug;

/// The entry point for building and broadcasting transactions.
///
/// # Example
///
/// ```rust,no_run
/// use cosmos_client::proto::MsgSend;
/// use cosmos_client::transaction::Message;
/// use cosmos_client::{Client, ClientConfig, FaucetConfig};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ClientConfig::local().with_faucet(FaucetConfig::local());
///     let client = Client::connect(config).await?;
///
///     let from = client.address("alice").await?;
///     let send = MsgSend {
///         from_address: from,
///         to_address: "cosmos1...".to_string(),
///         amount: vec![],
///     };
///
///     let quote = client.quote("alice", vec![Message::from_msg(&send)]).await?;
///     println!("gas: {}", quote.gas());
///     let response = quote.commit().await?;
///     println!("committed at height {}", response.height);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    chain_id: String,
    format: AddressFormat,
    node: Arc<dyn LedgerNode>,
    keyring: Arc<dyn Keyring>,
    funder: Option<FaucetFunder>,
    factory: TxFactory,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("chain_id", &self.chain_id)
            .field("funder", &self.funder)
            .field("factory", &self.factory)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Connects to the node in `config`, learns its chain id and opens the
    /// keyring for that chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot be reached, or the address prefix
    /// or keyring settings are invalid.
    pub async fn connect(config: ClientConfig) -> ClientResult<Self> {
        let node = Arc::new(NodeClient::new(&config)?);
        let status = node.status().await?;
        let keyring = keyring::open(config.keyring(), &status.chain_id)?;
        let faucet = match config.faucet() {
            Some(faucet) => Some(Arc::new(FaucetClient::new(
                faucet.url().clone(),
                config.timeout(),
            )?) as Arc<dyn FaucetService>),
            None => None,
        };
        debug!(chain_id = %status.chain_id, node = %config.node_url(), "Connected to node");
        Self::from_parts(config, status.chain_id, node, keyring, faucet)
    }

    /// Assembles a client from existing collaborators.
    ///
    /// Funding is enabled when `faucet` is given, with the settings from
    /// `config` or [`FaucetConfig::local`] if it has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address prefix is not a valid
    /// bech32 prefix.
    pub fn from_parts(
        config: ClientConfig,
        chain_id: impl Into<String>,
        node: Arc<dyn LedgerNode>,
        keyring: Arc<dyn Keyring>,
        faucet: Option<Arc<dyn FaucetService>>,
    ) -> ClientResult<Self> {
        let format = AddressFormat::new(config.address_prefix())?;
        let funder = faucet.map(|faucet| {
            let settings = config.faucet().cloned().unwrap_or_else(FaucetConfig::local);
            FaucetFunder::new(node.clone(), faucet, settings)
        });
        Ok(Self {
            config,
            chain_id: chain_id.into(),
            format,
            node,
            keyring,
            funder,
            factory: TxFactory::new(),
        })
    }

    /// Replaces the transaction parameters used for every quote.
    #[must_use]
    pub fn with_factory(mut self, factory: TxFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the chain id.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Returns the address format signers are encoded with.
    pub fn address_format(&self) -> &AddressFormat {
        &self.format
    }

    /// Returns the transaction parameters.
    pub fn factory(&self) -> &TxFactory {
        &self.factory
    }

    /// Returns the node.
    pub fn node(&self) -> &Arc<dyn LedgerNode> {
        &self.node
    }

    /// Returns the key store.
    pub fn keyring(&self) -> &Arc<dyn Keyring> {
        &self.keyring
    }

    /// Returns the funder, if funding is enabled.
    pub fn funder(&self) -> Option<&FaucetFunder> {
        self.funder.as_ref()
    }

    /// Looks up the key stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if no such key exists.
    pub async fn account(&self, name: &str) -> ClientResult<KeyInfo> {
        Ok(self.keyring.key(name).await?)
    }

    /// Returns the address of the key stored under `name`, encoded with
    /// this client's prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if no such key exists.
    pub async fn address(&self, name: &str) -> ClientResult<String> {
        let keyring = &self.keyring;
        let address = with_address_prefix(&self.format, |format| async move {
            keyring.address(name, &format).await
        })
        .await?;
        Ok(address)
    }

    /// Funds the signer if needed, resolves its account number and sequence
    /// and estimates gas for `messages`.
    ///
    /// # Errors
    ///
    /// - the key does not exist
    /// - funding fails
    /// - the account is unknown to the ledger
    /// - simulation fails
    pub async fn quote(&self, signer: &str, messages: Vec<Message>) -> ClientResult<Quote> {
        self.prepare(signer, messages, true).await
    }

    /// Like [`quote`](Self::quote), but does not look the account up.
    ///
    /// For accounts the ledger does not know yet; an account number or
    /// sequence the factory leaves unset is signed as zero.
    ///
    /// # Errors
    ///
    /// As [`quote`](Self::quote), except for unknown accounts.
    pub async fn quote_unresolved(
        &self,
        signer: &str,
        messages: Vec<Message>,
    ) -> ClientResult<Quote> {
        self.prepare(signer, messages, false).await
    }

    /// Quotes and commits in one step.
    ///
    /// # Errors
    ///
    /// See [`quote`](Self::quote) and [`Quote::commit`].
    pub async fn broadcast_tx(
        &self,
        signer: &str,
        messages: Vec<Message>,
    ) -> ClientResult<BroadcastResponse> {
        self.quote(signer, messages).await?.commit().await
    }

    /// Quotes without account lookup and commits in one step.
    ///
    /// # Errors
    ///
    /// See [`quote_unresolved`](Self::quote_unresolved) and
    /// [`Quote::commit`].
    pub async fn broadcast_tx_unresolved(
        &self,
        signer: &str,
        messages: Vec<Message>,
    ) -> ClientResult<BroadcastResponse> {
        self.quote_unresolved(signer, messages).await?.commit().await
    }

    async fn prepare(
        &self,
        signer: &str,
        messages: Vec<Message>,
        resolve: bool,
    ) -> ClientResult<Quote> {
        let key = self.keyring.key(signer).await?;

        // Funding waits on the faucet and must not hold the address lock.
        if let Some(funder) = &self.funder {
            let address = key.acc_address().to_bech32(&self.format)?;
            funder.ensure_funded(&address).await?;
        }

        let public_key = key.public_key.as_slice();
        let candidate = messages.as_slice();
        let (address, factory, estimate) = with_address_prefix(&self.format, |format| async move {
            let address = self.keyring.address(signer, &format).await?;
            let factory = if resolve {
                SequenceResolver::new(self.node.as_ref())
                    .resolve(&address, self.factory.clone())
                    .await?
            } else {
                self.factory.clone()
            };
            let estimate = GasEstimator::new(self.node.as_ref(), self.config.gas())
                .estimate(&self.chain_id, &factory, public_key, candidate)
                .await?;
            Ok::<_, ClientError>((address, factory, estimate))
        })
        .await?;

        debug!(
            signer,
            address = %address,
            gas = estimate.gas,
            "Quoted transaction"
        );

        Ok(Quote {
            signer: signer.to_string(),
            address,
            public_key: key.public_key,
            chain_id: self.chain_id.clone(),
            format: self.format.clone(),
            factory,
            messages,
            estimate,
            keyring: self.keyring.clone(),
            broadcaster: Broadcaster::new(self.node.clone())
                .with_timeout(self.config.broadcast_timeout()),
        })
    }
}
