//! Client configuration.
//!
//! [`ClientConfig`] describes the node to talk to, the address prefix used
//! to derive signer addresses, and the optional faucet, keyring and gas
//! settings. All types are plain values with `with_*` builder methods.

use crate::error::{ClientError, ClientResult};
use crate::retry::RetryConfig;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Default CometBFT RPC endpoint of a local node.
pub const DEFAULT_NODE_URL: &str = "http://localhost:26657";
/// Default faucet endpoint of a local chain.
pub const DEFAULT_FAUCET_URL: &str = "http://localhost:4500";
/// Default bech32 account prefix.
pub const DEFAULT_ADDRESS_PREFIX: &str = "cosmos";
/// Default denom requested from the faucet.
pub const DEFAULT_FAUCET_DENOM: &str = "token";
/// Default minimum balance the faucet funder waits for.
pub const DEFAULT_FAUCET_MIN_AMOUNT: u128 = 100;
/// Default keyring service name for the `os` backend.
pub const DEFAULT_KEYRING_SERVICE: &str = "cosmos";

/// Configuration for the Cosmos client.
///
/// # Example
///
/// ```rust
/// use cosmos_client::config::{ClientConfig, FaucetConfig};
/// use std::time::Duration;
///
/// let config = ClientConfig::local()
///     .with_address_prefix("osmo")
///     .with_timeout(Duration::from_secs(10))
///     .with_faucet(FaucetConfig::local());
/// assert_eq!(config.address_prefix(), "osmo");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) node_url: Url,
    pub(crate) address_prefix: String,
    pub(crate) timeout: Duration,
    pub(crate) retry_config: RetryConfig,
    pub(crate) faucet: Option<FaucetConfig>,
    pub(crate) keyring: KeyringConfig,
    pub(crate) gas: GasConfig,
    pub(crate) broadcast_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::local()
    }
}

impl ClientConfig {
    /// Creates a configuration for a node running on the local machine.
    pub fn local() -> Self {
        Self {
            node_url: default_url(DEFAULT_NODE_URL),
            address_prefix: DEFAULT_ADDRESS_PREFIX.to_string(),
            timeout: Duration::from_secs(60),
            retry_config: RetryConfig::default(),
            faucet: None,
            keyring: KeyringConfig::default(),
            gas: GasConfig::default(),
            broadcast_timeout: None,
        }
    }

    /// Creates a configuration for the node at `node_url`.
    pub fn custom(node_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            node_url: Url::parse(node_url)?,
            ..Self::local()
        })
    }

    /// Sets the bech32 account prefix used to derive signer addresses.
    #[must_use]
    pub fn with_address_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.address_prefix = prefix.into();
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry configuration for idempotent queries.
    #[must_use]
    pub fn with_retry(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Disables automatic retry of node queries.
    #[must_use]
    pub fn without_retry(mut self) -> Self {
        self.retry_config = RetryConfig::no_retry();
        self
    }

    /// Enables auto-funding through the given faucet.
    #[must_use]
    pub fn with_faucet(mut self, faucet: FaucetConfig) -> Self {
        self.faucet = Some(faucet);
        self
    }

    /// Sets the keyring configuration.
    #[must_use]
    pub fn with_keyring(mut self, keyring: KeyringConfig) -> Self {
        self.keyring = keyring;
        self
    }

    /// Sets the gas configuration.
    #[must_use]
    pub fn with_gas(mut self, gas: GasConfig) -> Self {
        self.gas = gas;
        self
    }

    /// Bounds how long a broadcast may wait for block inclusion.
    #[must_use]
    pub fn with_broadcast_timeout(mut self, timeout: Duration) -> Self {
        self.broadcast_timeout = Some(timeout);
        self
    }

    /// Returns the node RPC URL.
    pub fn node_url(&self) -> &Url {
        &self.node_url
    }

    /// Returns the account address prefix.
    pub fn address_prefix(&self) -> &str {
        &self.address_prefix
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Returns the faucet configuration, if auto-funding is enabled.
    pub fn faucet(&self) -> Option<&FaucetConfig> {
        self.faucet.as_ref()
    }

    /// Returns the keyring configuration.
    pub fn keyring(&self) -> &KeyringConfig {
        &self.keyring
    }

    /// Returns the gas configuration.
    pub fn gas(&self) -> &GasConfig {
        &self.gas
    }

    /// Returns the broadcast timeout, if any.
    pub fn broadcast_timeout(&self) -> Option<Duration> {
        self.broadcast_timeout
    }
}

/// Faucet settings used by the pre-flight funder.
#[derive(Debug, Clone)]
pub struct FaucetConfig {
    pub(crate) url: Url,
    pub(crate) denom: String,
    pub(crate) min_amount: u128,
    pub(crate) poll_interval: Duration,
    pub(crate) deadline: Duration,
}

impl FaucetConfig {
    /// Creates a faucet configuration for the service at `url`.
    pub fn new(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(url)?,
            denom: DEFAULT_FAUCET_DENOM.to_string(),
            min_amount: DEFAULT_FAUCET_MIN_AMOUNT,
            poll_interval: Duration::from_secs(1),
            deadline: Duration::from_secs(120),
        })
    }

    /// Creates a configuration for the faucet of a local chain.
    pub fn local() -> Self {
        Self {
            url: default_url(DEFAULT_FAUCET_URL),
            denom: DEFAULT_FAUCET_DENOM.to_string(),
            min_amount: DEFAULT_FAUCET_MIN_AMOUNT,
            poll_interval: Duration::from_secs(1),
            deadline: Duration::from_secs(120),
        }
    }

    /// Sets the denom to request. An empty denom keeps the current one.
    #[must_use]
    pub fn with_denom(mut self, denom: impl Into<String>) -> Self {
        let denom = denom.into();
        if !denom.is_empty() {
            self.denom = denom;
        }
        self
    }

    /// Sets the minimum balance to wait for. Zero keeps the current value.
    #[must_use]
    pub fn with_min_amount(mut self, amount: u128) -> Self {
        if amount != 0 {
            self.min_amount = amount;
        }
        self
    }

    /// Sets how often the balance is re-checked after a funding request.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets how long to wait for funds before giving up.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Returns the faucet URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the requested denom.
    pub fn denom(&self) -> &str {
        &self.denom
    }

    /// Returns the minimum balance.
    pub fn min_amount(&self) -> u128 {
        self.min_amount
    }

    /// Returns the poll interval.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the funding deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// Gas settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GasConfig {
    /// Gas limit declared by the candidate transaction during simulation.
    pub gas_limit: u64,
    /// Multiplier applied to the simulated gas.
    pub gas_adjustment: f64,
    /// Units added to the adjusted simulation result.
    pub margin: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            gas_limit: 300_000,
            gas_adjustment: 1.0,
            margin: 10_000,
        }
    }
}

impl GasConfig {
    /// Applies adjustment and margin to a simulated gas figure.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn pad(&self, simulated: u64) -> u64 {
        let adjusted = (simulated as f64 * self.gas_adjustment) as u64;
        adjusted.saturating_add(self.margin)
    }
}

/// Where signing keys are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyringBackend {
    /// Unencrypted key files under `<home>/keyring-test`.
    #[default]
    Test,
    /// Passphrase-encrypted key files.
    File,
    /// The operating system's credential store.
    Os,
}

impl KeyringBackend {
    /// Returns the backend name.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyringBackend::Test => "test",
            KeyringBackend::File => "file",
            KeyringBackend::Os => "os",
        }
    }
}

impl FromStr for KeyringBackend {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(KeyringBackend::Test),
            "file" => Ok(KeyringBackend::File),
            "os" => Ok(KeyringBackend::Os),
            other => Err(ClientError::Config(format!(
                "unknown keyring backend: {other}"
            ))),
        }
    }
}

/// Keyring settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyringConfig {
    pub(crate) backend: KeyringBackend,
    pub(crate) service_name: String,
    pub(crate) home: Option<PathBuf>,
}

impl Default for KeyringConfig {
    fn default() -> Self {
        Self {
            backend: KeyringBackend::Test,
            service_name: DEFAULT_KEYRING_SERVICE.to_string(),
            home: None,
        }
    }
}

impl KeyringConfig {
    /// Sets the storage backend.
    #[must_use]
    pub fn with_backend(mut self, backend: KeyringBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the keyring service name.
    ///
    /// Only the `os` backend reads it, as the name its entries are stored
    /// under in the platform credential store. That backend is not
    /// supported yet, so [`keyring::open`](crate::keyring::open) reports the
    /// name in its error.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Sets the keyring home directory.
    #[must_use]
    pub fn with_home(mut self, home: impl AsRef<Path>) -> Self {
        self.home = Some(home.as_ref().to_path_buf());
        self
    }

    /// Returns the storage backend.
    pub fn backend(&self) -> KeyringBackend {
        self.backend
    }

    /// Returns the service name used by the `os` backend.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the keyring home, defaulting to `$HOME/.<chain-id>`.
    pub fn home_for(&self, chain_id: &str) -> ClientResult<PathBuf> {
        if let Some(home) = &self.home {
            return Ok(home.clone());
        }
        dirs::home_dir()
            .map(|dir| dir.join(format!(".{chain_id}")))
            .ok_or_else(|| ClientError::Config("cannot determine home directory".to_string()))
    }
}

fn default_url(url: &str) -> Url {
    Url::parse(url).expect("valid default URL")
}
