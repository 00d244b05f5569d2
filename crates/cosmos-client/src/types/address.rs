//! Account addresses and their bech32 text format.
//!
//! A Cosmos account address is the 20-byte `ripemd160(sha256(pubkey))` of a
//! compressed secp256k1 public key, displayed as bech32 with a per-network
//! human-readable prefix.

use crate::error::{ClientError, ClientResult};
use bech32::{Bech32, Hrp};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;

/// The length of an account address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// The bech32 prefixes used to render addresses on one network.
///
/// # Example
///
/// ```rust
/// use cosmos_client::types::AddressFormat;
///
/// let format = AddressFormat::new("osmo").unwrap();
/// assert_eq!(format.account_prefix(), "osmo");
/// assert_eq!(format.pubkey_prefix(), "osmopub");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AddressFormat {
    account_prefix: String,
}

impl AddressFormat {
    /// Creates a format for the given account prefix.
    pub fn new(account_prefix: impl Into<String>) -> ClientResult<Self> {
        let account_prefix = account_prefix.into();
        Hrp::parse(&account_prefix).map_err(|e| {
            ClientError::Config(format!("invalid address prefix {account_prefix:?}: {e}"))
        })?;
        Ok(Self { account_prefix })
    }

    /// Returns the account address prefix.
    pub fn account_prefix(&self) -> &str {
        &self.account_prefix
    }

    /// Returns the account public key prefix.
    pub fn pubkey_prefix(&self) -> String {
        format!("{}pub", self.account_prefix)
    }

    fn hrp(&self) -> ClientResult<Hrp> {
        Hrp::parse(&self.account_prefix)
            .map_err(|e| ClientError::Config(format!("invalid address prefix: {e}")))
    }
}

impl Default for AddressFormat {
    fn default() -> Self {
        Self {
            account_prefix: crate::config::DEFAULT_ADDRESS_PREFIX.to_string(),
        }
    }
}

impl fmt::Debug for AddressFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AddressFormat({})", self.account_prefix)
    }
}

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AccAddress([u8; ADDRESS_LENGTH]);

impl AccAddress {
    /// Creates an address from raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derives the address of a public key: `ripemd160(sha256(pubkey))`.
    pub fn from_pubkey(pubkey: &[u8]) -> Self {
        let sha = Sha256::digest(pubkey);
        let digest = Ripemd160::digest(sha);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Encodes the address as bech32 under `format`.
    pub fn to_bech32(&self, format: &AddressFormat) -> ClientResult<String> {
        bech32::encode::<Bech32>(format.hrp()?, &self.0)
            .map_err(|e| ClientError::Config(format!("bech32 encoding failed: {e}")))
    }

    /// Parses a bech32 address, returning its prefix and bytes.
    pub fn from_bech32(s: &str) -> ClientResult<(String, Self)> {
        let (hrp, data) = bech32::decode(s)
            .map_err(|e| ClientError::Config(format!("invalid bech32 address {s:?}: {e}")))?;
        let bytes: [u8; ADDRESS_LENGTH] = data.as_slice().try_into().map_err(|_| {
            ClientError::Config(format!(
                "invalid address length: expected {ADDRESS_LENGTH} bytes, got {}",
                data.len()
            ))
        })?;
        Ok((hrp.to_string(), Self(bytes)))
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccAddress({})", hex::encode_upper(self.0))
    }
}
