//! Key storage.
//!
//! The pipeline never touches key material directly. It asks a [`Keyring`]
//! for the signer's public key and address and hands it the bytes to sign.
//! Two stores are provided: [`MemoryKeyring`] for tests and ephemeral keys,
//! and [`FileKeyring`], the unencrypted `test` backend on disk.

mod file;
mod memory;
mod secp256k1;

pub use file::FileKeyring;
pub use memory::MemoryKeyring;
pub use secp256k1::{
    Secp256k1PrivateKey, SECP256K1_PRIVATE_KEY_LENGTH, SECP256K1_PUBLIC_KEY_LENGTH,
    SECP256K1_SIGNATURE_LENGTH,
};

use crate::config::{KeyringBackend, KeyringConfig};
use crate::error::{ClientError, ClientResult};
use crate::proto::SignMode;
use crate::types::{AccAddress, AddressFormat};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by key stores.
#[derive(Error, Debug)]
pub enum KeyringError {
    /// No key is stored under this name
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A key is already stored under this name
    #[error("key already exists: {0}")]
    KeyExists(String),

    /// The key name or key bytes are invalid
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The store cannot produce signatures in this mode
    #[error("unsupported sign mode: {0:?}")]
    UnsupportedSignMode(SignMode),

    /// Storage failure
    #[error("keyring I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Corrupt key file
    #[error("malformed key file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Public information about a stored key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyInfo {
    /// Key name
    pub name: String,
    /// Compressed secp256k1 public key
    pub public_key: Vec<u8>,
}

impl KeyInfo {
    /// Returns the account address derived from the public key.
    pub fn acc_address(&self) -> AccAddress {
        AccAddress::from_pubkey(&self.public_key)
    }
}

/// A store of named signing keys.
#[async_trait]
pub trait Keyring: Send + Sync + 'static {
    /// Looks up a key by name.
    async fn key(&self, name: &str) -> Result<KeyInfo, KeyringError>;

    /// Returns the bech32 address of a key under `format`.
    async fn address(&self, name: &str, format: &AddressFormat) -> Result<String, KeyringError> {
        let info = self.key(name).await?;
        info.acc_address()
            .to_bech32(format)
            .map_err(|e| KeyringError::InvalidKey(e.to_string()))
    }

    /// Signs `payload` with the named key.
    async fn sign(&self, name: &str, payload: &[u8], mode: SignMode)
        -> Result<Vec<u8>, KeyringError>;
}

/// Opens the key store described by `config` for the chain `chain_id`.
pub fn open(config: &KeyringConfig, chain_id: &str) -> ClientResult<Arc<dyn Keyring>> {
    match config.backend() {
        KeyringBackend::Test => {
            let home = config.home_for(chain_id)?;
            Ok(Arc::new(FileKeyring::open(home)?))
        }
        KeyringBackend::Os => Err(ClientError::Config(format!(
            "keyring backend \"os\" (service {:?}) is not supported; use \"test\"",
            config.service_name()
        ))),
        backend => Err(ClientError::Config(format!(
            "keyring backend {:?} is not supported; use \"test\"",
            backend.as_str()
        ))),
    }
}

pub(crate) fn validate_key_name(name: &str) -> Result<(), KeyringError> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control)
    {
        return Err(KeyringError::InvalidKey(format!("invalid key name {name:?}")));
    }
    Ok(())
}

fn check_sign_mode(mode: SignMode) -> Result<(), KeyringError> {
    match mode {
        SignMode::Direct | SignMode::Unspecified => Ok(()),
        other => Err(KeyringError::UnsupportedSignMode(other)),
    }
}
