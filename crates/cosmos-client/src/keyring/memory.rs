use super::{check_sign_mode, validate_key_name, KeyInfo, Keyring, KeyringError, Secp256k1PrivateKey};
use crate::proto::SignMode;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// An in-memory key store. Keys are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryKeyring {
    keys: RwLock<HashMap<String, Secp256k1PrivateKey>>,
}

impl MemoryKeyring {
    /// Creates an empty key store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `key` under `name`.
    pub async fn insert(
        &self,
        name: &str,
        key: Secp256k1PrivateKey,
    ) -> Result<KeyInfo, KeyringError> {
        validate_key_name(name)?;
        let mut keys = self.keys.write().await;
        if keys.contains_key(name) {
            return Err(KeyringError::KeyExists(name.to_string()));
        }
        let info = KeyInfo {
            name: name.to_string(),
            public_key: key.public_key(),
        };
        keys.insert(name.to_string(), key);
        Ok(info)
    }

    /// Generates and stores a new key.
    pub async fn generate(&self, name: &str) -> Result<KeyInfo, KeyringError> {
        self.insert(name, Secp256k1PrivateKey::generate()).await
    }
}

#[async_trait]
impl Keyring for MemoryKeyring {
    async fn key(&self, name: &str) -> Result<KeyInfo, KeyringError> {
        let keys = self.keys.read().await;
        let key = keys
            .get(name)
            .ok_or_else(|| KeyringError::KeyNotFound(name.to_string()))?;
        Ok(KeyInfo {
            name: name.to_string(),
            public_key: key.public_key(),
        })
    }

    async fn sign(
        &self,
        name: &str,
        payload: &[u8],
        mode: SignMode,
    ) -> Result<Vec<u8>, KeyringError> {
        check_sign_mode(mode)?;
        let keys = self.keys.read().await;
        let key = keys
            .get(name)
            .ok_or_else(|| KeyringError::KeyNotFound(name.to_string()))?;
        Ok(key.sign(payload))
    }
}
