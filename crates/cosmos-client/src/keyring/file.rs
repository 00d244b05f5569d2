use super::{check_sign_mode, validate_key_name, KeyInfo, Keyring, KeyringError, Secp256k1PrivateKey};
use crate::proto::SignMode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::Zeroizing;

const KEY_TYPE: &str = "secp256k1";

/// The unencrypted `test` keyring backend.
///
/// Each key is a JSON file `<home>/keyring-test/<name>.info` holding the
/// hex-encoded private and public keys. Suitable for local chains and
/// tests only.
#[derive(Debug, Clone)]
pub struct FileKeyring {
    dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct StoredKey {
    name: String,
    #[serde(rename = "type")]
    key_type: String,
    pubkey: String,
    privkey: String,
}

impl FileKeyring {
    /// Opens (creating if needed) the key directory under `home`.
    pub fn open(home: impl AsRef<Path>) -> Result<Self, KeyringError> {
        let dir = home.as_ref().join("keyring-test");
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Returns the directory keys are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.info"))
    }

    /// Stores `key` under `name`. Fails if the name is taken.
    pub async fn insert(
        &self,
        name: &str,
        key: &Secp256k1PrivateKey,
    ) -> Result<KeyInfo, KeyringError> {
        validate_key_name(name)?;
        let path = self.path(name);
        if tokio::fs::try_exists(&path).await? {
            return Err(KeyringError::KeyExists(name.to_string()));
        }

        let public_key = key.public_key();
        let stored = StoredKey {
            name: name.to_string(),
            key_type: KEY_TYPE.to_string(),
            pubkey: hex::encode(&public_key),
            privkey: key.to_hex().to_string(),
        };
        let contents = Zeroizing::new(serde_json::to_vec_pretty(&stored)?);
        tokio::fs::write(&path, contents.as_slice()).await?;
        debug!(name, path = %path.display(), "Stored key");

        Ok(KeyInfo {
            name: name.to_string(),
            public_key,
        })
    }

    /// Generates and stores a new key.
    pub async fn generate(&self, name: &str) -> Result<KeyInfo, KeyringError> {
        self.insert(name, &Secp256k1PrivateKey::generate()).await
    }

    /// Imports a hex-encoded private key.
    pub async fn import_hex(&self, name: &str, hex_key: &str) -> Result<KeyInfo, KeyringError> {
        let key = Secp256k1PrivateKey::from_hex(hex_key)?;
        self.insert(name, &key).await
    }

    async fn load(&self, name: &str) -> Result<StoredKey, KeyringError> {
        validate_key_name(name)?;
        let contents = match tokio::fs::read(self.path(name)).await {
            Ok(contents) => Zeroizing::new(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(KeyringError::KeyNotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let stored: StoredKey = serde_json::from_slice(&contents)?;
        if stored.key_type != KEY_TYPE {
            return Err(KeyringError::InvalidKey(format!(
                "key {name} has unsupported type {}",
                stored.key_type
            )));
        }
        Ok(stored)
    }
}

#[async_trait]
impl Keyring for FileKeyring {
    async fn key(&self, name: &str) -> Result<KeyInfo, KeyringError> {
        let stored = self.load(name).await?;
        let public_key =
            hex::decode(&stored.pubkey).map_err(|e| KeyringError::InvalidKey(e.to_string()))?;
        Ok(KeyInfo {
            name: stored.name,
            public_key,
        })
    }

    async fn sign(
        &self,
        name: &str,
        payload: &[u8],
        mode: SignMode,
    ) -> Result<Vec<u8>, KeyringError> {
        check_sign_mode(mode)?;
        let stored = self.load(name).await?;
        let privkey = Zeroizing::new(stored.privkey);
        let key = Secp256k1PrivateKey::from_hex(&privkey)?;
        Ok(key.sign(payload))
    }
}
