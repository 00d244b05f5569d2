//! Secp256k1 signing keys.

use super::KeyringError;
use k256::ecdsa::signature::Signer;
use k256::ecdsa::{Signature, SigningKey};
use std::fmt;
use zeroize::Zeroizing;

/// Secp256k1 private key length in bytes.
pub const SECP256K1_PRIVATE_KEY_LENGTH: usize = 32;
/// Compressed secp256k1 public key length in bytes.
pub const SECP256K1_PUBLIC_KEY_LENGTH: usize = 33;
/// Length of a compact `r || s` signature.
pub const SECP256K1_SIGNATURE_LENGTH: usize = 64;

/// A secp256k1 private key.
///
/// The inner key is zeroized on drop by `k256`.
#[derive(Clone)]
pub struct Secp256k1PrivateKey {
    inner: SigningKey,
}

impl Secp256k1PrivateKey {
    /// Generates a new random key.
    pub fn generate() -> Self {
        Self {
            inner: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// Creates a key from its 32 raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyringError> {
        if bytes.len() != SECP256K1_PRIVATE_KEY_LENGTH {
            return Err(KeyringError::InvalidKey(format!(
                "expected {SECP256K1_PRIVATE_KEY_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        let inner =
            SigningKey::from_slice(bytes).map_err(|e| KeyringError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Creates a key from a hex string, with or without `0x`.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyringError> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = Zeroizing::new(
            hex::decode(hex_str).map_err(|e| KeyringError::InvalidKey(e.to_string()))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Returns the key as lowercase hex.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.inner.to_bytes()))
    }

    /// Returns the compressed SEC1 public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.inner
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    /// Signs `sha256(message)` and returns the 64-byte `r || s` signature.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signature: Signature = self.inner.sign(message);
        signature.to_bytes().to_vec()
    }
}

impl fmt::Debug for Secp256k1PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secp256k1PrivateKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::signature::Verifier;
    use k256::ecdsa::VerifyingKey;

    #[test]
    fn test_generate_and_sign() {
        let key = Secp256k1PrivateKey::generate();
        let public = key.public_key();
        assert_eq!(public.len(), SECP256K1_PUBLIC_KEY_LENGTH);

        let signature = key.sign(b"sign doc bytes");
        assert_eq!(signature.len(), SECP256K1_SIGNATURE_LENGTH);

        let verifying = VerifyingKey::from_sec1_bytes(&public).unwrap();
        let signature = Signature::from_slice(&signature).unwrap();
        assert!(verifying.verify(b"sign doc bytes", &signature).is_ok());
        assert!(verifying.verify(b"other bytes", &signature).is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let key = Secp256k1PrivateKey::generate();
        let restored = Secp256k1PrivateKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key.public_key(), restored.public_key());
    }

    #[test]
    fn test_known_public_key() {
        let key = Secp256k1PrivateKey::from_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(
            hex::encode(key.public_key()),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
    }

    #[test]
    fn test_invalid_keys_rejected() {
        assert!(Secp256k1PrivateKey::from_bytes(&[1u8; 31]).is_err());
        assert!(Secp256k1PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(Secp256k1PrivateKey::from_hex("zz").is_err());
    }

    #[test]
    fn test_debug_redacts() {
        let key = Secp256k1PrivateKey::generate();
        assert_eq!(format!("{key:?}"), "Secp256k1PrivateKey([REDACTED])");
    }
}
