//! Transaction assembly and signing.

use super::{Message, TxFactory};
use crate::error::{ClientError, ClientResult};
use crate::keyring::Keyring;
use crate::proto::{
    Any, AuthInfo, Fee, ModeInfo, Secp256k1PubKey, SignDoc, SignMode, SignerInfo, TxBody, TxRaw,
};
use crate::types::Coin;
use prost::Message as _;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Builder for single-signer transactions.
///
/// # Example
///
/// ```rust,ignore
/// let unsigned = TxBuilder::new()
///     .chain_id("localnet")
///     .account_number(7)
///     .sequence(3)
///     .gas_limit(200_000)
///     .public_key(key.public_key)
///     .message(Message::from_msg(&send))
///     .build()?;
/// let signed = unsigned.sign(keyring.as_ref(), "alice").await?;
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct TxBuilder {
    chain_id: Option<String>,
    account_number: Option<u64>,
    sequence: Option<u64>,
    gas_limit: Option<u64>,
    public_key: Option<Vec<u8>>,
    messages: Vec<Message>,
    fees: Vec<Coin>,
    memo: String,
    timeout_height: u64,
    sign_mode: SignMode,
}

impl TxBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies memo, fees, timeout, sign mode and any resolved signer
    /// fields from `factory`.
    pub fn from_factory(factory: &TxFactory) -> Self {
        Self {
            account_number: factory.account_number,
            sequence: factory.sequence,
            fees: factory.fees.clone(),
            memo: factory.memo.clone(),
            timeout_height: factory.timeout_height,
            sign_mode: factory.sign_mode,
            ..Self::default()
        }
    }

    /// Sets the chain id.
    pub fn chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    /// Sets the signer account number.
    pub fn account_number(mut self, account_number: u64) -> Self {
        self.account_number = Some(account_number);
        self
    }

    /// Sets the signer sequence.
    pub fn sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Sets the declared gas limit.
    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Sets the signer's compressed secp256k1 public key.
    pub fn public_key(mut self, public_key: Vec<u8>) -> Self {
        self.public_key = Some(public_key);
        self
    }

    /// Appends a message.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Appends messages.
    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Sets the fee coins.
    pub fn fees(mut self, fees: Vec<Coin>) -> Self {
        self.fees = fees;
        self
    }

    /// Sets the memo.
    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Sets the timeout height.
    pub fn timeout_height(mut self, timeout_height: u64) -> Self {
        self.timeout_height = timeout_height;
        self
    }

    /// Sets the sign mode.
    pub fn sign_mode(mut self, sign_mode: SignMode) -> Self {
        self.sign_mode = sign_mode;
        self
    }

    /// Builds the unsigned transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any of these is missing:
    /// - `chain_id`
    /// - `account_number`
    /// - `sequence`
    /// - `gas_limit`
    /// - `public_key`
    /// - at least one message
    ///
    /// or if the sign mode is not direct.
    pub fn build(self) -> ClientResult<UnsignedTx> {
        let chain_id = self
            .chain_id
            .ok_or_else(|| ClientError::transaction("chain_id is required"))?;
        let account_number = self
            .account_number
            .ok_or_else(|| ClientError::transaction("account_number is required"))?;
        let sequence = self
            .sequence
            .ok_or_else(|| ClientError::transaction("sequence is required"))?;
        let gas_limit = self
            .gas_limit
            .ok_or_else(|| ClientError::transaction("gas_limit is required"))?;
        let public_key = self
            .public_key
            .ok_or_else(|| ClientError::transaction("public_key is required"))?;
        if self.messages.is_empty() {
            return Err(ClientError::transaction(
                "a transaction needs at least one message",
            ));
        }
        let sign_mode = TxFactory::new()
            .with_sign_mode(self.sign_mode)
            .resolved_sign_mode()?;

        let body = TxBody {
            messages: self.messages.iter().map(Message::to_any).collect(),
            memo: self.memo,
            timeout_height: self.timeout_height,
        };
        let auth_info = AuthInfo {
            signer_infos: vec![SignerInfo {
                public_key: Some(Any::pack(&Secp256k1PubKey { key: public_key })),
                mode_info: Some(ModeInfo::single(sign_mode)),
                sequence,
            }],
            fee: Some(Fee {
                amount: self.fees.iter().map(Into::into).collect(),
                gas_limit,
                payer: String::new(),
                granter: String::new(),
            }),
        };

        Ok(UnsignedTx {
            body_bytes: body.encode_to_vec(),
            auth_info_bytes: auth_info.encode_to_vec(),
            chain_id,
            account_number,
            sequence,
            gas_limit,
            sign_mode,
        })
    }
}

/// A fully assembled transaction awaiting its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    body_bytes: Vec<u8>,
    auth_info_bytes: Vec<u8>,
    chain_id: String,
    account_number: u64,
    sequence: u64,
    gas_limit: u64,
    sign_mode: SignMode,
}

impl UnsignedTx {
    /// Returns the declared gas limit.
    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Returns the signer sequence.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the signer account number.
    pub fn account_number(&self) -> u64 {
        self.account_number
    }

    /// Returns the serialized `SignDoc` the signer signs.
    pub fn sign_doc_bytes(&self) -> Vec<u8> {
        SignDoc {
            body_bytes: self.body_bytes.clone(),
            auth_info_bytes: self.auth_info_bytes.clone(),
            chain_id: self.chain_id.clone(),
            account_number: self.account_number,
        }
        .encode_to_vec()
    }

    /// Encodes the transaction with an empty signature, as simulation
    /// expects.
    pub fn simulation_bytes(&self) -> Vec<u8> {
        TxRaw {
            body_bytes: self.body_bytes.clone(),
            auth_info_bytes: self.auth_info_bytes.clone(),
            signatures: vec![Vec::new()],
        }
        .encode_to_vec()
    }

    /// Signs the transaction with the key stored under `signer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key store cannot sign with that key.
    pub async fn sign(self, keyring: &dyn Keyring, signer: &str) -> ClientResult<SignedTx> {
        let signature = keyring
            .sign(signer, &self.sign_doc_bytes(), self.sign_mode)
            .await?;
        debug!(
            signer,
            account_number = self.account_number,
            sequence = self.sequence,
            gas_limit = self.gas_limit,
            "Signed transaction"
        );
        Ok(SignedTx {
            raw: TxRaw {
                body_bytes: self.body_bytes,
                auth_info_bytes: self.auth_info_bytes,
                signatures: vec![signature],
            },
        })
    }
}

/// A signed transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTx {
    raw: TxRaw,
}

impl SignedTx {
    /// Encodes the transaction for broadcast.
    pub fn encode(&self) -> Vec<u8> {
        self.raw.encode_to_vec()
    }

    /// Returns the wire form.
    pub fn raw(&self) -> &TxRaw {
        &self.raw
    }

    /// Returns the transaction hash as nodes report it: upper-case hex of
    /// the SHA-256 of the encoded bytes.
    pub fn hash(&self) -> String {
        hex::encode_upper(Sha256::digest(self.encode()))
    }
}
