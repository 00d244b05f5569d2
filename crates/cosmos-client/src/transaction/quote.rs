//! Priced, unsigned transactions awaiting commitment.

use super::{GasEstimate, Message, TxBuilder, TxFactory};
use crate::address_config::with_address_prefix;
use crate::broadcast::{BroadcastResponse, Broadcaster};
use crate::error::{ClientError, ClientResult};
use crate::keyring::Keyring;
use crate::types::{AddressFormat, Coin};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A transaction whose signer and gas are settled but which is not yet
/// signed.
///
/// Inspect [`gas`](Self::gas) and [`fees`](Self::fees), then call
/// [`commit`](Self::commit) to sign and broadcast. `commit` consumes the
/// quote; a second submission needs a fresh quote so the sequence is
/// resolved again.
pub struct Quote {
    pub(crate) signer: String,
    pub(crate) address: String,
    pub(crate) public_key: Vec<u8>,
    pub(crate) chain_id: String,
    pub(crate) format: AddressFormat,
    pub(crate) factory: TxFactory,
    pub(crate) messages: Vec<Message>,
    pub(crate) estimate: GasEstimate,
    pub(crate) keyring: Arc<dyn Keyring>,
    pub(crate) broadcaster: Broadcaster,
}

impl std::fmt::Debug for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Quote")
            .field("signer", &self.signer)
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("factory", &self.factory)
            .field("messages", &self.messages.len())
            .field("estimate", &self.estimate)
            .finish_non_exhaustive()
    }
}

impl Quote {
    /// Returns the gas limit the transaction will declare.
    pub fn gas(&self) -> u64 {
        self.estimate.gas
    }

    /// Returns the raw simulation result, if the gas was simulated.
    pub fn simulated_gas(&self) -> Option<u64> {
        self.estimate.simulated
    }

    /// Returns the fee coins.
    pub fn fees(&self) -> &[Coin] {
        &self.factory.fees
    }

    /// Returns the signer's address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the signer account number.
    pub fn account_number(&self) -> u64 {
        self.factory.account_number.unwrap_or_default()
    }

    /// Returns the signer sequence.
    pub fn sequence(&self) -> u64 {
        self.factory.sequence.unwrap_or_default()
    }

    /// Signs and broadcasts the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails or the broadcast is not committed;
    /// see [`Broadcaster`] for how outcomes are classified.
    pub async fn commit(self) -> ClientResult<BroadcastResponse> {
        self.commit_with_cancel(CancellationToken::new()).await
    }

    /// Like [`commit`](Self::commit), but stops waiting when `cancel` fires.
    ///
    /// The token is observed while waiting for the address prefix lock,
    /// while signing and while waiting for inclusion.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Cancelled`] if `cancel` fired first.
    pub async fn commit_with_cancel(
        self,
        cancel: CancellationToken,
    ) -> ClientResult<BroadcastResponse> {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let Quote {
            signer,
            address,
            public_key,
            chain_id,
            format,
            factory,
            messages,
            estimate,
            keyring,
            broadcaster,
        } = self;

        // Dropping the signing future releases a pending or held prefix lock.
        let signing = with_address_prefix(&format, |_| async {
            let unsigned = TxBuilder::from_factory(&factory)
                .chain_id(chain_id)
                .account_number(factory.account_number.unwrap_or_default())
                .sequence(factory.sequence.unwrap_or_default())
                .gas_limit(estimate.gas)
                .public_key(public_key)
                .messages(messages)
                .build()?;
            let signed = unsigned.sign(keyring.as_ref(), &signer).await?;
            debug!(address = %address, tx_hash = %signed.hash(), "Broadcasting transaction");
            Ok::<_, ClientError>(signed.encode())
        });
        let tx_bytes = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ClientError::Cancelled),
            result = signing => result,
        }?;

        broadcaster.submit_with_cancel(&tx_bytes, &cancel).await
    }
}
