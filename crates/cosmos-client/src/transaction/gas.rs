//! Gas estimation by simulation.

use super::{GasSetting, Message, TxBuilder, TxFactory};
use crate::api::LedgerNode;
use crate::config::GasConfig;
use crate::error::ClientResult;
use tracing::debug;

/// Gas figure for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
    /// Gas limit the transaction will declare.
    pub gas: u64,
    /// Raw simulation result; `None` for a fixed limit.
    pub simulated: Option<u64>,
}

/// Estimates gas by simulating the candidate transaction.
#[derive(Clone, Copy)]
pub struct GasEstimator<'a> {
    node: &'a dyn LedgerNode,
    config: &'a GasConfig,
}

impl std::fmt::Debug for GasEstimator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GasEstimator")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> GasEstimator<'a> {
    /// Creates an estimator simulating against `node`.
    pub fn new(node: &'a dyn LedgerNode, config: &'a GasConfig) -> Self {
        Self { node, config }
    }

    /// Returns the gas limit to declare for `messages` signed by the holder
    /// of `public_key`.
    ///
    /// With [`GasSetting::Fixed`] the fixed limit is returned as is. With
    /// [`GasSetting::Auto`] the transaction is simulated with the factory's
    /// signer fields and an empty signature, and the result is padded with
    /// [`GasConfig::pad`]. Unset signer fields are simulated as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidate transaction cannot be built or the
    /// simulation fails.
    pub async fn estimate(
        &self,
        chain_id: &str,
        factory: &TxFactory,
        public_key: &[u8],
        messages: &[Message],
    ) -> ClientResult<GasEstimate> {
        if let GasSetting::Fixed(gas) = factory.gas {
            return Ok(GasEstimate {
                gas,
                simulated: None,
            });
        }

        let candidate = TxBuilder::from_factory(factory)
            .chain_id(chain_id)
            .account_number(factory.account_number.unwrap_or_default())
            .sequence(factory.sequence.unwrap_or_default())
            .gas_limit(self.config.gas_limit)
            .public_key(public_key.to_vec())
            .messages(messages.iter().cloned())
            .build()?;

        let simulated = self.node.simulate(&candidate.simulation_bytes()).await?;
        let gas = self.config.pad(simulated);
        debug!(simulated, gas, "Estimated gas");
        Ok(GasEstimate {
            gas,
            simulated: Some(simulated),
        })
    }
}
