//! Caller-controlled transaction parameters.

use crate::error::{ClientError, ClientResult};
use crate::proto::SignMode;
use crate::types::Coin;

/// How the gas limit of a transaction is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GasSetting {
    /// Simulate the transaction and pad the result.
    #[default]
    Auto,
    /// Declare this limit without simulating.
    Fixed(u64),
}

/// Parameters applied to every transaction a client builds.
///
/// `account_number` and `sequence` are `None` until resolved against the
/// ledger. Values set by the caller are used as given, including a zero
/// sequence for an account's first transaction.
///
/// ```rust,ignore
/// let factory = TxFactory::new()
///     .with_memo("payout")
///     .with_fees(vec![Coin::new(200, "stake")]);
/// let client = client.with_factory(factory);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TxFactory {
    /// Signer account number.
    pub account_number: Option<u64>,
    /// Signer sequence.
    pub sequence: Option<u64>,
    /// Gas limit policy.
    pub gas: GasSetting,
    /// Memo attached to the body.
    pub memo: String,
    /// Fee coins.
    pub fees: Vec<Coin>,
    /// Block height after which the transaction is invalid; zero disables it.
    pub timeout_height: u64,
    /// Signing mode.
    pub sign_mode: SignMode,
}

impl TxFactory {
    /// Creates a factory with nothing set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the account number.
    #[must_use]
    pub fn with_account_number(mut self, account_number: u64) -> Self {
        self.account_number = Some(account_number);
        self
    }

    /// Sets the sequence.
    #[must_use]
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Sets the gas policy.
    #[must_use]
    pub fn with_gas(mut self, gas: GasSetting) -> Self {
        self.gas = gas;
        self
    }

    /// Sets the memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Sets the fee coins.
    #[must_use]
    pub fn with_fees(mut self, fees: Vec<Coin>) -> Self {
        self.fees = fees;
        self
    }

    /// Sets the timeout height.
    #[must_use]
    pub fn with_timeout_height(mut self, timeout_height: u64) -> Self {
        self.timeout_height = timeout_height;
        self
    }

    /// Sets the sign mode.
    #[must_use]
    pub fn with_sign_mode(mut self, sign_mode: SignMode) -> Self {
        self.sign_mode = sign_mode;
        self
    }

    /// Returns true if both account number and sequence are set.
    pub fn is_resolved(&self) -> bool {
        self.account_number.is_some() && self.sequence.is_some()
    }

    /// Returns the mode signatures are produced in.
    ///
    /// # Errors
    ///
    /// Only direct signing is supported.
    pub fn resolved_sign_mode(&self) -> ClientResult<SignMode> {
        match self.sign_mode {
            SignMode::Unspecified | SignMode::Direct => Ok(SignMode::Direct),
            other => Err(ClientError::transaction(format!(
                "sign mode {} is not supported",
                other.as_str_name()
            ))),
        }
    }
}
