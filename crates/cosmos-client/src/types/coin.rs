//! Coin amounts.

use crate::error::ClientError;
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

/// An amount of one denomination, e.g. `100token`.
///
/// ```rust
/// use cosmos_client::types::Coin;
///
/// let coin: Coin = "250uatom".parse().unwrap();
/// assert_eq!(coin.amount, 250);
/// assert_eq!(coin.denom, "uatom");
/// assert_eq!(coin.to_string(), "250uatom");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coin {
    /// Denomination.
    pub denom: String,
    /// Amount in base units.
    pub amount: u128,
}

impl Coin {
    /// Creates a coin.
    pub fn new(amount: u128, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ClientError::Config(format!("coin {s:?} has no denom")))?;
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() {
            return Err(ClientError::Config(format!("coin {s:?} has no amount")));
        }
        let amount = amount
            .parse()
            .map_err(|e| ClientError::Config(format!("invalid coin amount in {s:?}: {e}")))?;
        Ok(Self::new(amount, denom))
    }
}

impl TryFrom<crate::proto::Coin> for Coin {
    type Error = ClientError;

    fn try_from(coin: crate::proto::Coin) -> Result<Self, Self::Error> {
        let amount = coin.amount.parse().map_err(|e| {
            ClientError::decode(format!(
                "invalid amount {:?} for {}: {e}",
                coin.amount, coin.denom
            ))
        })?;
        Ok(Self {
            denom: coin.denom,
            amount,
        })
    }
}

impl Coin {
    /// Converts a wire coin, clamping amounts above `u128::MAX`.
    ///
    /// Chain amounts are 256-bit integers; larger values read as `u128::MAX`.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not a non-negative integer.
    pub fn saturating_from_proto(coin: crate::proto::Coin) -> Result<Self, ClientError> {
        match coin.amount.parse::<u128>() {
            Ok(amount) => Ok(Self::new(amount, coin.denom)),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
                Ok(Self::new(u128::MAX, coin.denom))
            }
            Err(_) => Self::try_from(coin),
        }
    }
}

impl From<&Coin> for crate::proto::Coin {
    fn from(coin: &Coin) -> Self {
        Self {
            denom: coin.denom.clone(),
            amount: coin.amount.to_string(),
        }
    }
}
