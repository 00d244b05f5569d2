//! Core Cosmos types.
//!
//! Addresses, their bech32 format, and coin amounts.

mod address;
mod coin;

pub use address::{AccAddress, AddressFormat, ADDRESS_LENGTH};
pub use coin::Coin;
