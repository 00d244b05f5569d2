//! # Cosmos client
//!
//! Builds, signs and broadcasts transactions on Cosmos SDK chains on behalf
//! of a named signer held in a local key store.
//!
//! A broadcast runs as a pipeline:
//!
//! 1. optionally top up the signer from a faucet ([`funding`])
//! 2. resolve the signer's account number and sequence
//! 3. simulate the transaction and pad the gas figure
//! 4. sign it and submit it, waiting for block inclusion ([`broadcast`])
//! 5. decode the first message's result
//!
//! Steps 1 to 3 produce a [`Quote`](transaction::Quote) the caller can
//! inspect before committing to step 4.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cosmos_client::{Client, ClientConfig};
//! use cosmos_client::proto::{MsgSend, MsgSendResponse};
//! use cosmos_client::transaction::Message;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::connect(ClientConfig::local()).await?;
//!
//!     let send = MsgSend { /* ... */ };
//!     let response = client
//!         .broadcast_tx("alice", vec![Message::from_msg(&send)])
//!         .await?;
//!     let _result: MsgSendResponse = response.decode()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`] - The pipeline entry point
//! - [`transaction`] - Account resolution, gas estimation, building and signing
//! - [`broadcast`] - Submission, outcome classification and result decoding
//! - [`funding`] - Faucet top-ups
//! - [`api`] - Node and faucet clients
//! - [`keyring`] - Key storage
//! - [`address_config`] - The process-wide address prefix and its lock
//! - [`types`] - Addresses and coins
//! - [`proto`] - Protobuf wire messages

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod address_config;
pub mod api;
pub mod broadcast;
pub mod client;
pub mod config;
pub mod error;
pub mod funding;
pub mod keyring;
pub mod proto;
pub mod retry;
pub mod transaction;
pub mod types;

// Re-export main entry points
pub use client::Client;
pub use config::{ClientConfig, FaucetConfig, GasConfig, KeyringBackend, KeyringConfig};
pub use error::{ClientError, ClientResult};

// Re-export commonly used types
pub use broadcast::BroadcastResponse;
pub use transaction::{Message, Quote, TxFactory};
pub use types::{AccAddress, AddressFormat, Coin};

#[cfg(test)]
mod tests;
