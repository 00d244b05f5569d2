//! Transaction building and signing.
//!
//! A transaction goes through these steps, each usable on its own:
//!
//! 1. [`SequenceResolver`] fills the signer's account number and sequence
//!    into a [`TxFactory`].
//! 2. [`GasEstimator`] simulates the transaction and pads the result.
//! 3. [`TxBuilder`] assembles an [`UnsignedTx`], which is signed into a
//!    [`SignedTx`] through a [`Keyring`](crate::keyring::Keyring).
//!
//! [`Client::quote`](crate::Client::quote) runs the first two and returns a
//! [`Quote`]; [`Quote::commit`] runs the third and broadcasts.
//!
//! # Example: manual assembly
//!
//! ```rust,ignore
//! use cosmos_client::transaction::{Message, SequenceResolver, TxBuilder, TxFactory};
//!
//! let factory = SequenceResolver::new(&node)
//!     .resolve(&address, TxFactory::new())
//!     .await?;
//! let unsigned = TxBuilder::from_factory(&factory)
//!     .chain_id("localnet")
//!     .gas_limit(200_000)
//!     .public_key(key.public_key)
//!     .message(Message::from_msg(&send))
//!     .build()?;
//! let tx_bytes = unsigned.sign(&keyring, "alice").await?.encode();
//! ```

mod builder;
mod factory;
mod gas;
mod message;
mod quote;
mod sequence;

pub use builder::{SignedTx, TxBuilder, UnsignedTx};
pub use factory::{GasSetting, TxFactory};
pub use gas::{GasEstimate, GasEstimator};
pub use message::Message;
pub use quote::Quote;
pub use sequence::SequenceResolver;
