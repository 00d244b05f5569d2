//! Account number and sequence resolution.

use super::TxFactory;
use crate::api::LedgerNode;
use crate::error::{ClientError, ClientResult};
use tracing::debug;

/// Fills the signer fields of a [`TxFactory`] from the ledger.
#[derive(Clone, Copy)]
pub struct SequenceResolver<'a> {
    node: &'a dyn LedgerNode,
}

impl std::fmt::Debug for SequenceResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceResolver").finish_non_exhaustive()
    }
}

impl<'a> SequenceResolver<'a> {
    /// Creates a resolver querying `node`.
    pub fn new(node: &'a dyn LedgerNode) -> Self {
        Self { node }
    }

    /// Returns `factory` with its account number and sequence set.
    ///
    /// A factory that already carries both is returned untouched without a
    /// query. Otherwise the account is looked up once; that lookup both
    /// confirms the account exists and supplies the missing fields. Fields
    /// the caller set are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AccountNotFound`] if the ledger does not know
    /// `address`, or a connection error if the query fails.
    pub async fn resolve(&self, address: &str, mut factory: TxFactory) -> ClientResult<TxFactory> {
        if factory.is_resolved() {
            return Ok(factory);
        }

        let account = self
            .node
            .account(address)
            .await?
            .ok_or_else(|| ClientError::AccountNotFound(address.to_string()))?;

        let account_number = *factory.account_number.get_or_insert(account.account_number);
        let sequence = *factory.sequence.get_or_insert(account.sequence);
        debug!(address, account_number, sequence, "Resolved signer account");
        Ok(factory)
    }
}
