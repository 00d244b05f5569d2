//! Process-wide address format.
//!
//! Some key stores derive bech32 addresses from a global prefix setting
//! instead of taking the format as a parameter. This module owns that global
//! and the lock that serializes its use: [`with_address_prefix`] installs a
//! format and holds the lock until the closure's future completes, so no other
//! pipeline can swap the prefix between address derivation and signing.
//!
//! Code that receives an [`AddressFormat`] explicitly should prefer it over
//! [`current`]. The global exists for key stores that cannot take one.

use crate::types::AddressFormat;
use once_cell::sync::Lazy;
use std::future::Future;
use std::sync::RwLock;
use tokio::sync::{Mutex, MutexGuard};
use tracing::trace;

static LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static FORMAT: Lazy<RwLock<AddressFormat>> = Lazy::new(|| RwLock::new(AddressFormat::default()));

/// Returns the currently installed address format.
pub fn current() -> AddressFormat {
    FORMAT
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone()
}

fn install(format: AddressFormat) -> AddressFormat {
    let mut slot = FORMAT
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    std::mem::replace(&mut *slot, format)
}

/// Exclusive ownership of the process-wide address format.
///
/// The previous format is restored when the guard is dropped, including when
/// the owning future is cancelled.
#[derive(Debug)]
pub struct AddressConfigGuard {
    format: AddressFormat,
    previous: Option<AddressFormat>,
    _lock: MutexGuard<'static, ()>,
}

impl AddressConfigGuard {
    /// Waits for the lock and installs `format`.
    pub async fn acquire(format: &AddressFormat) -> Self {
        let lock = LOCK.lock().await;
        let previous = install(format.clone());
        trace!(prefix = format.account_prefix(), "Installed address format");
        Self {
            format: format.clone(),
            previous: Some(previous),
            _lock: lock,
        }
    }

    /// Returns the installed format.
    pub fn format(&self) -> &AddressFormat {
        &self.format
    }
}

impl Drop for AddressConfigGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            install(previous);
        }
    }
}

/// Runs `f` with `format` installed process-wide, holding the lock until the
/// returned future completes.
///
/// ```rust,ignore
/// let address = with_address_prefix(&format, |format| async move {
///     keyring.address("alice", &format).await
/// })
/// .await?;
/// ```
pub async fn with_address_prefix<F, Fut, T>(format: &AddressFormat, f: F) -> T
where
    F: FnOnce(AddressFormat) -> Fut,
    Fut: Future<Output = T>,
{
    let guard = AddressConfigGuard::acquire(format).await;
    let result = f(guard.format().clone()).await;
    drop(guard);
    result
}
