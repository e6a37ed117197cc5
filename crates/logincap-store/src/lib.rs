//! Session store abstraction for logincap.
//!
//! The engine treats persistence as a black box keyed by account id: it
//! reads an account's whole [`AccountSessionSet`], decides, and writes the
//! whole set back (or deletes it). This crate defines that boundary as the
//! [`SessionStore`] trait and ships an in-memory implementation.
//!
//! A store only has to be a reliable key-value map. It does not need
//! transactions: callers that want read-modify-write safety serialise
//! access per account themselves.

mod error;
mod memory;

pub use error::StoreError;
pub use memory::MemoryStore;

use std::future::Future;
use std::sync::Arc;

use logincap_protocol::{AccountId, AccountSessionSet};

/// Persistent storage for per-account session sets.
///
/// Methods return `impl Future + Send` rather than using bare `async fn`
/// so that enforcement futures stay `Send` when the store is a generic
/// parameter and the caller spawns them onto the multi-threaded runtime.
/// Implementations are still free to write `async fn`.
pub trait SessionStore: Send + Sync + 'static {
    /// Loads the account's session set. `Ok(None)` means no entry exists.
    fn get(
        &self,
        account: AccountId,
    ) -> impl Future<Output = Result<Option<AccountSessionSet>, StoreError>> + Send;

    /// Replaces the account's session set.
    fn put(
        &self,
        account: AccountId,
        sessions: &AccountSessionSet,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes the account's entry. Deleting a missing entry succeeds.
    fn delete(
        &self,
        account: AccountId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Lets one store be shared between the enforcer, the login lifecycle,
/// and whoever else needs it.
impl<S: SessionStore> SessionStore for Arc<S> {
    fn get(
        &self,
        account: AccountId,
    ) -> impl Future<Output = Result<Option<AccountSessionSet>, StoreError>> + Send
    {
        S::get(self, account)
    }

    fn put(
        &self,
        account: AccountId,
        sessions: &AccountSessionSet,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        S::put(self, account, sessions)
    }

    fn delete(
        &self,
        account: AccountId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        S::delete(self, account)
    }
}
