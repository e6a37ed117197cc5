//! Per-account advisory locks.
//!
//! Enforcement is a read-modify-write of one account's session set. Two
//! requests for the same account running at once could both see the
//! account over its limit and each evict a session, or one could
//! overwrite the other's write. Holding an account's lock for the whole
//! sequence serialises them. Different accounts never contend.
//!
//! The lock is in-process only: it protects against concurrent requests
//! handled by this process, not against other processes sharing the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use logincap_protocol::AccountId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A registry of one async mutex per account with live holders.
///
/// Entries are created on first use and removed when the last holder or
/// waiter goes away, so the map only contains accounts with requests in
/// flight.
#[derive(Debug, Default)]
pub(crate) struct AccountLocks {
    // A std mutex is fine here: it's held only to look up or clean up an
    // entry, never across an `.await`.
    locks: Mutex<HashMap<AccountId, Slot>>,
}

#[derive(Debug, Default)]
struct Slot {
    mutex: Arc<AsyncMutex<()>>,
    /// Holders plus waiters.
    users: usize,
}

impl AccountLocks {
    /// Waits for exclusive access to `account`.
    ///
    /// Cancel-safe: dropping the future while it waits deregisters it.
    pub(crate) async fn lock(&self, account: AccountId) -> AccountGuard<'_> {
        let mutex = {
            let mut locks =
                self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = locks.entry(account).or_default();
            slot.users += 1;
            Arc::clone(&slot.mutex)
        };

        // Registered before the first await so a dropped wait still
        // releases its slot.
        let mut guard = AccountGuard {
            locks: self,
            account,
            guard: None,
        };
        guard.guard = Some(mutex.lock_owned().await);
        guard
    }

    /// Number of accounts with an entry in the registry.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn release(&self, account: AccountId) {
        let mut locks =
            self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = locks.get_mut(&account).is_some_and(|slot| {
            slot.users = slot.users.saturating_sub(1);
            slot.users == 0
        });
        if idle {
            locks.remove(&account);
        }
    }
}

/// Exclusive access to one account until dropped.
///
/// While the lock is still being awaited `guard` is `None`; dropping it in
/// that state only deregisters the waiter.
pub(crate) struct AccountGuard<'a> {
    locks: &'a AccountLocks,
    account: AccountId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(self.account);
    }
}
