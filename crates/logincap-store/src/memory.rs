//! In-memory [`SessionStore`] that keeps one encoded blob per account.
//!
//! Values are stored as bytes produced by a [`Codec`], the same shape a
//! real key-value backend would hold. That way decode failures and the
//! "empty set vs. no entry" distinction behave like they would in
//! production, not like a typed `HashMap` that can't go wrong.

use std::collections::HashMap;
use std::sync::Arc;

use logincap_protocol::{AccountId, AccountSessionSet, Codec, JsonCodec};
use tokio::sync::Mutex;

use crate::{SessionStore, StoreError};

/// A process-local session store.
///
/// Cloning is cheap and every clone sees the same data (the map lives
/// behind an `Arc`), so tests can keep a handle for inspection while the
/// enforcer owns another.
#[derive(Clone)]
pub struct MemoryStore<C: Codec = JsonCodec> {
    entries: Arc<Mutex<HashMap<AccountId, Vec<u8>>>>,
    codec: C,
}

impl MemoryStore<JsonCodec> {
    /// Creates an empty store that encodes session sets as JSON.
    pub fn new() -> Self {
        Self::with_codec(JsonCodec)
    }
}

impl Default for MemoryStore<JsonCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> MemoryStore<C> {
    /// Creates an empty store with the given codec.
    pub fn with_codec(codec: C) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            codec,
        }
    }

    /// Number of accounts that currently have an entry.
    pub async fn account_count(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns `true` if the account has an entry (even an empty one).
    pub async fn contains(&self, account: AccountId) -> bool {
        self.entries.lock().await.contains_key(&account)
    }

    /// Returns the stored bytes for an account, as written.
    pub async fn raw(&self, account: AccountId) -> Option<Vec<u8>> {
        self.entries.lock().await.get(&account).cloned()
    }

    /// Writes bytes directly, bypassing the codec.
    ///
    /// Used to seed data written by other systems (or corrupted data).
    pub async fn insert_raw(&self, account: AccountId, bytes: Vec<u8>) {
        self.entries.lock().await.insert(account, bytes);
    }
}

impl<C: Codec> SessionStore for MemoryStore<C> {
    async fn get(
        &self,
        account: AccountId,
    ) -> Result<Option<AccountSessionSet>, StoreError> {
        let entries = self.entries.lock().await;
        match entries.get(&account) {
            Some(bytes) => {
                let sessions = self.codec.decode(bytes)?;
                Ok(Some(sessions))
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        account: AccountId,
        sessions: &AccountSessionSet,
    ) -> Result<(), StoreError> {
        // Encode before taking the lock; the lock only guards the map.
        let bytes = self.codec.encode(sessions)?;
        self.entries.lock().await.insert(account, bytes);
        tracing::trace!(%account, count = sessions.len(), "session set stored");
        Ok(())
    }

    async fn delete(&self, account: AccountId) -> Result<(), StoreError> {
        self.entries.lock().await.remove(&account);
        tracing::trace!(%account, "session set deleted");
        Ok(())
    }
}
