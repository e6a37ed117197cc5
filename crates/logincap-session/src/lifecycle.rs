//! Login and logout: creating and destroying session records.
//!
//! These run outside the per-request enforcement path. Login does not
//! enforce the limit itself; the account's next authenticated request
//! does, which is when the least-recently-active session is evicted.

use logincap_protocol::{AccountId, SessionRecord, SessionToken, Timestamp};
use logincap_store::SessionStore;
use rand::Rng;

use crate::{ConfigProvider, SessionEnforcer, SessionError};

impl<S: SessionStore, P: ConfigProvider> SessionEnforcer<S, P> {
    /// Records a new session for `account` and returns its token.
    ///
    /// The session starts out active as of `now`.
    ///
    /// # Errors
    /// Returns [`SessionError::Store`] if the account's sessions can't be
    /// read or written.
    pub async fn login(
        &self,
        account: AccountId,
        now: Timestamp,
    ) -> Result<SessionToken, SessionError> {
        let _guard = match &self.locks {
            Some(locks) => Some(locks.lock(account).await),
            None => None,
        };

        let mut sessions = self.store.get(account).await?.unwrap_or_default();

        // 128-bit tokens don't collide in practice, but a duplicate would
        // silently overwrite another device's session.
        let token = loop {
            let candidate = generate_token();
            if !sessions.contains(&candidate) {
                break candidate;
            }
        };

        sessions.insert(token.clone(), SessionRecord::new(now));
        self.store.put(account, &sessions).await?;

        tracing::info!(%account, %token, count = sessions.len(), "session created");
        Ok(token)
    }

    /// Removes one session (explicit logout).
    ///
    /// If it was the account's last session, the account's store entry is
    /// deleted instead of being left as an empty set.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] if the account has no such session
    /// - [`SessionError::Store`] if the store fails
    pub async fn logout(
        &self,
        account: AccountId,
        token: &SessionToken,
    ) -> Result<(), SessionError> {
        let _guard = match &self.locks {
            Some(locks) => Some(locks.lock(account).await),
            None => None,
        };

        let mut sessions = self.store.get(account).await?.unwrap_or_default();

        if sessions.remove(token).is_none() {
            return Err(SessionError::NotFound {
                account,
                token: token.clone(),
            });
        }

        if sessions.is_empty() {
            self.store.delete(account).await?;
        } else {
            self.store.put(account, &sessions).await?;
        }

        tracing::info!(%account, %token, remaining = sessions.len(), "session logged out");
        Ok(())
    }
}

/// Generates a random 32-character hex token (128 bits of entropy).
fn generate_token() -> SessionToken {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    SessionToken::new(
        bytes.iter().map(|b| format!("{b:02x}")).collect::<String>(),
    )
}
