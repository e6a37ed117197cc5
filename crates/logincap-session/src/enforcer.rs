//! The session enforcer: runs once per authenticated request.
//!
//! Each call to [`SessionEnforcer::enforce`] walks the same three steps:
//!
//! ```text
//! load the account's sessions ──→ evict the least-recently-active one
//!            │                     if the account is over its limit
//!            │                                 │
//!            ▼                                 ▼
//!   (nothing stored: stop)        refresh the current session's activity
//!                                  if the stored timestamp is stale
//! ```
//!
//! # Failure model
//!
//! Enforcement hardens authentication; it is not itself a security
//! boundary. A store failure is logged and counted in the outcome, and
//! the request carries on. The worst case is that a limit isn't enforced
//! on this one request.

use logincap_protocol::{AccountId, AccountSessionSet, SessionToken, Timestamp};
use logincap_store::SessionStore;
use serde::{Deserialize, Serialize};

use crate::eviction::select_victim;
use crate::locks::AccountLocks;
use crate::throttle::{ActivityThrottler, DEFAULT_ACTIVITY_INTERVAL_SECS};
use crate::{ConfigProvider, LimitResolver, SessionLimit};

// ---------------------------------------------------------------------------
// EnforcerConfig
// ---------------------------------------------------------------------------

/// Tuning for the enforcer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforcerConfig {
    /// Minimum seconds between persisted activity updates for a session.
    ///
    /// Default: 60.
    pub activity_interval_secs: u64,

    /// Serialise enforcement per account inside this process.
    ///
    /// Default: `true`. With `false`, concurrent requests for one account
    /// may race on the read-modify-write of its session set.
    pub lock_per_account: bool,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            activity_interval_secs: DEFAULT_ACTIVITY_INTERVAL_SECS,
            lock_per_account: true,
        }
    }
}

// ---------------------------------------------------------------------------
// EnforceOutcome
// ---------------------------------------------------------------------------

/// What a single [`enforce`](SessionEnforcer::enforce) call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnforceOutcome {
    /// The limit in effect for the account, if sessions were found.
    pub limit: Option<SessionLimit>,

    /// The session removed to bring the account back under its limit.
    pub evicted: Option<SessionToken>,

    /// Whether the current session's activity timestamp was persisted.
    pub activity_refreshed: bool,

    /// Store operations that failed and were skipped.
    pub store_errors: u32,
}

impl EnforceOutcome {
    /// Returns `true` if nothing was written.
    pub fn is_noop(&self) -> bool {
        self.evicted.is_none() && !self.activity_refreshed
    }
}

// ---------------------------------------------------------------------------
// SessionEnforcer
// ---------------------------------------------------------------------------

/// Enforces per-account concurrent session limits against a store.
///
/// The effective limit is resolved on every call from the configured
/// provider, so changes to the settings apply to the very next request
/// and nothing about one request leaks into another.
pub struct SessionEnforcer<S, P> {
    pub(crate) store: S,
    resolver: LimitResolver<P>,
    throttler: ActivityThrottler,
    pub(crate) locks: Option<AccountLocks>,
}

impl<S: SessionStore, P: ConfigProvider> SessionEnforcer<S, P> {
    /// Creates an enforcer with the default [`EnforcerConfig`].
    pub fn new(store: S, provider: P) -> Self {
        Self::with_config(store, provider, EnforcerConfig::default())
    }

    /// Creates an enforcer with explicit tuning.
    pub fn with_config(store: S, provider: P, config: EnforcerConfig) -> Self {
        Self {
            store,
            resolver: LimitResolver::new(provider),
            throttler: ActivityThrottler::new(config.activity_interval_secs),
            locks: config.lock_per_account.then(AccountLocks::default),
        }
    }

    /// The store this enforcer reads and writes.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The resolver used to look up limits.
    pub fn resolver(&self) -> &LimitResolver<P> {
        &self.resolver
    }

    /// Enforces the account's limit and refreshes the current session.
    ///
    /// Call once per authenticated request, after the request's credential
    /// has been validated. Performs at most one store read and two writes
    /// (one for an eviction, one for the activity refresh).
    pub async fn enforce(
        &self,
        account: AccountId,
        current: &SessionToken,
        now: Timestamp,
    ) -> EnforceOutcome {
        let _guard = match &self.locks {
            Some(locks) => Some(locks.lock(account).await),
            None => None,
        };

        let mut outcome = EnforceOutcome::default();

        // --- Step 1: Resolve ---
        let mut sessions = match self.store.get(account).await {
            Ok(Some(sessions)) if !sessions.is_empty() => sessions,
            Ok(_) => {
                tracing::debug!(%account, "no stored sessions, nothing to enforce");
                return outcome;
            }
            Err(e) => {
                tracing::warn!(%account, error = %e, "failed to load sessions, skipping enforcement");
                outcome.store_errors += 1;
                return outcome;
            }
        };

        // --- Step 2: Enforce limit ---
        let limit = self.resolver.resolve(account);
        outcome.limit = Some(limit);

        if sessions.len() > 1 && limit.is_exceeded_by(sessions.len()) {
            outcome.evicted = self
                .evict_one(account, &mut sessions, limit, now, &mut outcome.store_errors)
                .await;
        }

        // --- Step 3: Refresh activity ---
        let Some(record) = sessions.get_mut(current) else {
            tracing::debug!(%account, token = %current, "current session not stored, skipping refresh");
            return outcome;
        };

        // A record without a timestamp gets one now.
        let due = match record.last_activity {
            Some(last) => self.throttler.should_persist(last, now),
            None => true,
        };
        if !due {
            return outcome;
        }

        record.last_activity = Some(now);
        match self.store.put(account, &sessions).await {
            Ok(()) => {
                tracing::debug!(%account, token = %current, %now, "activity refreshed");
                outcome.activity_refreshed = true;
            }
            Err(e) => {
                tracing::warn!(%account, error = %e, "failed to persist activity");
                outcome.store_errors += 1;
            }
        }

        outcome
    }

    /// Returns the account's stored sessions, or an empty set if none are
    /// stored or the store can't be read.
    pub async fn sessions(&self, account: AccountId) -> AccountSessionSet {
        match self.store.get(account).await {
            Ok(sessions) => sessions.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(%account, error = %e, "failed to load sessions");
                AccountSessionSet::new()
            }
        }
    }

    /// Removes the least-recently-active session and persists the result.
    ///
    /// On a failed write the victim is put back into `sessions`, so the
    /// in-memory view keeps matching what is stored.
    async fn evict_one(
        &self,
        account: AccountId,
        sessions: &mut AccountSessionSet,
        limit: SessionLimit,
        now: Timestamp,
        store_errors: &mut u32,
    ) -> Option<SessionToken> {
        let victim = select_victim(sessions, now)?.clone();
        let record = sessions.remove(&victim)?;

        // An empty set is deleted, never stored.
        let written = if sessions.is_empty() {
            self.store.delete(account).await
        } else {
            self.store.put(account, sessions).await
        };

        match written {
            Ok(()) => {
                tracing::info!(
                    %account,
                    token = %victim,
                    %limit,
                    remaining = sessions.len(),
                    "session limit exceeded, evicted least recently active session"
                );
                Some(victim)
            }
            Err(e) => {
                tracing::warn!(%account, error = %e, "failed to persist eviction");
                *store_errors += 1;
                sessions.insert(victim, record);
                None
            }
        }
    }
}
