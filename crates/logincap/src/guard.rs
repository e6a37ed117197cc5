//! `LoginGuard` builder and per-request entry point.
//!
//! This ties the layers together: the auth collaborator identifies the
//! request, and the enforcer applies the account's limit. Wire
//! [`LoginGuard::handle_request`] into your request pipeline after your own
//! authentication middleware has run.

use logincap_protocol::{AccountId, AccountSessionSet, SessionToken, Timestamp};
use logincap_session::{
    Authenticator, EnforceOutcome, EnforcerConfig, LimitSettings, SessionEnforcer,
    SharedSettings,
};
use logincap_store::SessionStore;

use crate::{LogincapError, SettingsAdmin};

/// What happened to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// No credential was presented. Nothing to enforce.
    Unauthenticated,

    /// The credential was rejected by the authenticator. Nothing to
    /// enforce; rejecting the request is the auth layer's job.
    Rejected,

    /// Enforcement ran for the authenticated session.
    Enforced {
        account: AccountId,
        outcome: EnforceOutcome,
    },
}

/// Builder for a [`LoginGuard`].
///
/// # Example
///
/// ```rust,ignore
/// let guard = LoginGuard::builder()
///     .settings(LimitSettings { global_limit: Some("3".into()), ..Default::default() })
///     .activity_interval_secs(120)
///     .build(MemoryStore::new(), my_auth);
/// ```
pub struct LoginGuardBuilder {
    settings: LimitSettings,
    config: EnforcerConfig,
}

impl LoginGuardBuilder {
    /// Creates a builder with unlimited sessions and default tuning.
    pub fn new() -> Self {
        Self {
            settings: LimitSettings::default(),
            config: EnforcerConfig::default(),
        }
    }

    /// Sets the initial limit settings.
    pub fn settings(mut self, settings: LimitSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the enforcer tuning in one go.
    pub fn enforcer_config(mut self, config: EnforcerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the minimum gap between persisted activity updates.
    pub fn activity_interval_secs(mut self, secs: u64) -> Self {
        self.config.activity_interval_secs = secs;
        self
    }

    /// Enables or disables per-account serialisation of enforcement.
    pub fn lock_per_account(mut self, enabled: bool) -> Self {
        self.config.lock_per_account = enabled;
        self
    }

    /// Builds the guard over `store`, authenticating with `auth`.
    pub fn build<S: SessionStore, A: Authenticator>(
        self,
        store: S,
        auth: A,
    ) -> LoginGuard<S, A> {
        let settings = SharedSettings::new(self.settings);
        tracing::debug!(
            activity_interval_secs = self.config.activity_interval_secs,
            lock_per_account = self.config.lock_per_account,
            "login guard configured"
        );
        LoginGuard {
            enforcer: SessionEnforcer::with_config(
                store,
                settings.clone(),
                self.config,
            ),
            settings,
            auth,
        }
    }
}

impl Default for LoginGuardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Enforces concurrent login limits for authenticated requests.
///
/// Share it between request handlers behind an `Arc`; every method takes
/// `&self`.
pub struct LoginGuard<S, A> {
    enforcer: SessionEnforcer<S, SharedSettings>,
    settings: SharedSettings,
    auth: A,
}

impl LoginGuard<(), ()> {
    /// Creates a new builder.
    ///
    /// Lives on a concrete impl so `LoginGuard::builder()` needs no type
    /// annotations; the real types come from [`LoginGuardBuilder::build`].
    pub fn builder() -> LoginGuardBuilder {
        LoginGuardBuilder::new()
    }
}

impl<S: SessionStore, A: Authenticator> LoginGuard<S, A> {
    /// Runs enforcement for one request.
    ///
    /// `credential` is whatever the client presented (cookie value, bearer
    /// token), or `None` for anonymous requests. Never fails: every problem
    /// degrades to doing nothing, so the request itself is never blocked
    /// by enforcement.
    pub async fn handle_request(
        &self,
        credential: Option<&str>,
        now: Timestamp,
    ) -> RequestOutcome {
        let Some(credential) = credential else {
            return RequestOutcome::Unauthenticated;
        };

        let session = match self.auth.authenticate(credential).await {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(error = %e, "credential rejected, skipping enforcement");
                return RequestOutcome::Rejected;
            }
        };

        let outcome = self
            .enforcer
            .enforce(session.account, &session.token, now)
            .await;

        RequestOutcome::Enforced {
            account: session.account,
            outcome,
        }
    }

    /// Records a successful login and returns the new session's token.
    ///
    /// # Errors
    /// Returns [`LogincapError::Session`] if the store fails.
    pub async fn login(
        &self,
        account: AccountId,
        now: Timestamp,
    ) -> Result<SessionToken, LogincapError> {
        Ok(self.enforcer.login(account, now).await?)
    }

    /// Ends a session explicitly.
    ///
    /// # Errors
    /// Returns [`LogincapError::Session`] if the session doesn't exist or
    /// the store fails.
    pub async fn logout(
        &self,
        account: AccountId,
        token: &SessionToken,
    ) -> Result<(), LogincapError> {
        Ok(self.enforcer.logout(account, token).await?)
    }

    /// The account's stored sessions.
    pub async fn sessions(&self, account: AccountId) -> AccountSessionSet {
        self.enforcer.sessions(account).await
    }

    /// An admin handle over this guard's live settings.
    pub fn admin(&self) -> SettingsAdmin {
        SettingsAdmin::new(self.settings.clone())
    }

    /// The underlying enforcer.
    pub fn enforcer(&self) -> &SessionEnforcer<S, SharedSettings> {
        &self.enforcer
    }
}
