//! Settings administration: the write side of the limit configuration.
//!
//! Whatever UI or API edits the settings goes through [`SettingsAdmin`].
//! Limits are sanitised to non-negative integers before they are stored,
//! so the resolver only ever sees clean values written from here (it still
//! coerces, for data that arrived some other way).

use logincap_protocol::AccountId;
use logincap_session::{
    LimitResolver, LimitSettings, SessionLimit, SharedSettings, coerce_limit,
};

use crate::LogincapError;

/// Edits the limit settings shared with a running [`LoginGuard`](crate::LoginGuard).
///
/// Changes are visible to the very next request.
#[derive(Debug, Clone)]
pub struct SettingsAdmin {
    settings: SharedSettings,
}

impl SettingsAdmin {
    /// Creates an admin over `settings`.
    pub fn new(settings: SharedSettings) -> Self {
        Self { settings }
    }

    /// Sanitises an entered limit to a non-negative integer.
    pub fn sanitize(input: &str) -> u32 {
        coerce_limit(input)
    }

    /// Sets the global limit. Returns the value actually stored.
    pub fn set_global_limit(&self, input: &str) -> u32 {
        let value = Self::sanitize(input);
        self.settings
            .update(|s| s.global_limit = Some(value.to_string()));
        tracing::info!(limit = value, "global session limit updated");
        value
    }

    /// Enables or disables per-account overrides.
    pub fn set_personalized(&self, enabled: bool) {
        self.settings.update(|s| s.personalized_enabled = enabled);
        tracing::info!(enabled, "personalized session limits toggled");
    }

    /// Sets or clears an account's override.
    ///
    /// Empty input clears the override (the account falls back to the
    /// global limit). Returns the stored value, or `None` when cleared.
    pub fn set_account_override(
        &self,
        account: AccountId,
        input: &str,
    ) -> Option<u32> {
        if input.trim().is_empty() {
            self.settings.update(|s| s.overrides.remove(&account));
            tracing::info!(%account, "session limit override cleared");
            return None;
        }

        let value = Self::sanitize(input);
        self.settings
            .update(|s| s.overrides.insert(account, value.to_string()));
        tracing::info!(%account, limit = value, "session limit override set");
        Some(value)
    }

    /// The limit the enforcer would apply to `account` right now.
    pub fn effective_limit(&self, account: AccountId) -> SessionLimit {
        LimitResolver::new(self.settings.clone()).resolve(account)
    }

    /// The value to show when editing an account's limit: its override if
    /// it has one, otherwise the global value.
    pub fn displayed_limit(&self, account: AccountId) -> u32 {
        let settings = self.settings.snapshot();
        settings
            .overrides
            .get(&account)
            .filter(|raw| !raw.is_empty())
            .or(settings.global_limit.as_ref())
            .map(|raw| coerce_limit(raw))
            .unwrap_or(0)
    }

    /// A copy of the current settings.
    pub fn settings(&self) -> LimitSettings {
        self.settings.snapshot()
    }

    /// Replaces all settings from a JSON document.
    ///
    /// # Errors
    /// Returns [`LogincapError::Settings`] if the document doesn't parse;
    /// the current settings are left untouched.
    pub fn load_json(&self, json: &str) -> Result<(), LogincapError> {
        let loaded = LimitSettings::from_json(json)?;
        self.settings.update(|s| *s = loaded);
        tracing::info!("session limit settings loaded");
        Ok(())
    }
}
