//! Limit configuration: where the per-account session limit comes from.
//!
//! Two values are configured system-wide (a global limit and a switch that
//! enables per-account settings) and each account may carry an override.
//! All of them are kept as entered; [`coerce_limit`] turns whatever is
//! stored into a number at resolve time, so a malformed value degrades to
//! a usable limit instead of an error.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use logincap_protocol::AccountId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionLimit
// ---------------------------------------------------------------------------

/// The effective maximum number of concurrent sessions for an account.
///
/// `0` means unlimited. Any other value is an exact upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionLimit(u32);

impl SessionLimit {
    /// No limit: enforcement is a no-op.
    pub const UNLIMITED: Self = Self(0);

    /// Creates a limit. `0` is unlimited.
    pub fn new(max_sessions: u32) -> Self {
        Self(max_sessions)
    }

    /// The raw value (`0` for unlimited).
    pub fn get(self) -> u32 {
        self.0
    }

    /// Returns `true` if this limit never triggers eviction.
    pub fn is_unlimited(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if holding `count` sessions breaks this limit.
    pub fn is_exceeded_by(self, count: usize) -> bool {
        !self.is_unlimited() && count > self.0 as usize
    }
}

impl fmt::Display for SessionLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unlimited() {
            write!(f, "unlimited")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// Coercion
// ---------------------------------------------------------------------------

/// Converts a stored limit value into a non-negative integer.
///
/// Reads the longest numeric prefix (optional sign, digits, an optional
/// fraction and an optional exponent), truncates it toward zero and takes
/// the magnitude. Anything after the prefix is ignored and input without
/// one reads as `0`. Values beyond `u32::MAX` saturate.
///
/// ```rust
/// use logincap_session::coerce_limit;
///
/// assert_eq!(coerce_limit("3"), 3);
/// assert_eq!(coerce_limit("-2"), 2);
/// assert_eq!(coerce_limit(" 4 sessions"), 4);
/// assert_eq!(coerce_limit("2.9"), 2);
/// assert_eq!(coerce_limit("1e3"), 1000);
/// assert_eq!(coerce_limit("many"), 0);
/// ```
pub fn coerce_limit(raw: &str) -> u32 {
    let text = raw.trim_start();
    let bytes = text.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'-' | b'+')));
    let int_digits = leading_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = leading_digits(&bytes[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'-' | b'+')) {
            exp += 1;
        }
        let exp_digits = leading_digits(&bytes[exp..]);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    // `as` saturates, so huge values clamp to u32::MAX.
    text[..end]
        .parse::<f64>()
        .map_or(0, |value| value.abs() as u32)
}

fn leading_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

// ---------------------------------------------------------------------------
// ConfigProvider
// ---------------------------------------------------------------------------

/// Read access to the configured limit values.
///
/// Values are returned raw (as stored). `None` means not configured.
pub trait ConfigProvider: Send + Sync + 'static {
    /// The global limit applied to every account.
    fn global_limit(&self) -> Option<String>;

    /// Whether per-account overrides are honoured.
    fn personalized_enabled(&self) -> bool;

    /// The account's own limit, if one was set.
    fn account_override(&self, account: AccountId) -> Option<String>;
}

/// The full set of limit settings.
///
/// Deserializable so it can be loaded from a JSON settings document:
///
/// ```json
/// {
///   "global_limit": "2",
///   "personalized_enabled": true,
///   "overrides": { "7": "5" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    /// Global limit as entered. `None` means unlimited.
    pub global_limit: Option<String>,

    /// Enables per-account overrides.
    pub personalized_enabled: bool,

    /// Per-account overrides as entered.
    pub overrides: HashMap<AccountId, String>,
}

impl LimitSettings {
    /// Parses settings from a JSON document. Missing fields take their
    /// defaults.
    ///
    /// # Errors
    /// Returns the `serde_json` error if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl ConfigProvider for LimitSettings {
    fn global_limit(&self) -> Option<String> {
        self.global_limit.clone()
    }

    fn personalized_enabled(&self) -> bool {
        self.personalized_enabled
    }

    fn account_override(&self, account: AccountId) -> Option<String> {
        self.overrides.get(&account).cloned()
    }
}

/// Settings that can be changed while requests are being served.
///
/// Cloning shares the same underlying settings. Reads take a short
/// read lock and never hold it across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<LimitSettings>>,
}

impl SharedSettings {
    /// Wraps an initial set of settings.
    pub fn new(settings: LimitSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Returns a copy of the current settings.
    pub fn snapshot(&self) -> LimitSettings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies a change under the write lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut LimitSettings) -> R) -> R {
        let mut guard =
            self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn read<R>(&self, f: impl FnOnce(&LimitSettings) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

impl ConfigProvider for SharedSettings {
    fn global_limit(&self) -> Option<String> {
        self.read(|s| s.global_limit.clone())
    }

    fn personalized_enabled(&self) -> bool {
        self.read(|s| s.personalized_enabled)
    }

    fn account_override(&self, account: AccountId) -> Option<String> {
        self.read(|s| s.overrides.get(&account).cloned())
    }
}

// ---------------------------------------------------------------------------
// LimitResolver
// ---------------------------------------------------------------------------

/// Determines the effective limit for an account.
///
/// Resolution is read-only and never fails:
///
/// ```text
/// personalized enabled AND override non-empty → coerce(override)
/// otherwise                                   → coerce(global), or unlimited
/// ```
#[derive(Debug, Clone)]
pub struct LimitResolver<P> {
    provider: P,
}

impl<P: ConfigProvider> LimitResolver<P> {
    /// Creates a resolver reading from `provider`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolves the effective limit for `account`.
    pub fn resolve(&self, account: AccountId) -> SessionLimit {
        if self.provider.personalized_enabled() {
            let personal = self
                .provider
                .account_override(account)
                .filter(|raw| !raw.is_empty());
            if let Some(raw) = personal {
                return SessionLimit::new(coerce_limit(&raw));
            }
        }

        self.provider
            .global_limit()
            .map(|raw| SessionLimit::new(coerce_limit(&raw)))
            .unwrap_or(SessionLimit::UNLIMITED)
    }
}
