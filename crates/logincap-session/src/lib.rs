//! Concurrent session limits for logincap.
//!
//! This crate is the enforcement engine. Per authenticated request it:
//!
//! 1. **Resolves the limit** for the account ([`LimitResolver`]): a global
//!    value, optionally overridden per account.
//! 2. **Evicts** the least-recently-active session when the account holds
//!    more sessions than its limit ([`select_victim`]).
//! 3. **Refreshes activity** for the current session, at most once per
//!    interval ([`ActivityThrottler`]).
//!
//! [`SessionEnforcer`] composes the three against a
//! [`SessionStore`](logincap_store::SessionStore), and also handles login
//! and logout so that every write to a session set goes through one place.
//!
//! # How it fits in the stack
//!
//! ```text
//! logincap (above)          ← request entry point, settings administration
//!     ↕
//! Session layer (this crate) ← limits, eviction, activity
//!     ↕
//! Store / Protocol (below)  ← persistence and data types
//! ```

mod auth;
mod config;
mod enforcer;
mod error;
mod eviction;
mod lifecycle;
mod locks;
mod throttle;

pub use auth::{AuthenticatedSession, Authenticator};
pub use config::{
    ConfigProvider, LimitResolver, LimitSettings, SessionLimit, SharedSettings,
    coerce_limit,
};
pub use enforcer::{EnforceOutcome, EnforcerConfig, SessionEnforcer};
pub use error::SessionError;
pub use eviction::select_victim;
pub use throttle::{
    ActivityThrottler, DEFAULT_ACTIVITY_INTERVAL_SECS, should_persist,
};
