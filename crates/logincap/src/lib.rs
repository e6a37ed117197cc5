//! # logincap
//!
//! Per-account concurrent login limits.
//!
//! Each account may hold at most N sessions at once (globally configured,
//! optionally overridden per account). When an authenticated request finds
//! its account over the limit, the least-recently-active session is
//! evicted. Activity timestamps are refreshed at most once a minute so
//! enforcement doesn't turn every request into a write.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use logincap::prelude::*;
//!
//! # struct MyAuth;
//! # impl Authenticator for MyAuth {
//! #     async fn authenticate(&self, _: &str) -> Result<AuthenticatedSession, SessionError> {
//! #         Err(SessionError::AuthFailed("demo".into()))
//! #     }
//! # }
//! # async fn run() {
//! logincap::init_tracing();
//!
//! let guard = LoginGuard::builder()
//!     .settings(LimitSettings {
//!         global_limit: Some("2".into()),
//!         ..LimitSettings::default()
//!     })
//!     .build(MemoryStore::new(), MyAuth);
//!
//! // On every request:
//! let outcome = guard.handle_request(Some("cookie value"), Timestamp::now()).await;
//! # let _ = outcome;
//! # }
//! ```

mod admin;
mod error;
mod guard;
mod telemetry;

pub use admin::SettingsAdmin;
pub use error::LogincapError;
pub use guard::{LoginGuard, LoginGuardBuilder, RequestOutcome};
pub use telemetry::init_tracing;

pub use logincap_protocol as protocol;
pub use logincap_session as session;
pub use logincap_store as store;

/// Everything needed to wire logincap into a request pipeline.
pub mod prelude {
    pub use crate::{
        LoginGuard, LoginGuardBuilder, LogincapError, RequestOutcome,
        SettingsAdmin,
    };
    pub use logincap_protocol::{
        AccountId, AccountSessionSet, SessionRecord, SessionToken, Timestamp,
    };
    pub use logincap_session::{
        AuthenticatedSession, Authenticator, EnforceOutcome, EnforcerConfig,
        LimitSettings, SessionError, SessionLimit,
    };
    pub use logincap_store::{MemoryStore, SessionStore};
}
