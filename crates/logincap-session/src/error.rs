//! Error types for the session layer.

use logincap_protocol::{AccountId, ProtocolError, SessionToken};
use logincap_store::StoreError;

/// Errors that can occur during session lifecycle operations.
///
/// Enforcement itself never returns these: it degrades to a no-op and
/// reports what happened in its outcome. They surface from login, logout,
/// and authentication, where the caller needs to know.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The credential was missing, malformed, or rejected by the
    /// [`Authenticator`](crate::Authenticator).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The account has no session with this token. Either it was never
    /// issued, or it was already logged out or evicted.
    #[error("session {token} not found for account {account}")]
    NotFound {
        account: AccountId,
        token: SessionToken,
    },

    /// A token presented by the client could not be parsed.
    #[error(transparent)]
    InvalidToken(#[from] ProtocolError),

    /// Reading or writing the account's session set failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
