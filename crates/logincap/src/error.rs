//! Unified error type for logincap.

use logincap_protocol::ProtocolError;
use logincap_session::SessionError;
use logincap_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum LogincapError {
    /// Bad data: an unparseable token or an unreadable blob.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A session lifecycle operation failed (auth, login, logout).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A settings document could not be parsed.
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}
