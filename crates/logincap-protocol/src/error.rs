//! Error types for the protocol layer.
//!
//! Each crate in logincap defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in the data itself (bad bytes,
//! an unusable token), not in storage or limit enforcement.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization of a session set failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed.
    ///
    /// Common causes: a stored blob written by an incompatible version,
    /// truncated data, or a record with a missing `login_time`.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The value is structurally valid but unusable, e.g. an empty token.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
