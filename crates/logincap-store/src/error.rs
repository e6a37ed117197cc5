use logincap_protocol::ProtocolError;

/// Errors that can occur in the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored blob could not be encoded or decoded.
    #[error("stored session data is unreadable: {0}")]
    Codec(#[from] ProtocolError),
}
