//! Codec trait and implementations for persisting session sets.
//!
//! Stores keep one opaque blob per account. The codec decides how an
//! [`AccountSessionSet`](crate::AccountSessionSet) becomes that blob. The
//! store doesn't care how. It just needs something that implements
//! [`Codec`], so a binary format can replace JSON without touching any
//! other code.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a store holding the codec is shared
/// between request handlers running on different Tokio worker threads.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// A session set encodes as an object keyed by token, which is easy to
/// inspect when debugging a stored account:
///
/// ```text
/// {"3f9a...":{"login_time":1700000000,"last_activity":1700000120}}
/// ```
///
/// ## Example
///
/// ```rust
/// use logincap_protocol::{
///     AccountSessionSet, Codec, JsonCodec, SessionRecord, SessionToken, Timestamp,
/// };
///
/// let codec = JsonCodec;
/// let mut set = AccountSessionSet::new();
/// set.insert(SessionToken::new("abc"), SessionRecord::new(Timestamp(100)));
///
/// let bytes = codec.encode(&set).unwrap();
/// let decoded: AccountSessionSet = codec.decode(&bytes).unwrap();
/// assert_eq!(set, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
