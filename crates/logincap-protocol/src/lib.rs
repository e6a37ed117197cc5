//! Data model for logincap.
//!
//! This crate defines the values that the enforcement engine reads and
//! writes:
//!
//! - **Types** ([`AccountId`], [`SessionToken`], [`Timestamp`],
//!   [`SessionRecord`], [`AccountSessionSet`]): one account's sessions
//!   and their activity metadata.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how a session set is
//!   turned into bytes for a key-value store and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding, decoding, or parsing.
//!
//! # Architecture
//!
//! The protocol layer sits below both the store and the session engine.
//! It doesn't know about persistence or limits. It only knows what a
//! session looks like.
//!
//! ```text
//! Store (bytes per account) → Protocol (AccountSessionSet) → Session (limits)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AccountId, AccountSessionSet, SessionRecord, SessionToken, Timestamp,
};
