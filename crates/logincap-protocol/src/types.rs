//! Core data types: who owns a session, how it is identified, and when it
//! was last seen.
//!
//! Everything here is plain data. Decisions about limits and eviction live
//! in `logincap-session`; persistence lives in `logincap-store`.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for an account (the user sessions are tracked for).
///
/// Newtype wrapper so an account id can't be mixed up with a timestamp or
/// a limit, even though all three are integers underneath.
/// `#[serde(transparent)]` stores it as the bare number.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}", self.0)
    }
}

/// Opaque identifier for one login session.
///
/// Tokens are issued at login and presented on every later request. The
/// engine never interprets them, it only compares them.
///
/// `Ord` is derived because session sets are keyed by token in a
/// `BTreeMap`, which gives a stable scan order.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token string without validation.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Parses a token presented by a client.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidData`] if the token is empty or
    /// only whitespace.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProtocolError::InvalidData(
                "session token is empty".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Prints only a short prefix so full tokens never end up in logs.
impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(8).collect();
        if prefix.len() < self.0.len() {
            write!(f, "{prefix}..")
        } else {
            write!(f, "{prefix}")
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Wall-clock time in whole seconds since the Unix epoch.
///
/// Session records outlive the process (they sit in a store), so a
/// monotonic `Instant` won't do here: we need a value that means the same
/// thing after a restart.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// The current system time. A clock set before 1970 reads as 0.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    /// Seconds from `earlier` to `self`, or 0 if `earlier` is in the future.
    pub fn secs_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Returns a timestamp `secs` seconds later.
    pub fn plus_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionRecord
// ---------------------------------------------------------------------------

/// One session's activity metadata.
///
/// The token is not stored here: it is the key under which the record
/// lives in an [`AccountSessionSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// When the session was created. Never changes after login.
    pub login_time: Timestamp,

    /// When the session last handled a request.
    ///
    /// `None` for records written before activity tracking was enabled.
    /// `#[serde(default)]` lets those older blobs decode.
    #[serde(default)]
    pub last_activity: Option<Timestamp>,
}

impl SessionRecord {
    /// A freshly logged-in session: active as of its login time.
    pub fn new(login_time: Timestamp) -> Self {
        Self {
            login_time,
            last_activity: Some(login_time),
        }
    }

    /// The recorded activity time, or `now` if none was ever recorded.
    ///
    /// A missing timestamp must never make a record look like the oldest.
    pub fn activity_or(&self, now: Timestamp) -> Timestamp {
        self.last_activity.unwrap_or(now)
    }
}

// ---------------------------------------------------------------------------
// AccountSessionSet
// ---------------------------------------------------------------------------

/// All sessions belonging to one account, keyed by token.
///
/// Tokens are unique by construction (they are map keys). The map is a
/// `BTreeMap` so iteration order is the token order, which keeps eviction
/// tie-breaks reproducible regardless of how a store returns the data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountSessionSet(BTreeMap<SessionToken, SessionRecord>);

impl AccountSessionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Number of sessions in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the account has no sessions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a session by token.
    pub fn get(&self, token: &SessionToken) -> Option<&SessionRecord> {
        self.0.get(token)
    }

    /// Mutable lookup, used when refreshing activity.
    pub fn get_mut(
        &mut self,
        token: &SessionToken,
    ) -> Option<&mut SessionRecord> {
        self.0.get_mut(token)
    }

    /// Returns `true` if the token is present.
    pub fn contains(&self, token: &SessionToken) -> bool {
        self.0.contains_key(token)
    }

    /// Inserts or replaces a session. Returns the previous record, if any.
    pub fn insert(
        &mut self,
        token: SessionToken,
        record: SessionRecord,
    ) -> Option<SessionRecord> {
        self.0.insert(token, record)
    }

    /// Removes a session and returns its record.
    pub fn remove(&mut self, token: &SessionToken) -> Option<SessionRecord> {
        self.0.remove(token)
    }

    /// Iterates over `(token, record)` pairs in token order.
    pub fn iter(&self) -> btree_map::Iter<'_, SessionToken, SessionRecord> {
        self.0.iter()
    }

    /// Iterates over the tokens in token order.
    pub fn tokens(&self) -> impl Iterator<Item = &SessionToken> {
        self.0.keys()
    }
}

impl FromIterator<(SessionToken, SessionRecord)> for AccountSessionSet {
    fn from_iter<I: IntoIterator<Item = (SessionToken, SessionRecord)>>(
        iter: I,
    ) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AccountSessionSet {
    type Item = (&'a SessionToken, &'a SessionRecord);
    type IntoIter = btree_map::Iter<'a, SessionToken, SessionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
