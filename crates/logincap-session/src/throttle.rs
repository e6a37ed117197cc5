//! Activity throttling: deciding when a request is worth a store write.
//!
//! Every authenticated request observes activity, but writing the session
//! set back on every request would turn reads into writes. Activity is
//! only persisted once the stored timestamp is older than an interval.

use logincap_protocol::Timestamp;

/// Default minimum gap between persisted activity updates: one minute.
pub const DEFAULT_ACTIVITY_INTERVAL_SECS: u64 = 60;

/// Returns `true` iff `now - last_activity > min_interval_secs`.
///
/// A `last_activity` in the future (clock skew) never triggers a write.
pub fn should_persist(
    last_activity: Timestamp,
    now: Timestamp,
    min_interval_secs: u64,
) -> bool {
    now.secs_since(last_activity) > min_interval_secs
}

/// [`should_persist`] with a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityThrottler {
    min_interval_secs: u64,
}

impl ActivityThrottler {
    /// Creates a throttler with the given interval in seconds.
    pub fn new(min_interval_secs: u64) -> Self {
        Self { min_interval_secs }
    }

    /// The configured interval in seconds.
    pub fn min_interval_secs(&self) -> u64 {
        self.min_interval_secs
    }

    /// See [`should_persist`].
    pub fn should_persist(&self, last_activity: Timestamp, now: Timestamp) -> bool {
        should_persist(last_activity, now, self.min_interval_secs)
    }
}

impl Default for ActivityThrottler {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_INTERVAL_SECS)
    }
}
