//! Eviction policy: which session goes when an account is over its limit.
//!
//! The least-recently-active session is evicted, like an LRU cache keyed
//! on an explicit activity timestamp rather than access order. Selection
//! is a pure function over a snapshot of the set; removing the victim and
//! persisting the result is the enforcer's job.

use logincap_protocol::{AccountSessionSet, SessionToken, Timestamp};

/// Picks the session with the oldest activity timestamp.
///
/// - Records without a `last_activity` count as active at `now`, so a
///   missing field never makes a session look like the oldest.
/// - Ties go to the smallest token: the set iterates in token order and
///   the first minimum found wins.
///
/// Returns `None` only for an empty set. The returned token is always
/// present in `sessions`.
pub fn select_victim(
    sessions: &AccountSessionSet,
    now: Timestamp,
) -> Option<&SessionToken> {
    // `min_by_key` returns the FIRST minimum on ties, which is what gives
    // us the documented tie-break.
    sessions
        .iter()
        .min_by_key(|(_, record)| record.activity_or(now))
        .map(|(token, _)| token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logincap_protocol::SessionRecord;

    fn record(login: u64, last: Option<u64>) -> SessionRecord {
        SessionRecord {
            login_time: Timestamp(login),
            last_activity: last.map(Timestamp),
        }
    }

    fn set(entries: &[(&str, Option<u64>)]) -> AccountSessionSet {
        entries
            .iter()
            .map(|(t, last)| (SessionToken::new(*t), record(0, *last)))
            .collect()
    }

    fn victim(sessions: &AccountSessionSet, now: u64) -> Option<&str> {
        select_victim(sessions, Timestamp(now)).map(SessionToken::as_str)
    }

    #[test]
    fn test_select_victim_empty_set_returns_none() {
        assert_eq!(victim(&AccountSessionSet::new(), 100), None);
    }

    #[test]
    fn test_select_victim_single_session_returns_it() {
        assert_eq!(victim(&set(&[("a", Some(5))]), 100), Some("a"));
    }

    #[test]
    fn test_select_victim_picks_oldest_activity() {
        let sessions =
            set(&[("A", Some(100)), ("B", Some(200)), ("C", Some(150))]);

        assert_eq!(victim(&sessions, 300), Some("A"));
    }

    #[test]
    fn test_select_victim_ignores_login_time() {
        // Oldest login is not the target; oldest activity is.
        let sessions: AccountSessionSet = [
            (SessionToken::new("early"), record(1, Some(500))),
            (SessionToken::new("late"), record(400, Some(450))),
        ]
        .into_iter()
        .collect();

        assert_eq!(victim(&sessions, 600), Some("late"));
    }

    #[test]
    fn test_select_victim_missing_activity_counts_as_now() {
        let sessions = set(&[("fresh", None), ("stale", Some(10))]);

        assert_eq!(victim(&sessions, 100), Some("stale"));
    }

    #[test]
    fn test_select_victim_missing_activity_older_than_future_timestamps() {
        // A record stamped after `now` (clock skew) is newer than one
        // treated as "now".
        let sessions = set(&[("skewed", Some(500)), ("unknown", None)]);

        assert_eq!(victim(&sessions, 100), Some("unknown"));
    }

    #[test]
    fn test_select_victim_tie_goes_to_smallest_token() {
        let sessions = set(&[("m", Some(10)), ("b", Some(10)), ("x", Some(10))]);

        assert_eq!(victim(&sessions, 100), Some("b"));
    }

    #[test]
    fn test_select_victim_result_is_minimum_of_all() {
        let sessions = set(&[
            ("a", Some(40)),
            ("b", Some(20)),
            ("c", None),
            ("d", Some(35)),
            ("e", Some(20)),
        ]);
        let now = Timestamp(100);

        let chosen = select_victim(&sessions, now).unwrap();
        let chosen_activity = sessions.get(chosen).unwrap().activity_or(now);

        for (_, record) in &sessions {
            assert!(chosen_activity <= record.activity_or(now));
        }
    }
}
