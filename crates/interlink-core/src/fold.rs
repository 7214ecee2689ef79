//! Directional timestamp folds shared by the aggregators.
//!
//! Every fold here is commutative, so aggregation does not depend on the
//! order in which the source rows arrive.

use chrono::{DateTime, Utc};

pub type Timestamp = DateTime<Utc>;

/// Keep the most recent timestamp seen so far.
pub fn latest(slot: &mut Option<Timestamp>, candidate: Option<Timestamp>) {
    if let Some(ts) = candidate {
        if slot.map_or(true, |current| ts > current) {
            *slot = Some(ts);
        }
    }
}

/// Keep the earliest timestamp seen so far.
pub fn earliest(slot: &mut Option<Timestamp>, candidate: Option<Timestamp>) {
    if let Some(ts) = candidate {
        if slot.map_or(true, |current| ts < current) {
            *slot = Some(ts);
        }
    }
}

/// Whether `candidate` should replace `current`, each a `(stamp, value)` pair.
///
/// The later stamp wins and a stamped value beats an unstamped one. On equal
/// stamps the greater value wins, so the result never depends on row order.
pub fn supersedes<T: PartialOrd>(
    current: Option<(Option<Timestamp>, &T)>,
    candidate: (Option<Timestamp>, &T),
) -> bool {
    let Some((current_at, current_value)) = current else {
        return true;
    };
    match (candidate.0, current_at) {
        (Some(c), Some(cur)) if c != cur => c > cur,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        _ => candidate.1 > current_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    #[test]
    fn test_latest_takes_max() {
        let mut slot = None;
        latest(&mut slot, Some(ts(10)));
        latest(&mut slot, Some(ts(30)));
        latest(&mut slot, Some(ts(20)));
        latest(&mut slot, None);
        assert_eq!(slot, Some(ts(30)));
    }

    #[test]
    fn test_earliest_takes_min() {
        let mut slot = None;
        earliest(&mut slot, Some(ts(20)));
        earliest(&mut slot, Some(ts(10)));
        earliest(&mut slot, Some(ts(15)));
        assert_eq!(slot, Some(ts(10)));
    }

    #[test]
    fn test_supersedes_prefers_later_stamp() {
        assert!(supersedes(None, (None, &1.0)));
        assert!(supersedes(Some((Some(ts(1)), &5.0)), (Some(ts(2)), &1.0)));
        assert!(!supersedes(Some((Some(ts(2)), &1.0)), (Some(ts(1)), &5.0)));
        assert!(!supersedes(Some((Some(ts(2)), &1.0)), (None, &5.0)));
        assert!(supersedes(Some((None, &5.0)), (Some(ts(1)), &1.0)));
    }

    #[test]
    fn test_supersedes_breaks_ties_by_value() {
        // Same stamp: the outcome must not depend on which row came first.
        assert!(supersedes(Some((Some(ts(2)), &3.0)), (Some(ts(2)), &4.0)));
        assert!(!supersedes(Some((Some(ts(2)), &4.0)), (Some(ts(2)), &3.0)));
        assert!(!supersedes(Some((Some(ts(2)), &4.0)), (Some(ts(2)), &4.0)));
        assert!(supersedes(Some((None, &"a")), (None, &"b")));
    }
}
