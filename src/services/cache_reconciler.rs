//! Cache Reconciler
//!
//! Decides per session whether the previous report's row can be reused or
//! the session must be aggregated again. A cached row is trusted once the
//! session it describes can no longer change: the session was completed or
//! abandoned when the row was written, or it is still open but has exactly
//! the same number of items as the live database. A row written while the
//! session was open is never reused once the live session has finalized,
//! even if the item count matches, because finalization itself changes the
//! reported fields.

use crate::models::CachedSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    /// Reuse the cached row and its stat rows as-is.
    Hit,
    /// Recompute the session from the database.
    Miss,
}

pub fn decide(
    entry: Option<&CachedSession>,
    live_finalized: bool,
    live_item_count: i64,
) -> CacheDecision {
    let Some(entry) = entry else {
        return CacheDecision::Miss;
    };

    let cached_finalized = entry.completed() || entry.abandoned();
    if cached_finalized {
        return CacheDecision::Hit;
    }

    // Cached while still open: only current if nothing was added since and
    // the session has not finalized in the meantime.
    if live_finalized {
        return CacheDecision::Miss;
    }
    if entry.total_items() == Some(live_item_count) {
        CacheDecision::Hit
    } else {
        CacheDecision::Miss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportRow;

    fn entry(completed: bool, abandoned: bool, total: Option<&str>) -> CachedSession {
        let mut row = ReportRow::new();
        row.set("Directory Name", "abc123");
        row.set("Completed", completed);
        row.set("Abandoned", abandoned);
        if let Some(total) = total {
            row.set("Total items", total);
        }
        CachedSession::new(row)
    }

    #[test]
    fn test_unknown_session_is_a_miss() {
        assert_eq!(decide(None, false, 5), CacheDecision::Miss);
        assert_eq!(decide(None, true, 5), CacheDecision::Miss);
    }

    #[test]
    fn test_finalized_cache_row_always_hits() {
        let done = entry(true, false, Some("5"));
        assert_eq!(decide(Some(&done), true, 5), CacheDecision::Hit);
        // Item count drift does not matter once the row was finalized.
        assert_eq!(decide(Some(&done), true, 9), CacheDecision::Hit);

        let dropped = entry(false, true, Some("2"));
        assert_eq!(decide(Some(&dropped), true, 2), CacheDecision::Hit);
    }

    #[test]
    fn test_open_row_hits_only_on_matching_count() {
        let open = entry(false, false, Some("4"));
        assert_eq!(decide(Some(&open), false, 4), CacheDecision::Hit);
        assert_eq!(decide(Some(&open), false, 5), CacheDecision::Miss);
    }

    #[test]
    fn test_finalization_transition_forces_recompute() {
        // Row cached while open, session finalized since: the count still
        // matches but the row predates completion.
        let open = entry(false, false, Some("4"));
        assert_eq!(decide(Some(&open), true, 4), CacheDecision::Miss);
    }

    #[test]
    fn test_unparseable_total_misses_when_open() {
        let odd = entry(false, false, Some("many"));
        assert_eq!(decide(Some(&odd), false, 3), CacheDecision::Miss);

        let absent = entry(false, false, None);
        assert_eq!(decide(Some(&absent), false, 0), CacheDecision::Miss);
    }
}
