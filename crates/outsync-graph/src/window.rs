//! Calendar sync windows.

use chrono::{DateTime, Duration, Utc};

/// Half-open UTC time range `[start, end)` bounding calendar-view queries.
///
/// Callers always pass a window explicitly; the constructors here produce
/// the two canonical ones. `now` is an argument so windows are
/// deterministic under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SyncWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window for a full sync: configured day offsets around `now`.
    pub fn from_days(now: DateTime<Utc>, lookback_days: u32, lookahead_days: u32) -> Self {
        Self {
            start: now - Duration::days(i64::from(lookback_days)),
            end: now + Duration::days(i64::from(lookahead_days)),
        }
    }

    /// Window for the re-sync after a mutation: starts just before `now`
    /// so the created or edited event is always inside it.
    pub fn after_mutation(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::minutes(1),
            end: now + Duration::days(30),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-02-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_from_days_offsets() {
        let now = fixed_now();
        let window = SyncWindow::from_days(now, 1, 30);
        assert_eq!(window.start, now - Duration::days(1));
        assert_eq!(window.end, now + Duration::days(30));
    }

    #[test]
    fn test_after_mutation_offsets() {
        let now = fixed_now();
        let window = SyncWindow::after_mutation(now);
        assert_eq!(window.start, now - Duration::minutes(1));
        assert_eq!(window.end, now + Duration::days(30));
    }

    #[test]
    fn test_zero_lookahead_window_ends_at_now() {
        let now = fixed_now();
        let window = SyncWindow::from_days(now, 0, 0);
        assert_eq!(window.start, now);
        assert_eq!(window.end, now);
    }
}
