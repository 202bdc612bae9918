//! Time-of-day scoring for the reminder index.
//!
//! A daily-recurring reminder is indexed by its wall-clock time of day,
//! expressed as seconds since midnight. One index entry then serves the
//! reminder every day without re-insertion.

use chrono::{NaiveTime, Timelike};

/// Number of seconds in one day.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Convert a wall-clock time of day into its index score
/// (seconds since midnight, `0..86400`).
pub fn time_score(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight()
}

/// A closed score range `[lo, hi]` within a single day.
pub type ScoreRange = (u32, u32);

/// Compute the score ranges covered by `[center - half_window, center + half_window]`.
///
/// A window that straddles midnight is split into two ranges, one at each
/// end of the day, so a 23:50 reminder is still found by a 00:05 poll.
/// A half-window of 12 hours or more covers the whole day.
pub fn window_ranges(center: NaiveTime, half_window_seconds: u32) -> Vec<ScoreRange> {
    let center = time_score(center);

    if half_window_seconds >= SECONDS_PER_DAY / 2 {
        return vec![(0, SECONDS_PER_DAY - 1)];
    }

    let lo = center as i64 - half_window_seconds as i64;
    let hi = center as i64 + half_window_seconds as i64;

    match (lo < 0, hi >= SECONDS_PER_DAY as i64) {
        (false, false) => vec![(lo as u32, hi as u32)],
        // Window starts yesterday evening: [wrap, 23:59:59] ∪ [0, hi].
        (true, false) => vec![
            ((SECONDS_PER_DAY as i64 + lo) as u32, SECONDS_PER_DAY - 1),
            (0, hi as u32),
        ],
        // Window ends tomorrow morning: [lo, 23:59:59] ∪ [0, wrap].
        (false, true) => vec![
            (lo as u32, SECONDS_PER_DAY - 1),
            (0, (hi - SECONDS_PER_DAY as i64) as u32),
        ],
        // Excluded by the half-day clamp above.
        (true, true) => vec![(0, SECONDS_PER_DAY - 1)],
    }
}

/// Check whether a score falls inside any of the given ranges.
pub fn ranges_contain(ranges: &[ScoreRange], score: u32) -> bool {
    ranges.iter().any(|&(lo, hi)| score >= lo && score <= hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    #[test]
    fn test_time_score() {
        assert_eq!(time_score(t(0, 0)), 0);
        assert_eq!(time_score(t(9, 0)), 9 * 3600);
        assert_eq!(time_score(t(23, 59)), 23 * 3600 + 59 * 60);
    }

    #[test]
    fn test_plain_window() {
        let ranges = window_ranges(t(9, 0), 1800);
        assert_eq!(ranges, vec![(9 * 3600 - 1800, 9 * 3600 + 1800)]);
    }

    #[test]
    fn test_window_straddling_midnight_backward() {
        // Poll at 00:05 with ±30min reaches back to 23:35.
        let ranges = window_ranges(t(0, 5), 1800);
        assert_eq!(ranges.len(), 2);
        assert!(ranges_contain(&ranges, time_score(t(23, 50))));
        assert!(ranges_contain(&ranges, time_score(t(0, 20))));
        assert!(!ranges_contain(&ranges, time_score(t(1, 0))));
    }

    #[test]
    fn test_window_straddling_midnight_forward() {
        // Poll at 23:50 with ±30min reaches into 00:20.
        let ranges = window_ranges(t(23, 50), 1800);
        assert_eq!(ranges.len(), 2);
        assert!(ranges_contain(&ranges, time_score(t(0, 10))));
        assert!(ranges_contain(&ranges, time_score(t(23, 30))));
        assert!(!ranges_contain(&ranges, time_score(t(12, 0))));
    }

    #[test]
    fn test_half_day_window_covers_everything() {
        let ranges = window_ranges(t(6, 0), SECONDS_PER_DAY / 2);
        assert_eq!(ranges, vec![(0, SECONDS_PER_DAY - 1)]);
    }
}
