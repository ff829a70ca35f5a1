//! Streak calculation over the set of logged days.
//!
//! Only the distinct dates matter. Input order and duplicates are ignored.

use crate::dates;
use crate::models::DailyEntry;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Current and longest consecutive-day runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakInfo {
    /// Run ending today, or yesterday if today is not logged yet.
    pub current: u32,
    /// Longest run ever logged.
    pub longest: u32,
}

impl StreakInfo {
    /// Streaks for the dates of `entries`, anchored at `today`.
    pub fn from_entries(entries: &[DailyEntry], today: NaiveDate) -> Self {
        Self::from_days(entries.iter().map(|e| e.date), today)
    }

    /// Streaks for an arbitrary collection of logged days.
    pub fn from_days(days: impl IntoIterator<Item = NaiveDate>, today: NaiveDate) -> Self {
        let days: BTreeSet<NaiveDate> = days.into_iter().collect();
        Self {
            current: current_streak(&days, today),
            longest: longest_streak(&days),
        }
    }
}

/// Consecutive logged days counted backward from today, or from yesterday
/// when today has no entry yet. Zero once both are missing.
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let anchor = if days.contains(&today) {
        Some(today)
    } else {
        today.pred_opt().filter(|yesterday| days.contains(yesterday))
    };

    let mut streak = 0;
    let mut cursor = anchor;
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

/// Longest run of consecutive calendar days in `days`.
pub fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &day in days.iter().rev() {
        run = match previous {
            Some(later) if dates::days_between(later, day) == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    /// Days logged `offsets` days before `today()`.
    fn streaks(offsets: &[i64]) -> StreakInfo {
        StreakInfo::from_days(
            offsets.iter().map(|&n| dates::add_days(today(), -n)),
            today(),
        )
    }

    #[test]
    fn test_empty() {
        assert_eq!(streaks(&[]), StreakInfo { current: 0, longest: 0 });
    }

    #[test]
    fn test_today_only() {
        assert_eq!(streaks(&[0]), StreakInfo { current: 1, longest: 1 });
    }

    #[test]
    fn test_today_without_yesterday() {
        assert_eq!(streaks(&[0, 2, 3]), StreakInfo { current: 1, longest: 2 });
    }

    #[test]
    fn test_three_day_run_with_gap_before() {
        assert_eq!(streaks(&[0, 1, 2, 4]), StreakInfo { current: 3, longest: 3 });
    }

    #[test]
    fn test_yesterday_keeps_streak_alive() {
        assert_eq!(streaks(&[1, 2, 3]), StreakInfo { current: 3, longest: 3 });
    }

    #[test]
    fn test_two_days_missed_breaks_streak() {
        assert_eq!(streaks(&[2]), StreakInfo { current: 0, longest: 1 });
        assert_eq!(streaks(&[2, 3, 4, 5]), StreakInfo { current: 0, longest: 4 });
    }

    #[test]
    fn test_isolated_older_entry() {
        assert_eq!(streaks(&[0, 1, 2, 3, 5]), StreakInfo { current: 4, longest: 4 });
    }

    #[test]
    fn test_longest_can_be_in_the_past() {
        assert_eq!(
            streaks(&[0, 1, 10, 11, 12, 13, 14, 20]),
            StreakInfo { current: 2, longest: 5 }
        );
    }

    #[test]
    fn test_logging_today_extends_streak() {
        let before = streaks(&[1, 2, 3, 4]);
        let after = streaks(&[0, 1, 2, 3, 4]);
        assert_eq!(after.current, before.current + 1);
    }

    #[test]
    fn test_duplicates_and_order_ignored() {
        assert_eq!(streaks(&[2, 0, 1, 0, 1]), streaks(&[0, 1, 2]));
    }

    #[test]
    fn test_run_across_month_and_year() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let info = StreakInfo::from_days(
            [
                NaiveDate::from_ymd_opt(2024, 12, 30).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                today,
            ],
            today,
        );
        assert_eq!(info, StreakInfo { current: 3, longest: 3 });
    }

    #[test]
    fn test_future_entries_do_not_anchor() {
        // A day logged after "today" (clock moved back) is not the anchor.
        assert_eq!(streaks(&[-1]), StreakInfo { current: 0, longest: 1 });
        assert_eq!(streaks(&[-1, 0, 1]), StreakInfo { current: 2, longest: 3 });
    }

    proptest! {
        #[test]
        fn prop_streak_bounds(offsets in prop::collection::vec(0i64..60, 0..40)) {
            let info = streaks(&offsets);
            let distinct = offsets.iter().collect::<BTreeSet<_>>().len() as u32;

            prop_assert!(info.current <= info.longest);
            prop_assert!(info.longest <= distinct);
            prop_assert_eq!(info.longest == 0, offsets.is_empty());
        }

        #[test]
        fn prop_order_independent(mut offsets in prop::collection::vec(0i64..30, 0..20)) {
            let forward = streaks(&offsets);
            offsets.reverse();
            prop_assert_eq!(forward, streaks(&offsets));
        }

        #[test]
        fn prop_full_run(len in 1i64..100) {
            let offsets: Vec<i64> = (0..len).collect();
            let info = streaks(&offsets);
            prop_assert_eq!(info.current as i64, len);
            prop_assert_eq!(info.longest as i64, len);
        }
    }
}
