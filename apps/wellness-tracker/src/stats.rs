//! Aggregate statistics and the weekly chart view.
//!
//! Everything here is a pure projection of the entry collection and is
//! recomputed on every read.

use crate::dates;
use crate::models::{DailyEntry, DayRecord, WellnessStats};
use crate::streak::StreakInfo;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Days in the weekly view.
pub const WEEK_LEN: usize = 7;

/// Streaks, averages and totals over all entries.
pub fn compute(entries: &[DailyEntry], today: NaiveDate) -> WellnessStats {
    if entries.is_empty() {
        return WellnessStats::default();
    }

    let streak = StreakInfo::from_entries(entries, today);
    let count = entries.len() as f64;
    let total_sleep: f64 = entries.iter().map(|e| e.sleep).sum();
    let total_movement: f64 = entries.iter().map(|e| e.movement).sum();

    WellnessStats {
        current_streak: streak.current,
        longest_streak: streak.longest,
        total_entries: entries.len(),
        average_sleep: total_sleep / count,
        average_movement: total_movement / count,
        total_gratitude_items: entries.iter().map(DailyEntry::gratitude_count).sum(),
    }
}

/// The seven days ending at `today`, oldest first. Days without an entry
/// are zeroed with `has_entry == false`.
pub fn weekly_view(entries: &[DailyEntry], today: NaiveDate) -> [DayRecord; WEEK_LEN] {
    let by_date: HashMap<NaiveDate, &DailyEntry> = entries.iter().map(|e| (e.date, e)).collect();

    std::array::from_fn(|i| {
        let date = dates::add_days(today, i as i64 - (WEEK_LEN as i64 - 1));
        let day_name = dates::short_weekday(date);

        match by_date.get(&date) {
            Some(entry) => DayRecord {
                date,
                day_name,
                sleep: entry.sleep,
                movement: entry.movement,
                gratitude_count: entry.gratitude_count(),
                has_entry: true,
            },
            None => DayRecord {
                date,
                day_name,
                sleep: 0.0,
                movement: 0.0,
                gratitude_count: 0,
                has_entry: false,
            },
        }
    })
}

/// Share of the week's days that were logged, as a rounded percentage.
pub fn weekly_completion_percent(week: &[DayRecord]) -> u32 {
    if week.is_empty() {
        return 0;
    }
    let logged = week.iter().filter(|d| d.has_entry).count();
    (logged as f64 / week.len() as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryDraft;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn entry(days_ago: i64, sleep: f64, movement: f64, notes: &[&str]) -> DailyEntry {
        let mut draft = EntryDraft::new(dates::add_days(today(), -days_ago))
            .with_sleep(sleep)
            .with_movement(movement);
        for (i, note) in notes.iter().enumerate() {
            draft = draft.with_gratitude(i, *note);
        }
        DailyEntry::new(draft, Utc.with_ymd_and_hms(2024, 5, 20, 8, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_stats_are_zero() {
        assert_eq!(
            compute(&[], today()),
            WellnessStats {
                current_streak: 0,
                longest_streak: 0,
                total_entries: 0,
                average_sleep: 0.0,
                average_movement: 0.0,
                total_gratitude_items: 0,
            }
        );
    }

    #[test]
    fn test_averages_and_totals() {
        let entries = vec![
            entry(0, 8.0, 30.0, &["a", "b", "c"]),
            entry(1, 6.0, 10.0, &["a", " ", ""]),
            entry(3, 7.0, 50.0, &[]),
        ];
        let stats = compute(&entries, today());

        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.average_sleep, 7.0);
        assert_eq!(stats.average_movement, 30.0);
        assert_eq!(stats.total_gratitude_items, 4);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn test_streak_fields_match_calculator() {
        let entries: Vec<_> = [0, 1, 2, 3, 5]
            .iter()
            .map(|&n| entry(n, 7.0, 0.0, &[]))
            .collect();
        let stats = compute(&entries, today());
        assert_eq!(stats.current_streak, 4);
        assert_eq!(stats.longest_streak, 4);
    }

    #[test]
    fn test_weekly_view_empty() {
        let week = weekly_view(&[], today());

        assert_eq!(week.len(), WEEK_LEN);
        assert_eq!(week[0].date, dates::add_days(today(), -6));
        assert_eq!(week[6].date, today());
        assert!(week.iter().all(|d| !d.has_entry));
        assert!(week.iter().all(|d| d.sleep == 0.0 && d.movement == 0.0));
        assert!(week.iter().all(|d| d.gratitude_count == 0));
    }

    #[test]
    fn test_weekly_view_single_entry() {
        let week = weekly_view(&[entry(2, 7.5, 25.0, &["x", "y"])], today());

        let logged: Vec<_> = week.iter().filter(|d| d.has_entry).collect();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].date, dates::add_days(today(), -2));
        assert_eq!(logged[0].sleep, 7.5);
        assert_eq!(logged[0].movement, 25.0);
        assert_eq!(logged[0].gratitude_count, 2);
        assert_eq!(week[4].date, logged[0].date);
    }

    #[test]
    fn test_weekly_view_thirty_entries() {
        let entries: Vec<_> = (0..30).map(|n| entry(n, 8.0, 30.0, &["a"])).collect();
        let week = weekly_view(&entries, today());

        assert_eq!(week.len(), WEEK_LEN);
        assert!(week.iter().all(|d| d.has_entry));
        assert!(week.windows(2).all(|w| dates::days_between(w[1].date, w[0].date) == 1));
    }

    #[test]
    fn test_weekly_day_names() {
        // 2024-05-20 is a Monday.
        let week = weekly_view(&[], today());
        let names: Vec<_> = week.iter().map(|d| d.day_name.as_str()).collect();
        assert_eq!(names, ["Tue", "Wed", "Thu", "Fri", "Sat", "Sun", "Mon"]);
    }

    #[test]
    fn test_weekly_completion_percent() {
        assert_eq!(weekly_completion_percent(&weekly_view(&[], today())), 0);

        let entries = vec![entry(0, 7.0, 0.0, &[]), entry(1, 7.0, 0.0, &[]), entry(6, 7.0, 0.0, &[])];
        assert_eq!(weekly_completion_percent(&weekly_view(&entries, today())), 43);

        let entries: Vec<_> = (0..7).map(|n| entry(n, 7.0, 0.0, &[])).collect();
        assert_eq!(weekly_completion_percent(&weekly_view(&entries, today())), 100);
    }

    proptest! {
        #[test]
        fn prop_weekly_view_always_seven(offsets in prop::collection::btree_set(0i64..60, 0..40)) {
            let entries: Vec<_> = offsets.iter().map(|&n| entry(n, 7.0, 10.0, &["a"])).collect();
            let week = weekly_view(&entries, today());

            prop_assert_eq!(week.len(), WEEK_LEN);
            prop_assert_eq!(week[WEEK_LEN - 1].date, today());
            let expected = offsets.iter().filter(|&&n| n < WEEK_LEN as i64).count();
            prop_assert_eq!(week.iter().filter(|d| d.has_entry).count(), expected);
        }

        #[test]
        fn prop_averages_within_bounds(values in prop::collection::vec((0.0f64..12.0, 0.0f64..120.0), 1..30)) {
            let entries: Vec<_> = values
                .iter()
                .enumerate()
                .map(|(i, &(s, m))| entry(i as i64, s, m, &[]))
                .collect();
            let stats = compute(&entries, today());

            prop_assert!(stats.average_sleep >= 0.0 && stats.average_sleep <= 12.0 + 1e-9);
            prop_assert!(stats.average_movement >= 0.0 && stats.average_movement <= 120.0 + 1e-9);
            prop_assert_eq!(stats.total_entries, values.len());
        }
    }
}
