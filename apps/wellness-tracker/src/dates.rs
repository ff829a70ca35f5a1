//! Calendar-day helpers.
//!
//! A day key is a [`NaiveDate`]: year, month and day with no time component.
//! Arithmetic works on dates rather than elapsed time, so a daylight-saving
//! transition can never push a result onto a neighbouring day.

use chrono::{Duration, Local, NaiveDate};
use thiserror::Error;

/// Storage format of a day key.
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Date parsing errors.
#[derive(Debug, Error)]
pub enum DateError {
    #[error("Invalid day key '{0}', expected YYYY-MM-DD")]
    InvalidKey(String),
}

/// Current calendar day in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The day `n` days after `day`, or before it when `n` is negative.
///
/// Panics if the result falls outside the range chrono can represent.
pub fn add_days(day: NaiveDate, n: i64) -> NaiveDate {
    day + Duration::days(n)
}

/// Number of calendar days from `b` to `a`; positive when `a` is later.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    a.signed_duration_since(b).num_days()
}

/// Parse a `YYYY-MM-DD` day key.
pub fn parse_day_key(s: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(s.trim(), DAY_KEY_FORMAT)
        .map_err(|_| DateError::InvalidKey(s.to_string()))
}

/// Format a day as its `YYYY-MM-DD` key.
pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_KEY_FORMAT).to_string()
}

/// Abbreviated weekday name ("Mon", "Tue", ...).
pub fn short_weekday(day: NaiveDate) -> String {
    day.format("%a").to_string()
}

/// "Today", "Yesterday", or a short date like "Mon, Jan 5".
pub fn relative_label(day: NaiveDate, today: NaiveDate) -> String {
    match days_between(today, day) {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        _ => day.format("%a, %b %-d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_add_days_crosses_month_and_year() {
        assert_eq!(add_days(d(2024, 1, 31), 1), d(2024, 2, 1));
        assert_eq!(add_days(d(2024, 1, 1), -1), d(2023, 12, 31));
        assert_eq!(add_days(d(2024, 3, 1), -1), d(2024, 2, 29));
        assert_eq!(add_days(d(2023, 3, 1), -1), d(2023, 2, 28));
        assert_eq!(add_days(d(2024, 6, 15), 0), d(2024, 6, 15));
    }

    #[test]
    fn test_add_days_over_dst_change() {
        // US and EU clocks change on these dates; date math must not care.
        assert_eq!(add_days(d(2024, 3, 10), 1), d(2024, 3, 11));
        assert_eq!(add_days(d(2024, 10, 27), -1), d(2024, 10, 26));
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(d(2024, 1, 10), d(2024, 1, 3)), 7);
        assert_eq!(days_between(d(2024, 1, 3), d(2024, 1, 10)), -7);
        assert_eq!(days_between(d(2024, 3, 1), d(2024, 2, 28)), 2);
        assert_eq!(days_between(d(2025, 1, 1), d(2024, 12, 31)), 1);
    }

    #[test]
    fn test_today_is_stable() {
        let a = today();
        let b = today();
        // Only differs if the test straddles local midnight.
        assert!(days_between(b, a) <= 1);
    }

    #[test]
    fn test_parse_day_key() {
        assert_eq!(parse_day_key("2024-02-29").unwrap(), d(2024, 2, 29));
        assert_eq!(parse_day_key(" 2024-01-05 ").unwrap(), d(2024, 1, 5));
        assert!(parse_day_key("2023-02-29").is_err());
        assert!(parse_day_key("yesterday").is_err());
        assert!(parse_day_key("").is_err());
    }

    #[test]
    fn test_day_key_round_trip() {
        let day = d(2024, 7, 4);
        assert_eq!(day_key(day), "2024-07-04");
        assert_eq!(parse_day_key(&day_key(day)).unwrap(), day);
    }

    #[test]
    fn test_relative_label() {
        let today = d(2024, 1, 8);
        assert_eq!(relative_label(today, today), "Today");
        assert_eq!(relative_label(d(2024, 1, 7), today), "Yesterday");
        assert_eq!(relative_label(d(2024, 1, 5), today), "Fri, Jan 5");
        assert_eq!(short_weekday(today), "Mon");
    }
}
