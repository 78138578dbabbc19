//! Business-day calendar.
//!
//! Monday to Friday only; no exchange holiday calendar is applied, so a
//! holiday shows up as a business day the price source has no quote for.

use chrono::{Datelike, NaiveDate, Weekday};

/// True for Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All business days in `[start, end]`, ascending.
///
/// Returns an empty vector when `start > end`.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_business_day(*d))
        .collect()
}
