//! Date parsing helpers for the CLI edge and the database.
//!
//! - [`parse_user_date`]: strict `YYYY-MM-DD` input from the command line.
//! - [`parse_stored_day`]: lenient reader for the `daily_close.date` column.
//!   Rows written by this crate are plain dates, but rows imported by other
//!   tools may carry a time (`2024-06-10 00:00:00`) or an RFC 3339 offset.
//!   Everything is truncated to the calendar day.
//! - [`to_db_day`]: the one format this crate writes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::errors::ValidationError;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date as typed by a user.
pub fn parse_user_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DAY_FORMAT).map_err(|_| ValidationError::MalformedDate {
        input: s.to_string(),
    })
}

/// Parse both ends of a requested window and make sure they are ordered.
pub fn parse_window(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let start = parse_user_date(start)?;
    let end = parse_user_date(end)?;
    if start > end {
        return Err(ValidationError::StartAfterEnd { start, end });
    }
    Ok((start, end))
}

/// Parse a stored date in any of the accepted shapes, dropping the time part.
pub fn parse_stored_day(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, DAY_FORMAT) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Format a day the way the `daily_close.date` column stores it.
pub fn to_db_day(d: NaiveDate) -> String {
    d.format(DAY_FORMAT).to_string()
}
