//! Gap detection and range coalescing.
//!
//! [`missing`] subtracts the cached days from the requested business days;
//! [`coalesce`] folds the ascending result into maximal runs of consecutive
//! calendar days so each run costs one fetch. Runs never bridge a weekend:
//! Friday and the following Monday are three days apart, so they land in
//! separate ranges.

use std::{collections::HashSet, fmt};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;

/// Anything that names a calendar day, possibly with a time component.
///
/// Stored dates may come back as midnight timestamps or with an offset while
/// the calendar produces plain dates; comparing through this trait truncates
/// both sides to the day first.
pub trait CalendarDay {
    fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> NaiveDate {
        self.date_naive()
    }
}

impl<T: CalendarDay + ?Sized> CalendarDay for &T {
    fn calendar_day(&self) -> NaiveDate {
        (**self).calendar_day()
    }
}

/// Requested days that are not cached, in the order they were requested.
///
/// An empty result means the cache already covers the request.
pub fn missing<I>(requested: &[NaiveDate], cached: I) -> Vec<NaiveDate>
where
    I: IntoIterator,
    I::Item: CalendarDay,
{
    let cached: HashSet<NaiveDate> = cached.into_iter().map(|c| c.calendar_day()).collect();
    requested
        .iter()
        .copied()
        .filter(|d| !cached.contains(d))
        .collect()
}

/// Inclusive run of consecutive missing days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// A range covering one day.
    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// Number of calendar days covered.
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Every day in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Coalesces ascending, duplicate-free days into maximal consecutive ranges.
///
/// Single sweep: extend the open range while the next day is exactly one day
/// after its end, otherwise close it and open a new one.
pub fn coalesce(missing: &[NaiveDate]) -> Vec<DateRange> {
    let mut out = Vec::new();
    let mut it = missing.iter().copied();
    let Some(first) = it.next() else {
        return out;
    };

    debug_assert!(
        missing.windows(2).all(|w| w[0] < w[1]),
        "coalesce expects ascending, duplicate-free input"
    );

    let mut current = DateRange::single(first);
    for d in it {
        if (d - current.end).num_days() == 1 {
            current.end = d;
            continue;
        }
        out.push(current);
        current = DateRange::single(d);
    }
    out.push(current);
    out
}

/// Expands ranges back into individual days.
pub fn flatten(ranges: &[DateRange]) -> Vec<NaiveDate> {
    ranges.iter().flat_map(|r| r.days()).collect()
}
