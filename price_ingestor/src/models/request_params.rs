use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Parameters for requesting daily closes from any price source.
///
/// Both bounds are **inclusive** calendar days. Providers whose upstream API
/// treats the end as exclusive must widen the request themselves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClosesParams {
    /// Ticker symbol as the source expects it (e.g. `"AAPL"`, `"^GSPC"`).
    pub symbol: String,
    /// First requested day (inclusive).
    pub start: NaiveDate,
    /// Last requested day (inclusive).
    pub end: NaiveDate,
}

impl DailyClosesParams {
    pub fn new(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            start,
            end,
        }
    }

    /// True if `date` falls inside the requested window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
