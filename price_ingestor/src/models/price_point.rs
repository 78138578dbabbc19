//! Canonical in-memory representation of one daily closing price.
//!
//! This struct is the output of every [`PriceSource`](crate::providers::PriceSource)
//! implementation and the unit the cache persists and reads back.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};
use serde::{Deserialize, Serialize};

/// A closing price for one calendar day.
///
/// The close always carries exactly [`PricePoint::CLOSE_SCALE`] fraction digits;
/// [`PricePoint::new`] rounds half away from zero, matching a `DECIMAL(10, 2)` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading day (no time component).
    pub date: NaiveDate,
    /// Closing price, 2 fraction digits.
    pub close: Decimal,
}

impl PricePoint {
    /// Number of fraction digits kept for closing prices.
    pub const CLOSE_SCALE: u32 = 2;

    pub fn new(date: NaiveDate, close: Decimal) -> Self {
        let mut close =
            close.round_dp_with_strategy(Self::CLOSE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        close.rescale(Self::CLOSE_SCALE);
        Self { date, close }
    }

    /// Builds a point from a float quote. Returns `None` for NaN or infinite input.
    pub fn from_f64(date: NaiveDate, close: f64) -> Option<Self> {
        Decimal::from_f64(close).map(|c| Self::new(date, c))
    }
}
