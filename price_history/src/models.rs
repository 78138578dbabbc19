//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`]:
//! - [`crate::schema::tracked_ticker`]: tickers set up for caching
//! - [`crate::schema::daily_close`]: one cached close per ticker and day

use std::str::FromStr;

use diesel::prelude::*;
use price_ingestor::models::price_point::PricePoint;
use rust_decimal::Decimal;

use crate::{dates, errors::StoreError, schema::*};

/// A row in [`crate::schema::daily_close`].
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = daily_close, check_for_backend(diesel::sqlite::Sqlite))]
pub struct DailyCloseRow {
    /// Ticker symbol, FK to [`crate::schema::tracked_ticker`].
    pub ticker: String,
    /// Trading day; written as `YYYY-MM-DD`.
    pub date: String,
    /// Decimal text with two fraction digits.
    pub close: String,
}

impl DailyCloseRow {
    /// Parse the row into a [`PricePoint`], normalizing the stored date.
    pub fn into_point(self) -> Result<PricePoint, StoreError> {
        let date = dates::parse_stored_day(&self.date).ok_or_else(|| StoreError::CorruptRow {
            ticker: self.ticker.clone(),
            reason: format!("unreadable date '{}'", self.date),
        })?;
        let close = Decimal::from_str(self.close.trim()).map_err(|e| StoreError::CorruptRow {
            ticker: self.ticker.clone(),
            reason: format!("unreadable close '{}' on {date}: {e}", self.close),
        })?;
        Ok(PricePoint::new(date, close))
    }
}

/// Insertable form of [`DailyCloseRow`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = daily_close)]
pub struct NewDailyClose<'a> {
    pub ticker: &'a str,
    pub date: String,
    pub close: String,
}

impl<'a> NewDailyClose<'a> {
    pub fn from_point(ticker: &'a str, point: &PricePoint) -> Self {
        Self {
            ticker,
            date: dates::to_db_day(point.date),
            close: point.close.to_string(),
        }
    }
}

/// Insertable form of a [`crate::schema::tracked_ticker`] row; `created_at` is defaulted by SQLite.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tracked_ticker)]
pub struct NewTrackedTicker<'a> {
    pub symbol: &'a str,
}
