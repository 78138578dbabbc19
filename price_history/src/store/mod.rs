//! Persistence collaborator: cached closes per ticker and day.
//!
//! The portable surface is the [`PriceStore`] trait; the SQLite implementation
//! lives in [`repo`].

pub mod repo;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use price_ingestor::models::price_point::PricePoint;

use crate::errors::StoreError;

pub use repo::SqliteStore;

/// Storage for cached daily closes.
///
/// Inserts are append-only: storing a day that is already cached is a caller
/// error and fails, it is never silently merged.
pub trait PriceStore {
    /// True once [`PriceStore::create_ticker`] has run for this ticker.
    fn ticker_exists(&mut self, ticker: &str) -> Result<bool, StoreError>;

    /// Idempotent per-ticker setup; must run before the first insert.
    fn create_ticker(&mut self, ticker: &str) -> Result<(), StoreError>;

    /// Cached days for `ticker` within `[start, end]`, normalized to calendar days.
    fn dates_in_range(
        &mut self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, StoreError>;

    /// Stores `points` in one transaction and returns the number of rows written.
    fn insert(&mut self, ticker: &str, points: &[PricePoint]) -> Result<usize, StoreError>;

    /// Cached closes for `ticker` within `[start, end]`, newest first.
    fn read_range(
        &mut self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, StoreError>;

    /// Runs [`PriceStore::create_ticker`] unless the ticker already exists.
    /// Returns `true` when the ticker was created.
    fn ensure_ticker(&mut self, ticker: &str) -> Result<bool, StoreError> {
        if self.ticker_exists(ticker)? {
            return Ok(false);
        }
        self.create_ticker(ticker)?;
        Ok(true)
    }
}
