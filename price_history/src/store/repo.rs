use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use diesel::{dsl::exists, prelude::*};
use price_ingestor::models::price_point::PricePoint;
use tracing::debug;

use crate::{
    dates,
    db::connection,
    errors::StoreError,
    models::{DailyCloseRow, NewDailyClose, NewTrackedTicker},
    schema::{daily_close, tracked_ticker},
    store::PriceStore,
};

/// [`PriceStore`] backed by one SQLite connection.
pub struct SqliteStore {
    conn: SqliteConnection,
}

/// `[lo, hi)` text bounds for a `date` column filter.
///
/// The upper bound is the day after `end`, so timestamp-shaped rows such as
/// `2024-06-14 00:00:00` still compare inside the window.
fn text_bounds(start: NaiveDate, end: NaiveDate) -> (String, String) {
    let hi = end.checked_add_days(Days::new(1)).unwrap_or(end);
    (dates::to_db_day(start), dates::to_db_day(hi))
}

impl SqliteStore {
    pub fn new(conn: SqliteConnection) -> Self {
        Self { conn }
    }

    /// Migrate and connect to the database at `database_url`.
    pub fn open(database_url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(connection::open(database_url)?))
    }

    pub fn connection_mut(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

impl PriceStore for SqliteStore {
    fn ticker_exists(&mut self, ticker: &str) -> Result<bool, StoreError> {
        use tracked_ticker::dsl as tt;

        let found = diesel::select(exists(tt::tracked_ticker.filter(tt::symbol.eq(ticker))))
            .get_result::<bool>(&mut self.conn)?;
        debug!(ticker, found, "checked ticker");
        Ok(found)
    }

    fn create_ticker(&mut self, ticker: &str) -> Result<(), StoreError> {
        debug!(ticker, "creating ticker");
        diesel::insert_into(tracked_ticker::table)
            .values(NewTrackedTicker { symbol: ticker })
            .on_conflict_do_nothing()
            .execute(&mut self.conn)?;
        Ok(())
    }

    fn dates_in_range(
        &mut self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, StoreError> {
        use daily_close::dsl as dc;

        let (lo, hi) = text_bounds(start, end);
        let raw: Vec<String> = dc::daily_close
            .filter(dc::ticker.eq(ticker))
            .filter(dc::date.ge(&lo).and(dc::date.lt(&hi)))
            .select(dc::date)
            .load(&mut self.conn)?;

        let mut days = BTreeSet::new();
        for s in raw {
            let day = dates::parse_stored_day(&s).ok_or_else(|| StoreError::CorruptRow {
                ticker: ticker.to_string(),
                reason: format!("unreadable date '{s}'"),
            })?;
            if start <= day && day <= end {
                days.insert(day);
            }
        }
        Ok(days)
    }

    fn insert(&mut self, ticker: &str, points: &[PricePoint]) -> Result<usize, StoreError> {
        if points.is_empty() {
            return Ok(0);
        }
        let rows: Vec<NewDailyClose<'_>> = points
            .iter()
            .map(|p| NewDailyClose::from_point(ticker, p))
            .collect();

        let written = self.conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(daily_close::table)
                .values(&rows)
                .execute(conn)
        })?;
        debug!(ticker, written, "inserted daily closes");
        Ok(written)
    }

    fn read_range(
        &mut self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, StoreError> {
        use daily_close::dsl as dc;

        let (lo, hi) = text_bounds(start, end);
        let rows: Vec<DailyCloseRow> = dc::daily_close
            .filter(dc::ticker.eq(ticker))
            .filter(dc::date.ge(&lo).and(dc::date.lt(&hi)))
            .order(dc::date.desc())
            .select(DailyCloseRow::as_select())
            .load(&mut self.conn)?;

        let mut points = rows
            .into_iter()
            .map(DailyCloseRow::into_point)
            .collect::<Result<Vec<_>, _>>()?;
        points.retain(|p| start <= p.date && p.date <= end);
        points.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(points)
    }
}
