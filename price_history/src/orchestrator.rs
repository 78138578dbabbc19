//! Drives one fill-and-display request end to end.
//!
//! The flow is: make sure the ticker is tracked, compute the requested
//! business days, subtract what the store already holds, coalesce the rest
//! into ranges, fetch and persist each range in turn, then read the window
//! back and hand it to the chart renderer.
//!
//! A failing range does not end the request. Its outcome is recorded in the
//! [`FillReport`] and the next range is attempted. Only store failures outside
//! the range loop, a bad request, or a failed render are returned as errors.
//! When such a failure happens after ranges were attempted, the error is
//! [`PriceHistoryError::AfterRanges`] and still carries the report.

use std::fmt;

use chrono::NaiveDate;
use price_ingestor::{
    models::{price_point::PricePoint, request_params::DailyClosesParams},
    providers::{PriceSource, ProviderError},
};
use serde::Serialize;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{
    calendar::business_days,
    chart::ChartRenderer,
    errors::{PriceHistoryError, ValidationError},
    gaps::{self, DateRange},
    store::PriceStore,
};

/// One request: a ticker and an inclusive window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillRequest {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Compute and report gaps only: no fetch, persist or render.
    pub dry_run: bool,
}

impl FillRequest {
    pub fn new(ticker: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            start,
            end,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn chart_title(&self) -> String {
        format!("{} close {}..{}", self.ticker, self.start, self.end)
    }
}

/// Where a request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FillState {
    Idle,
    Validated,
    CalendarComputed,
    GapComputed,
    NoGapsFound,
    RangesFetching,
    RangesPersisted,
    ReadBack,
    Displayed,
    Aborted,
}

/// What happened to one coalesced range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RangeStatus {
    /// Fetched and stored.
    Persisted { rows: usize },
    /// The source had no quotes for a single-day range, e.g. an exchange holiday.
    Empty,
    FetchFailed { reason: String },
    PersistFailed { reason: String },
}

impl RangeStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FetchFailed { .. } | Self::PersistFailed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeOutcome {
    pub range: DateRange,
    #[serde(flatten)]
    pub status: RangeStatus,
}

/// Summary of a finished request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillReport {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Business days in the window.
    pub requested: usize,
    /// Requested days that were already cached.
    pub cached: usize,
    /// Requested days that were not cached when the request started.
    pub missing: usize,
    /// Coalesced ranges, ascending.
    pub ranges: Vec<DateRange>,
    /// One entry per attempted range; empty for a dry run.
    pub outcomes: Vec<RangeOutcome>,
    /// Cached closes for the window after filling, newest first.
    pub points: Vec<PricePoint>,
    pub state: FillState,
    pub dry_run: bool,
}

impl FillReport {
    /// True when no range failed.
    pub fn is_complete(&self) -> bool {
        !self.outcomes.iter().any(|o| o.status.is_failure())
    }

    pub fn failed(&self) -> impl Iterator<Item = &RangeOutcome> {
        self.outcomes.iter().filter(|o| o.status.is_failure())
    }

    pub fn rows_inserted(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                RangeStatus::Persisted { rows } => rows,
                _ => 0,
            })
            .sum()
    }
}

impl fmt::Display for FillReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}..{}: {} business days, {} cached, {} missing in {} range(s)",
            self.ticker,
            self.start,
            self.end,
            self.requested,
            self.cached,
            self.missing,
            self.ranges.len()
        )?;
        if self.dry_run {
            for range in &self.ranges {
                writeln!(f, "  {range}: would fetch")?;
            }
            return Ok(());
        }
        for outcome in &self.outcomes {
            match &outcome.status {
                RangeStatus::Persisted { rows } => {
                    writeln!(f, "  {}: stored {rows} row(s)", outcome.range)?
                }
                RangeStatus::Empty => writeln!(f, "  {}: no data at source", outcome.range)?,
                RangeStatus::FetchFailed { reason } => {
                    writeln!(f, "  {}: fetch failed: {reason}", outcome.range)?
                }
                RangeStatus::PersistFailed { reason } => {
                    writeln!(f, "  {}: persist failed: {reason}", outcome.range)?
                }
            }
        }
        if self.state == FillState::Aborted {
            write!(f, "request aborted before the chart was drawn")
        } else {
            write!(f, "{} close(s) in window", self.points.len())
        }
    }
}

/// Owns the three collaborators and runs requests against them.
pub struct CacheOrchestrator<S, P, R> {
    store: S,
    source: P,
    renderer: R,
    state: FillState,
}

impl<S, P, R> CacheOrchestrator<S, P, R>
where
    S: PriceStore,
    P: PriceSource,
    R: ChartRenderer,
{
    pub fn new(store: S, source: P, renderer: R) -> Self {
        Self {
            store,
            source,
            renderer,
            state: FillState::Idle,
        }
    }

    /// State reached by the last request.
    pub fn state(&self) -> FillState {
        self.state
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_parts(self) -> (S, P, R) {
        (self.store, self.source, self.renderer)
    }

    /// Fill every gap in the window, then render what the store holds.
    pub async fn fill_and_display(
        &mut self,
        request: &FillRequest,
    ) -> Result<FillReport, PriceHistoryError> {
        let span = info_span!(
            "fill_and_display",
            ticker = %request.ticker,
            start = %request.start,
            end = %request.end,
        );
        self.state = FillState::Idle;
        let result = self.run(request).instrument(span.clone()).await;
        if let Err(e) = &result {
            span.in_scope(|| warn!(error = %e, "request aborted"));
            self.transition(FillState::Aborted);
        }
        result
    }

    fn transition(&mut self, next: FillState) {
        debug!(from = ?self.state, to = ?next, "fill state");
        self.state = next;
    }

    async fn run(&mut self, request: &FillRequest) -> Result<FillReport, PriceHistoryError> {
        let ticker = request.ticker.as_str();
        if ticker.is_empty() {
            return Err(ValidationError::InvalidTicker {
                ticker: ticker.to_string(),
                reason: "ticker is empty".into(),
            }
            .into());
        }
        if request.start > request.end {
            return Err(ValidationError::StartAfterEnd {
                start: request.start,
                end: request.end,
            }
            .into());
        }
        if !request.dry_run && self.store.ensure_ticker(ticker)? {
            info!(ticker, "started tracking ticker");
        }
        self.transition(FillState::Validated);

        let requested = business_days(request.start, request.end);
        self.transition(FillState::CalendarComputed);

        let cached = self
            .store
            .dates_in_range(ticker, request.start, request.end)?;
        let missing = gaps::missing(&requested, &cached);
        let ranges = gaps::coalesce(&missing);
        debug!(
            requested = requested.len(),
            missing = missing.len(),
            ranges = ?ranges.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "gaps computed"
        );
        self.transition(FillState::GapComputed);

        let mut report = FillReport {
            ticker: ticker.to_string(),
            start: request.start,
            end: request.end,
            requested: requested.len(),
            cached: requested.len() - missing.len(),
            missing: missing.len(),
            ranges,
            outcomes: Vec::new(),
            points: Vec::new(),
            state: self.state,
            dry_run: request.dry_run,
        };

        if report.ranges.is_empty() {
            info!("no missing dates, nothing to fetch");
            self.transition(FillState::NoGapsFound);
        }
        if request.dry_run {
            report.state = self.state;
            return Ok(report);
        }

        if !report.ranges.is_empty() {
            self.transition(FillState::RangesFetching);
            for range in report.ranges.clone() {
                let status = self.fill_range(ticker, range).await;
                match &status {
                    RangeStatus::Persisted { rows } => info!(%range, rows, "range stored"),
                    RangeStatus::Empty => info!(%range, "source has no data for range"),
                    RangeStatus::FetchFailed { reason } => {
                        warn!(%range, reason = %reason, "fetch failed, continuing")
                    }
                    RangeStatus::PersistFailed { reason } => {
                        warn!(%range, reason = %reason, "persist failed, continuing")
                    }
                }
                report.outcomes.push(RangeOutcome { range, status });
            }
            self.transition(FillState::RangesPersisted);
        }

        if let Err(source) = self.read_back_and_display(request, &mut report) {
            if report.outcomes.is_empty() {
                return Err(source);
            }
            report.state = FillState::Aborted;
            return Err(PriceHistoryError::AfterRanges {
                report: Box::new(report),
                source: Box::new(source),
            });
        }

        report.state = self.state;
        Ok(report)
    }

    fn read_back_and_display(
        &mut self,
        request: &FillRequest,
        report: &mut FillReport,
    ) -> Result<(), PriceHistoryError> {
        report.points = self
            .store
            .read_range(&request.ticker, request.start, request.end)?;
        self.transition(FillState::ReadBack);

        self.renderer
            .render(&request.chart_title(), &report.points)?;
        self.transition(FillState::Displayed);
        Ok(())
    }

    async fn fill_range(&mut self, ticker: &str, range: DateRange) -> RangeStatus {
        let params = DailyClosesParams::new(ticker, range.start, range.end);
        let fetched = match self.source.fetch_daily_closes(&params).await {
            Ok(points) => points,
            Err(ProviderError::NoData { .. }) => return no_quotes(range),
            Err(e) => {
                return RangeStatus::FetchFailed {
                    reason: e.to_string(),
                };
            }
        };

        let fetched_len = fetched.len();
        let mut points: Vec<PricePoint> = fetched
            .into_iter()
            .filter(|p| range.contains(p.date))
            .collect();
        if points.len() < fetched_len {
            warn!(
                %range,
                dropped = fetched_len - points.len(),
                "source returned days outside the range"
            );
        }
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);

        if points.is_empty() {
            return no_quotes(range);
        }
        match self.store.insert(ticker, &points) {
            Ok(rows) => RangeStatus::Persisted { rows },
            Err(e) => RangeStatus::PersistFailed {
                reason: e.to_string(),
            },
        }
    }
}

/// Status of a range the source had nothing for.
///
/// One weekday without quotes is taken for an exchange holiday. Several
/// consecutive ones point at a source problem or a ticker that stopped trading.
fn no_quotes(range: DateRange) -> RangeStatus {
    let days = business_days(range.start, range.end).len();
    if days <= 1 {
        RangeStatus::Empty
    } else {
        RangeStatus::FetchFailed {
            reason: format!("source returned no quotes for {days} business days"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{BTreeMap, BTreeSet},
        sync::Mutex,
    };

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::errors::{ChartError, StoreError};

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    #[derive(Default)]
    struct MemStore {
        tickers: BTreeSet<String>,
        rows: BTreeMap<(String, NaiveDate), Decimal>,
        inserts: Vec<Vec<NaiveDate>>,
        fail_insert_on: Option<NaiveDate>,
        fail_dates_in_range: bool,
        fail_read_range: bool,
    }

    impl MemStore {
        fn with_cached(ticker: &str, days: &[NaiveDate]) -> Self {
            let mut s = Self::default();
            s.tickers.insert(ticker.to_string());
            for day in days {
                s.rows.insert((ticker.to_string(), *day), dec!(1.00));
            }
            s
        }
    }

    impl PriceStore for MemStore {
        fn ticker_exists(&mut self, ticker: &str) -> Result<bool, StoreError> {
            Ok(self.tickers.contains(ticker))
        }

        fn create_ticker(&mut self, ticker: &str) -> Result<(), StoreError> {
            self.tickers.insert(ticker.to_string());
            Ok(())
        }

        fn dates_in_range(
            &mut self,
            ticker: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<BTreeSet<NaiveDate>, StoreError> {
            if self.fail_dates_in_range {
                return Err(StoreError::Query(diesel::result::Error::NotFound));
            }
            Ok(self
                .rows
                .keys()
                .filter(|(t, day)| t == ticker && start <= *day && *day <= end)
                .map(|(_, day)| *day)
                .collect())
        }

        fn insert(&mut self, ticker: &str, points: &[PricePoint]) -> Result<usize, StoreError> {
            if points.iter().any(|p| Some(p.date) == self.fail_insert_on) {
                return Err(StoreError::Query(diesel::result::Error::RollbackTransaction));
            }
            for p in points {
                let key = (ticker.to_string(), p.date);
                assert!(!self.rows.contains_key(&key), "duplicate insert of {}", p.date);
                self.rows.insert(key, p.close);
            }
            self.inserts.push(points.iter().map(|p| p.date).collect());
            Ok(points.len())
        }

        fn read_range(
            &mut self,
            ticker: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<PricePoint>, StoreError> {
            if self.fail_read_range {
                return Err(StoreError::Query(diesel::result::Error::NotFound));
            }
            Ok(self
                .rows
                .iter()
                .rev()
                .filter(|((t, day), _)| t == ticker && start <= *day && *day <= end)
                .map(|((_, day), close)| PricePoint::new(*day, *close))
                .collect())
        }
    }

    /// Quotes every weekday at a flat price, except for scripted failures.
    #[derive(Default)]
    struct FakeSource {
        calls: Mutex<Vec<(NaiveDate, NaiveDate)>>,
        fail_on: Option<NaiveDate>,
        extra_day: Option<NaiveDate>,
        no_quotes: bool,
    }

    #[async_trait]
    impl PriceSource for FakeSource {
        async fn fetch_daily_closes(
            &self,
            params: &DailyClosesParams,
        ) -> Result<Vec<PricePoint>, ProviderError> {
            self.calls.lock().unwrap().push((params.start, params.end));
            if Some(params.start) == self.fail_on {
                return Err(ProviderError::Api("upstream exploded".into()));
            }
            if self.no_quotes {
                return Err(ProviderError::NoData {
                    symbol: params.symbol.clone(),
                    start: params.start,
                    end: params.end,
                });
            }
            let mut out: Vec<PricePoint> = business_days(params.start, params.end)
                .into_iter()
                .map(|day| PricePoint::new(day, dec!(10.50)))
                .collect();
            if let Some(extra) = self.extra_day {
                out.push(PricePoint::new(extra, dec!(99.00)));
            }
            Ok(out)
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<(String, Vec<PricePoint>)>>,
        fail: bool,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, title: &str, points: &[PricePoint]) -> Result<(), ChartError> {
            if self.fail {
                return Err(ChartError::Write {
                    path: "chart.html".into(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.calls
                .lock()
                .unwrap()
                .push((title.to_string(), points.to_vec()));
            Ok(())
        }
    }

    fn orchestrator(
        store: MemStore,
        source: FakeSource,
    ) -> CacheOrchestrator<MemStore, FakeSource, RecordingRenderer> {
        CacheOrchestrator::new(store, source, RecordingRenderer::default())
    }

    #[tokio::test]
    async fn fills_isolated_gaps_one_range_each() {
        let store = MemStore::with_cached("AAPL", &[d(6, 10), d(6, 11), d(6, 13)]);
        let mut orch = orchestrator(store, FakeSource::default());

        let report = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 10), d(6, 14)))
            .await
            .unwrap();

        assert_eq!(report.requested, 5);
        assert_eq!(report.cached, 3);
        assert_eq!(report.missing, 2);
        assert_eq!(
            report.ranges,
            vec![DateRange::single(d(6, 12)), DateRange::single(d(6, 14))]
        );
        assert!(report.is_complete());
        assert_eq!(report.rows_inserted(), 2);
        assert_eq!(report.state, FillState::Displayed);

        let (store, source, renderer) = orch.into_parts();
        assert_eq!(
            *source.calls.lock().unwrap(),
            vec![(d(6, 12), d(6, 12)), (d(6, 14), d(6, 14))]
        );
        assert_eq!(store.inserts, vec![vec![d(6, 12)], vec![d(6, 14)]]);

        let calls = renderer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let dates: Vec<_> = calls[0].1.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(6, 14), d(6, 13), d(6, 12), d(6, 11), d(6, 10)]);
    }

    #[tokio::test]
    async fn empty_cache_fetches_one_range() {
        let mut orch = orchestrator(MemStore::default(), FakeSource::default());

        let report = orch
            .fill_and_display(&FillRequest::new("MSFT", d(6, 10), d(6, 14)))
            .await
            .unwrap();

        assert_eq!(report.missing, 5);
        assert_eq!(report.ranges, vec![DateRange { start: d(6, 10), end: d(6, 14) }]);
        assert_eq!(report.points.len(), 5);

        let (store, source, _) = orch.into_parts();
        assert!(store.tickers.contains("MSFT"));
        assert_eq!(source.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn covered_window_only_reads_back() {
        let cached = business_days(d(6, 10), d(6, 14));
        let mut orch = orchestrator(MemStore::with_cached("AAPL", &cached), FakeSource::default());

        let report = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 8), d(6, 16)))
            .await
            .unwrap();

        assert_eq!(report.missing, 0);
        assert!(report.ranges.is_empty());
        assert!(report.outcomes.is_empty());
        assert_eq!(report.points.len(), 5);

        let (store, source, renderer) = orch.into_parts();
        assert!(source.calls.lock().unwrap().is_empty());
        assert!(store.inserts.is_empty());
        assert_eq!(renderer.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_run_finds_no_gaps() {
        let mut orch = orchestrator(MemStore::default(), FakeSource::default());
        let request = FillRequest::new("AAPL", d(6, 3), d(6, 28));

        let first = orch.fill_and_display(&request).await.unwrap();
        assert_eq!(first.rows_inserted(), 20);

        let second = orch.fill_and_display(&request).await.unwrap();
        assert_eq!(second.missing, 0);
        assert_eq!(second.rows_inserted(), 0);
        assert_eq!(second.points, first.points);

        // One fetch per week: weekends split the ranges.
        let (_, source, _) = orch.into_parts();
        assert_eq!(source.calls.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn failing_range_does_not_block_later_ranges() {
        let store = MemStore::with_cached("AAPL", &[d(6, 11), d(6, 13)]);
        let source = FakeSource {
            fail_on: Some(d(6, 10)),
            ..FakeSource::default()
        };
        let mut orch = orchestrator(store, source);

        let report = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 10), d(6, 14)))
            .await
            .unwrap();

        assert!(!report.is_complete());
        let failed: Vec<_> = report.failed().map(|o| o.range).collect();
        assert_eq!(failed, vec![DateRange::single(d(6, 10))]);
        assert_eq!(report.rows_inserted(), 2);
        assert!(report.to_string().contains("2024-06-10..2024-06-10: fetch failed"));

        let (store, _, _) = orch.into_parts();
        assert_eq!(store.inserts, vec![vec![d(6, 12)], vec![d(6, 14)]]);
    }

    #[tokio::test]
    async fn persist_failure_is_recorded() {
        let store = MemStore {
            fail_insert_on: Some(d(6, 12)),
            ..MemStore::default()
        };
        let mut orch = orchestrator(store, FakeSource::default());

        let report = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 10), d(6, 14)))
            .await
            .unwrap();

        assert!(matches!(
            report.outcomes[0].status,
            RangeStatus::PersistFailed { .. }
        ));
        assert!(report.points.is_empty());
        assert_eq!(report.state, FillState::Displayed);
    }

    #[tokio::test]
    async fn out_of_range_points_are_dropped() {
        let store = MemStore::with_cached("AAPL", &[d(6, 11)]);
        let source = FakeSource {
            extra_day: Some(d(6, 11)),
            ..FakeSource::default()
        };
        let mut orch = orchestrator(store, source);

        let report = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 10), d(6, 12)))
            .await
            .unwrap();

        // 06-11 is offered with both ranges but never stored twice.
        assert!(report.is_complete());
        assert_eq!(report.rows_inserted(), 2);
    }

    #[tokio::test]
    async fn dry_run_touches_nothing() {
        let mut orch = orchestrator(MemStore::default(), FakeSource::default());

        let report = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 10), d(6, 14)).with_dry_run(true))
            .await
            .unwrap();

        assert_eq!(report.ranges.len(), 1);
        assert!(report.outcomes.is_empty());
        assert_eq!(report.state, FillState::GapComputed);
        assert!(report.to_string().contains("would fetch"));

        let (store, source, renderer) = orch.into_parts();
        assert!(store.tickers.is_empty());
        assert!(source.calls.lock().unwrap().is_empty());
        assert!(renderer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reversed_window_aborts() {
        let mut orch = orchestrator(MemStore::default(), FakeSource::default());

        let err = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 14), d(6, 10)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PriceHistoryError::Validation(ValidationError::StartAfterEnd { .. })
        ));
        assert_eq!(orch.state(), FillState::Aborted);
    }

    #[tokio::test]
    async fn weekend_only_window_has_no_gaps() {
        let mut orch = orchestrator(MemStore::default(), FakeSource::default());

        let report = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 15), d(6, 16)))
            .await
            .unwrap();

        assert_eq!(report.requested, 0);
        assert!(report.points.is_empty());
        assert_eq!(orch.state(), FillState::Displayed);
    }

    #[tokio::test]
    async fn cached_days_failure_aborts_before_fetching() {
        let store = MemStore {
            fail_dates_in_range: true,
            ..MemStore::default()
        };
        let mut orch = orchestrator(store, FakeSource::default());

        let err = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 10), d(6, 14)))
            .await
            .unwrap_err();

        assert!(matches!(err, PriceHistoryError::Store(_)));
        assert_eq!(orch.state(), FillState::Aborted);

        let (_, source, renderer) = orch.into_parts();
        assert!(source.calls.lock().unwrap().is_empty());
        assert!(renderer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_back_failure_without_ranges_aborts() {
        let cached = business_days(d(6, 10), d(6, 14));
        let store = MemStore {
            fail_read_range: true,
            ..MemStore::with_cached("AAPL", &cached)
        };
        let mut orch = orchestrator(store, FakeSource::default());

        let err = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 10), d(6, 14)))
            .await
            .unwrap_err();

        assert!(matches!(err, PriceHistoryError::Store(_)));
        assert!(err.partial_report().is_none());
        assert_eq!(orch.state(), FillState::Aborted);
    }

    #[tokio::test]
    async fn render_failure_keeps_range_outcomes() {
        let source = FakeSource {
            fail_on: Some(d(6, 10)),
            ..FakeSource::default()
        };
        let renderer = RecordingRenderer {
            fail: true,
            ..RecordingRenderer::default()
        };
        let mut orch = CacheOrchestrator::new(MemStore::default(), source, renderer);

        let err = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 10), d(6, 21)))
            .await
            .unwrap_err();

        let PriceHistoryError::AfterRanges { report, source } = &err else {
            panic!("expected the report to survive, got {err:?}");
        };
        assert!(matches!(**source, PriceHistoryError::Chart(ChartError::Write { .. })));
        assert_eq!(report.state, FillState::Aborted);
        assert!(matches!(report.outcomes[0].status, RangeStatus::FetchFailed { .. }));
        assert_eq!(report.outcomes[1].status, RangeStatus::Persisted { rows: 5 });
        assert_eq!(report.points.len(), 5);

        let summary = report.to_string();
        assert!(summary.contains("2024-06-10..2024-06-14: fetch failed"));
        assert!(summary.contains("2024-06-17..2024-06-21: stored 5 row(s)"));
        assert!(summary.contains("aborted"));
        assert_eq!(orch.state(), FillState::Aborted);
    }

    #[tokio::test]
    async fn read_back_failure_after_ranges_keeps_report() {
        let store = MemStore {
            fail_read_range: true,
            ..MemStore::default()
        };
        let mut orch = orchestrator(store, FakeSource::default());

        let err = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 10), d(6, 14)))
            .await
            .unwrap_err();

        let report = err.partial_report().expect("report kept");
        assert_eq!(report.rows_inserted(), 5);
        assert!(matches!(
            err,
            PriceHistoryError::AfterRanges { ref source, .. }
                if matches!(**source, PriceHistoryError::Store(_))
        ));
    }

    #[tokio::test]
    async fn missing_quotes_fail_unless_single_day() {
        let source = FakeSource {
            no_quotes: true,
            ..FakeSource::default()
        };
        let store = MemStore::with_cached("AAPL", &[d(6, 10), d(6, 11), d(6, 13)]);
        let mut orch = orchestrator(store, source);

        // Two isolated days: holidays as far as the cache can tell.
        let report = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 10), d(6, 14)))
            .await
            .unwrap();
        assert!(report.is_complete());
        assert!(report.outcomes.iter().all(|o| o.status == RangeStatus::Empty));

        // A whole week without quotes is not a holiday.
        let report = orch
            .fill_and_display(&FillRequest::new("AAPL", d(6, 17), d(6, 21)))
            .await
            .unwrap();
        assert!(!report.is_complete());
        assert_eq!(
            report.outcomes[0].status,
            RangeStatus::FetchFailed {
                reason: "source returned no quotes for 5 business days".into()
            }
        );
    }
}
