use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::{
    models::{price_point::PricePoint, request_params::DailyClosesParams},
    providers::ProviderError,
};

/// Yahoo Finance v8 chart API response.
#[derive(Deserialize, Debug)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Deserialize, Debug)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: Option<ChartMeta>,
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
pub struct ChartMeta {
    /// Exchange offset from UTC in seconds; bar timestamps are session opens.
    #[serde(rename = "gmtoffset")]
    pub gmt_offset: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteData>,
}

#[derive(Deserialize, Debug, Default)]
pub struct QuoteData {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Converts the chart payload into ascending, de-duplicated closes inside
    /// the requested window.
    ///
    /// Days with a null close (halts, holidays Yahoo still lists) are skipped.
    /// When Yahoo reports the same day twice (a live bar appended to history)
    /// the later entry wins.
    pub fn into_price_points(
        self,
        params: &DailyClosesParams,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let no_data = || ProviderError::NoData {
            symbol: params.symbol.clone(),
            start: params.start,
            end: params.end,
        };

        let results = match (self.chart.result, self.chart.error) {
            (Some(results), _) => results,
            (None, Some(err)) if err.code == "Not Found" => return Err(no_data()),
            (None, Some(err)) => {
                return Err(ProviderError::Api(format!("{}: {}", err.code, err.description)));
            }
            (None, None) => {
                return Err(ProviderError::Internal(
                    "chart response has neither result nor error".into(),
                ));
            }
        };

        let Some(data) = results.into_iter().next() else {
            return Err(no_data());
        };

        let offset = data.meta.and_then(|m| m.gmt_offset).unwrap_or(0);
        let timestamps = data.timestamp.unwrap_or_default();
        let closes = data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        let mut by_day = BTreeMap::<NaiveDate, PricePoint>::new();
        for (i, &ts) in timestamps.iter().enumerate() {
            let Some(close) = closes.get(i).copied().flatten() else {
                continue;
            };
            let date = DateTime::from_timestamp(ts + offset, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| ProviderError::Internal(format!("invalid timestamp: {ts}")))?;
            if !params.contains(date) {
                continue;
            }
            if let Some(point) = PricePoint::from_f64(date, close) {
                by_day.insert(date, point);
            }
        }

        if by_day.is_empty() {
            return Err(no_data());
        }
        Ok(by_day.into_values().collect())
    }
}
