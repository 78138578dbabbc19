//! Request validation done before any orchestration starts.

use chrono::NaiveDate;
use price_ingestor::{
    models::request_params::DailyClosesParams,
    providers::{PriceSource, ProviderError, yahoo::params::MAX_SYMBOL_LEN},
};
use tracing::debug;

use crate::errors::ValidationError;

pub use crate::dates::parse_window;

// A week every listed ticker of interest traded through.
const LOOKUP_START: (i32, u32, u32) = (2024, 6, 10);
const LOOKUP_END: (i32, u32, u32) = (2024, 6, 14);

/// Checks the ticker's shape and returns it upper-cased.
///
/// Accepts 1 to 16 characters of ASCII letters, digits and `.-^=`, which
/// covers share classes (`BRK-B`), indices (`^GSPC`) and FX pairs (`EURUSD=X`).
pub fn normalize_ticker(raw: &str) -> Result<String, ValidationError> {
    let ticker = raw.trim();
    let invalid = |reason: String| ValidationError::InvalidTicker {
        ticker: raw.to_string(),
        reason,
    };

    if ticker.is_empty() {
        return Err(invalid("ticker is empty".into()));
    }
    if ticker.len() > MAX_SYMBOL_LEN {
        return Err(invalid(format!("longer than {MAX_SYMBOL_LEN} characters")));
    }
    if let Some(c) = ticker
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
    {
        return Err(invalid(format!("unexpected character '{c}'")));
    }
    Ok(ticker.to_ascii_uppercase())
}

fn lookup_window() -> (NaiveDate, NaiveDate) {
    let day = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    (day(LOOKUP_START), day(LOOKUP_END))
}

/// Asks the source for one known trading week of `ticker`.
///
/// No quotes means the source does not know the ticker. Any other failure is
/// reported separately so a network outage is not mistaken for a typo.
pub async fn lookup_ticker<P>(source: &P, ticker: &str) -> Result<(), ValidationError>
where
    P: PriceSource + ?Sized,
{
    let (start, end) = lookup_window();
    let params = DailyClosesParams::new(ticker, start, end);
    match source.fetch_daily_closes(&params).await {
        Ok(points) if !points.is_empty() => {
            debug!(ticker, quotes = points.len(), "ticker lookup ok");
            Ok(())
        }
        Ok(_) | Err(ProviderError::NoData { .. }) => Err(ValidationError::UnknownTicker {
            ticker: ticker.to_string(),
        }),
        Err(e) => Err(ValidationError::TickerLookup {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Format check followed by the source lookup.
pub async fn validate_ticker<P>(source: &P, raw: &str) -> Result<String, ValidationError>
where
    P: PriceSource + ?Sized,
{
    let ticker = normalize_ticker(raw)?;
    lookup_ticker(source, &ticker).await?;
    Ok(ticker)
}
