use chrono::{Days, NaiveDate};

use crate::{models::request_params::DailyClosesParams, providers::ProviderError};

/// Longest symbol Yahoo accepts in practice (e.g. `"BRK-B"`, `"^GSPC"`, `"EURUSD=X"`).
pub const MAX_SYMBOL_LEN: usize = 16;

/// Rejects requests Yahoo would answer with an error or an empty chart.
pub fn validate_params(params: &DailyClosesParams) -> Result<(), ProviderError> {
    let symbol = params.symbol.trim();
    if symbol.is_empty() {
        return Err(ProviderError::Validation("symbol must not be empty".into()));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(ProviderError::Validation(format!(
            "symbol '{symbol}' is longer than {MAX_SYMBOL_LEN} characters"
        )));
    }
    if params.start > params.end {
        return Err(ProviderError::Validation(format!(
            "start {} is after end {}",
            params.start, params.end
        )));
    }
    Ok(())
}

/// Midnight UTC of `date` as a unix timestamp.
fn day_start_ts(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

/// Builds the chart query for a daily request.
///
/// Yahoo's `period2` is exclusive, so it is set to midnight of the day after
/// `params.end` to keep the requested end day in the answer.
pub fn construct_params(params: &DailyClosesParams) -> Vec<(String, String)> {
    let end_exclusive = params
        .end
        .checked_add_days(Days::new(1))
        .unwrap_or(params.end);

    vec![
        ("period1".to_string(), day_start_ts(params.start).to_string()),
        ("period2".to_string(), day_start_ts(end_exclusive).to_string()),
        ("interval".to_string(), "1d".to_string()),
        ("events".to_string(), "history".to_string()),
        ("includePrePost".to_string(), "false".to_string()),
    ]
}
