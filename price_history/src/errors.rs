//! Error types for the price history cache.
//!
//! Range-level fetch and persist failures are deliberately absent here: the
//! orchestrator records them as [`crate::orchestrator::RangeOutcome`]s and
//! keeps going. Everything in [`PriceHistoryError`] ends the request.

use std::path::PathBuf;

use chrono::NaiveDate;
use price_ingestor::providers::ProviderInitError;
use thiserror::Error;

use crate::orchestrator::FillReport;

/// Bad user input, detected before any orchestration starts.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid date format '{input}'. Please use the format YYYY-MM-DD")]
    MalformedDate { input: String },

    #[error("Start date {start} cannot be greater than end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },

    #[error("Invalid ticker symbol '{ticker}': {reason}")]
    InvalidTicker { ticker: String, reason: String },

    #[error("Invalid ticker symbol '{ticker}'. Please try again with a valid ticker symbol.")]
    UnknownTicker { ticker: String },

    #[error("Could not verify ticker symbol '{ticker}': {reason}")]
    TickerLookup { ticker: String, reason: String },
}

/// Failures of the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Error connecting to the database: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Error migrating the database: {0}")]
    Migration(String),

    #[error("Database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Corrupt row for {ticker}: {reason}")]
    CorruptRow { ticker: String, reason: String },
}

/// Failures while drawing the chart.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to write chart to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize chart data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors related to loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Unrecoverable failure of one `fill_and_display` request.
#[derive(Debug, Error)]
pub enum PriceHistoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to set up price source: {0}")]
    SourceInit(#[from] ProviderInitError),

    /// A fatal failure after the range loop ran; the report says which
    /// ranges were stored before it.
    #[error("Request stopped after filling ranges")]
    AfterRanges {
        report: Box<FillReport>,
        source: Box<PriceHistoryError>,
    },
}

impl PriceHistoryError {
    /// The per-range report, when the failure came after ranges were attempted.
    pub fn partial_report(&self) -> Option<&FillReport> {
        match self {
            Self::AfterRanges { report, .. } => Some(report.as_ref()),
            _ => None,
        }
    }
}
