use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Error)]
pub enum ProviderInitError {
    /// Failed to build the HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    /// The provider settings are unusable (e.g. a zero rate limit).
    #[error("Invalid provider settings: {0}")]
    InvalidSettings(String),
}

/// Errors that can occur within a `PriceSource` implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider's API returned an error status or error payload.
    #[error("API error: {0}")]
    Api(String),

    /// The request parameters were invalid for this specific provider.
    #[error("Invalid parameters for provider: {0}")]
    Validation(String),

    /// The source has no closes for this symbol and window.
    #[error("no price data for {symbol} between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// An internal error occurred while processing data within the provider.
    #[error("Internal provider error: {0}")]
    Internal(String),
}
