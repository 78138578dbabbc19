//! Provider abstraction for daily close price sources.
//!
//! This module defines the [`PriceSource`] trait, the single interface the
//! cache uses to fetch closing prices from a market data vendor. Each concrete
//! vendor (currently Yahoo Finance) implements it and handles its own request
//! format, rate limits and response quirks.
//!
//! The trait is async and object safe, so callers can pick a source at
//! runtime (`Box<dyn PriceSource + Send + Sync>`).
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use price_ingestor::models::{price_point::PricePoint, request_params::DailyClosesParams};
//! use price_ingestor::providers::{PriceSource, ProviderError};
//!
//! struct Flat;
//!
//! #[async_trait]
//! impl PriceSource for Flat {
//!     async fn fetch_daily_closes(
//!         &self,
//!         _params: &DailyClosesParams,
//!     ) -> Result<Vec<PricePoint>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod errors;
pub mod yahoo;

use async_trait::async_trait;

pub use errors::{ProviderError, ProviderInitError};

use crate::models::{price_point::PricePoint, request_params::DailyClosesParams};

/// Trait for fetching daily closing prices from a market data provider.
#[async_trait]
pub trait PriceSource {
    /// Fetches every available close for business days in `[params.start, params.end]`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PricePoint>)` - ascending by date, one point per day, all inside the window.
    /// * `Err(ProviderError::NoData)` - the symbol is unknown or the window has no quotes.
    /// * `Err(_)` - transport or API failure.
    async fn fetch_daily_closes(
        &self,
        params: &DailyClosesParams,
    ) -> Result<Vec<PricePoint>, ProviderError>;
}

#[async_trait]
impl<T> PriceSource for Box<T>
where
    T: PriceSource + Send + Sync + ?Sized,
{
    async fn fetch_daily_closes(
        &self,
        params: &DailyClosesParams,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        (**self).fetch_daily_closes(params).await
    }
}
