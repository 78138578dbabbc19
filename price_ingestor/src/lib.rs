//! Daily close price ingestion.
//!
//! [`providers::PriceSource`] is the seam the cache orchestrator fetches
//! through; [`providers::yahoo::YahooProvider`] is the production
//! implementation backed by the Yahoo Finance chart API.

pub mod models;
pub mod providers;
