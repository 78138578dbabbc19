//! Daily close cache that fetches only the business days it is missing.
//!
//! A request names one ticker and an inclusive window. The
//! [`orchestrator::CacheOrchestrator`] works out which business days the
//! [`store::PriceStore`] lacks, coalesces them into ranges, fetches each range
//! from a [`price_ingestor::providers::PriceSource`], persists it, and renders
//! the whole window through a [`chart::ChartRenderer`].

pub mod calendar;
pub mod chart;
pub mod config;
pub mod dates;
pub mod db;
pub mod errors;
pub mod gaps;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod schema;
pub mod store;
pub mod validate;
