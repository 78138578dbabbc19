//! Yahoo Finance v8 chart API provider.
//!
//! Yahoo has no official API and changes its payloads without notice, so the
//! response types only model the fields needed for daily closes and tolerate
//! missing arrays.

pub mod params;
pub mod provider;
pub mod response;

pub use provider::{YahooProvider, YahooSettings};
