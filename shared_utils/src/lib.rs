//! Small helpers shared across the price history workspace.

pub mod env;
