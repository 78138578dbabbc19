//! Database utilities for connections and schema migrations.
//!
//! This module provides:
//! - [`connection::connect_sqlite`]: opens a connection and applies WAL, foreign_keys=ON,
//!   and a 5000ms busy_timeout.
//! - [`migrate::run_pending`]: applies the embedded Diesel migrations.
//! - [`connection::open`]: both steps on one connection, the usual way to get a ready one.
//!
//! Example:
//! ```no_run
//! use price_history::db::connection;
//!
//! let db_path = std::env::temp_dir().join("price_history_example.db");
//! let _conn = connection::open(db_path.to_str().unwrap()).expect("open");
//! ```

pub mod connection;
pub mod migrate;
