//! SQLite connection helpers.

use diesel::{Connection, RunQueryDsl, SqliteConnection, sql_query};
use tracing::debug;

use crate::errors::StoreError;

/// Strip an optional `sqlite:` / `sqlite://` scheme so URLs and bare paths both work.
pub fn sqlite_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

/// Open a SQLite connection and apply connection-wide PRAGMAs.
pub fn connect_sqlite(database_url: &str) -> Result<SqliteConnection, StoreError> {
    let mut conn = SqliteConnection::establish(sqlite_path(database_url))?;

    sql_query("PRAGMA journal_mode=WAL;").execute(&mut conn)?;
    sql_query("PRAGMA foreign_keys=ON;").execute(&mut conn)?;
    sql_query("PRAGMA busy_timeout=5000;").execute(&mut conn)?;
    debug!(database_url, "connected to sqlite");
    Ok(conn)
}

/// Open a tuned connection and run pending migrations on it.
pub fn open(database_url: &str) -> Result<SqliteConnection, StoreError> {
    let mut conn = connect_sqlite(database_url)?;
    crate::db::migrate::run_pending(&mut conn)?;
    Ok(conn)
}
