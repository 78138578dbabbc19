//! Embedded schema migrations.

use diesel::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::errors::StoreError;

/// Embedded Diesel migrations bundled with this crate.
///
/// [`crate::db::connection::open`] applies them through [`run_pending`].
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies pending migrations on an already open connection.
pub fn run_pending(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(e.to_string()))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied database migrations");
    }
    Ok(())
}
