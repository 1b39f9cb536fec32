//! Embedded schema migrations for the points tables.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::PointsPersistenceError;

/// Migrations compiled in from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply every pending migration to the database at `database_url`.
///
/// Runs on a blocking connection; call it from `spawn_blocking` inside an
/// async runtime.
///
/// # Errors
///
/// Returns [`PointsPersistenceError::Connection`] when the database is
/// unreachable and [`PointsPersistenceError::Query`] when a migration fails.
pub fn run_pending_migrations(database_url: &str) -> Result<usize, PointsPersistenceError> {
    let mut connection = PgConnection::establish(database_url)
        .map_err(|err| PointsPersistenceError::connection(err.to_string()))?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| PointsPersistenceError::query(format!("migration failed: {err}")))?;
    info!(applied = applied.len(), "database migrations applied");
    Ok(applied.len())
}
