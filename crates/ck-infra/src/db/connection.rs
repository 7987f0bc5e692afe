use std::path::Path;

use ck_core::ports::HistoryStoreError;
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

/// Embed all diesel migrations at compile time
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub fn database_url(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub fn establish(database_url: &str) -> diesel::ConnectionResult<SqliteConnection> {
    SqliteConnection::establish(database_url)
}

/// Run embedded Diesel migrations
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), HistoryStoreError> {
    info!("Running database migrations...");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| HistoryStoreError::Migration(e.to_string()))?;
    info!("Database migrations completed");
    Ok(())
}
