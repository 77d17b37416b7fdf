//! Bundled three-day sample dataset and the helpers that load it.

use diesel::connection::SimpleConnection;
use diesel::{Connection, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, instrument};

use crate::db::DbError;

/// Embedded schema migrations for the three game tables.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Insert statements for the bundled sample dataset.
pub const SAMPLE_DATASET_SQL: &str = include_str!("../../data/sample_dataset.sql");

/// Number of `game_info` rows in the sample dataset.
pub const SAMPLE_GAME_COUNT: i64 = 60;

/// First day with sample games.
pub const SAMPLE_FIRST_DAY: &str = "2023-07-14";

/// Day after the last sample game started. Querying
/// `SAMPLE_FIRST_DAY..SAMPLE_END_DAY` captures the whole dataset.
pub const SAMPLE_END_DAY: &str = "2023-07-17";

/// Creates a SQLite database at `path`, applies the schema migrations, and
/// loads the sample dataset.
///
/// # Errors
///
/// Returns [`DbError`] if the file cannot be opened or any statement fails.
#[instrument]
pub fn init_sample_database(path: &str) -> Result<(), DbError> {
    let mut conn = SqliteConnection::establish(path)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::new(format!("Migrations failed: {}", e)))?;
    conn.batch_execute(SAMPLE_DATASET_SQL)?;
    info!(path, games = SAMPLE_GAME_COUNT, "Sample database initialized");
    Ok(())
}
