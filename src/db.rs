//!
//! # Database Access
//!
//! Connection pool construction and embedded migrations. The schema lives in
//! `migrations/` and is compiled into the binary, so a fresh database file is
//! fully provisioned on startup with no external tooling.

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

pub type DbPool = SqlitePool;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens (creating if missing) the database at `database_url` and returns a
/// connection pool. Foreign key enforcement is switched on per connection;
/// SQLite leaves it off by default.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Opens a private in-memory database. The pool is capped at one connection
/// because every connection to `:memory:` would otherwise get its own empty
/// database. Used by the test suites and handy for throwaway embedding.
pub async fn create_memory_pool() -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}
