//! Database connection setup.
//!
//! Only the SQLite driver is supported; `DB_NAME` is the database file path.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while opening the database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unsupported database driver: {0}")]
    UnsupportedDriver(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Open a connection pool for `driver` / `name`.
pub async fn connect(driver: &str, name: &str) -> Result<SqlitePool, DbError> {
    match driver {
        "sqlite" | "sqlite3" => {}
        other => return Err(DbError::UnsupportedDriver(other.to_string())),
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{name}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!(driver, name, "connected to database");
    Ok(pool)
}

/// Single-connection in-memory database.
///
/// Every SQLite `:memory:` connection is a separate database, so the pool is
/// pinned to one connection that is never recycled.
pub async fn connect_memory() -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_unknown_driver() {
        let err = connect("postgres", "whatever").await.unwrap_err();
        assert!(matches!(err, DbError::UnsupportedDriver(d) if d == "postgres"));
    }

    #[tokio::test]
    async fn creates_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let pool = connect("sqlite", path.to_str().unwrap()).await.unwrap();
        sqlx::query("SELECT 1").execute(&pool).await.unwrap();
        assert!(path.exists());
    }
}
