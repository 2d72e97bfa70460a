//! Startup seeding of the `users` table from a JSON file.
//!
//! This is the only place plaintext passwords exist. Each one is hashed
//! exactly once before it is written.

use std::path::Path;

use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::AuthError;
use crate::auth::password::hash_password_blocking;
use crate::models::auth::User;

/// Errors raised while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid seed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Cannot seed user {id}: {source}")]
    Hash { id: String, source: AuthError },
}

/// One entry of the seed file.
#[derive(Clone, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Parse a JSON array of seed users.
pub fn parse_seed(json: &str) -> Result<Vec<SeedUser>, SeedError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a seed file.
pub async fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<SeedUser>, SeedError> {
    let raw = tokio::fs::read_to_string(path.as_ref()).await?;
    parse_seed(&raw)
}

/// Recreate the users table and insert every seed user.
///
/// Returns the stored users in seed order. Any failure rolls back the insert
/// batch and is fatal for startup.
pub async fn seed_users(pool: &SqlitePool, users: &[SeedUser]) -> Result<Vec<User>, SeedError> {
    crate::migrate::migrate(pool).await?;

    // Hash before opening the transaction so no connection is held across
    // the bcrypt work.
    let mut hashed = Vec::with_capacity(users.len());
    for u in users {
        let hash = hash_password_blocking(u.password.clone())
            .await
            .map_err(|source| SeedError::Hash {
                id: u.id.clone(),
                source,
            })?;
        hashed.push((u, hash));
    }

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
    for (u, hash) in &hashed {
        sqlx::query("INSERT INTO users (id, username, email, password_hash) VALUES (?1, ?2, ?3, ?4)")
            .bind(&u.id)
            .bind(&u.username)
            .bind(&u.email)
            .bind(hash)
            .execute(&mut *tx)
            .await?;
        debug!(id = %u.id, email = %u.email, "seeded user");
    }
    tx.commit().await?;

    info!(count = users.len(), "users table seeded");
    Ok(users
        .iter()
        .map(|u| User {
            id: u.id.clone(),
            username: u.username.clone(),
            email: u.email.clone(),
        })
        .collect())
}
