//! User directory: read-only user lookups.
//!
//! The grant and bearer flows only read through [`UserDirectory`]; writes
//! happen once, in the seed step.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::AuthError;
use crate::models::auth::{User, UserWithPassword};

/// Lookup contract consumed by the grant and bearer flows.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user (with password hash) by login email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, AuthError>;

    /// Find a user by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError>;
}

/// [`UserDirectory`] backed by the `users` table.
#[derive(Debug, Clone)]
pub struct SqlUserDirectory {
    pool: SqlitePool,
}

impl SqlUserDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every user, ordered by id.
    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            "SELECT id, username, email FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, username, email)| User {
                id,
                username,
                email,
            })
            .collect())
    }
}

#[async_trait]
impl UserDirectory for SqlUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, AuthError> {
        let row = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id, username, email, password_hash FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, username, email, password_hash)| UserWithPassword {
            user: User {
                id,
                username,
                email,
            },
            password_hash,
        }))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query_as::<_, (String, String, String)>(
            "SELECT id, username, email FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id, username, email)| User {
            id,
            username,
            email,
        }))
    }
}
