//! Authentication domain models.
//!
//! `User` is the only shape that ever leaves the process; the password hash
//! travels separately in `UserWithPassword` and has no `Serialize` impl.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// User with password hash (for internal auth flows).
#[derive(Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

impl std::fmt::Debug for UserWithPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserWithPassword")
            .field("user", &self.user)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Registered application allowed to call the token endpoint.
#[derive(Clone)]
pub struct ClientRecord {
    pub id: String,
    pub secret: String,
    /// User the entry was last registered against.
    pub bound_user_id: String,
}

impl std::fmt::Debug for ClientRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRecord")
            .field("id", &self.id)
            .field("bound_user_id", &self.bound_user_id)
            .finish_non_exhaustive()
    }
}

/// An issued access token.
///
/// `value` is the only copy of the plaintext token; the store keeps a digest.
#[derive(Clone)]
pub struct Token {
    pub value: String,
    pub user_id: String,
    pub client_id: String,
    pub issued_at: DateTime<Utc>,
    pub ttl: chrono::Duration,
    /// Always `None`: refresh issuance is disabled.
    pub refresh_token: Option<String>,
}

impl Token {
    /// Instant after which the token is no longer accepted.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + self.ttl
    }

    /// TTL in whole seconds, as reported in `expires_in`.
    pub fn expires_in(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("user_id", &self.user_id)
            .field("client_id", &self.client_id)
            .field("issued_at", &self.issued_at)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// What a token value resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBinding {
    pub user_id: String,
    pub client_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
