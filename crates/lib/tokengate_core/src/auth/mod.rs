//! Authentication and authorization logic.
//!
//! Provides password hashing, the user directory contract, the client
//! registry and the in-memory access token store shared by `tokengate_api`.

pub mod clients;
pub mod directory;
pub mod password;
pub mod tokens;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Client authentication failed")]
    ClientRejected,

    #[error("Invalid credentials")]
    UserRejected,

    #[error("Password mismatch")]
    Mismatch,

    #[error("Token not found")]
    TokenNotFound,

    #[error("Token expired")]
    TokenExpired,

    #[error("Hashing failure: {0}")]
    HashingFailure(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
