//! Application error types.
//!
//! Every authentication failure is collapsed here into a fixed external
//! shape. Raw internal errors are logged by `into_response` and never sent.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tokengate_core::auth::AuthError;
use tracing::{debug, error};

use crate::models::OAuthErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

const INVALID_REQUEST_DESC: &str = "The request is missing a required parameter, includes an \
     invalid parameter value, includes a parameter more than once, or is otherwise malformed";
const INVALID_CLIENT_DESC: &str = "Client authentication failed";
const INVALID_GRANT_DESC: &str = "The provided authorization grant or resource owner \
     credentials are invalid";
const UNSUPPORTED_GRANT_TYPE_DESC: &str =
    "The authorization grant type is not supported by the authorization server";
const SERVER_ERROR_DESC: &str = "The authorization server encountered an unexpected condition \
     that prevented it from fulfilling the request";

/// Body returned for a missing or malformed bearer credential.
pub const MISSING_TOKEN_MSG: &str = "missing access token";
/// Body returned for an unknown or expired bearer token.
pub const INVALID_TOKEN_MSG: &str = "invalid access token";

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    /// Detail is logged, not returned.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid client")]
    InvalidClient,

    #[error("Invalid grant")]
    InvalidGrant,

    #[error("Unsupported grant type: {0}")]
    UnsupportedGrantType(String),

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    fn oauth(status: StatusCode, error: &str, description: &str) -> Response {
        let body = Json(OAuthErrorResponse {
            error: error.to_string(),
            error_description: description.to_string(),
        });
        (status, body).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Internal(detail) => error!("Internal Error: {detail}"),
            other => debug!("Response Error: {other}"),
        }

        match self {
            AppError::InvalidRequest(_) => {
                Self::oauth(StatusCode::BAD_REQUEST, "invalid_request", INVALID_REQUEST_DESC)
            }
            AppError::InvalidClient => {
                Self::oauth(StatusCode::BAD_REQUEST, "invalid_client", INVALID_CLIENT_DESC)
            }
            AppError::InvalidGrant => {
                Self::oauth(StatusCode::BAD_REQUEST, "invalid_grant", INVALID_GRANT_DESC)
            }
            AppError::UnsupportedGrantType(_) => Self::oauth(
                StatusCode::BAD_REQUEST,
                "unsupported_grant_type",
                UNSUPPORTED_GRANT_TYPE_DESC,
            ),
            AppError::MissingToken => (StatusCode::BAD_REQUEST, MISSING_TOKEN_MSG).into_response(),
            AppError::Unauthorized => (StatusCode::BAD_REQUEST, INVALID_TOKEN_MSG).into_response(),
            AppError::Internal(_) => Self::oauth(
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                SERVER_ERROR_DESC,
            ),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MalformedRequest(msg) => AppError::InvalidRequest(msg),
            AuthError::ClientRejected => AppError::InvalidClient,
            AuthError::UserRejected | AuthError::Mismatch => AppError::InvalidGrant,
            AuthError::TokenNotFound | AuthError::TokenExpired => AppError::Unauthorized,
            AuthError::HashingFailure(msg) | AuthError::Internal(msg) => AppError::Internal(msg),
            AuthError::DbError(e) => AppError::Internal(e.to_string()),
        }
    }
}
