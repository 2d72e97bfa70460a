//! Protected profile endpoint.

use axum::Extension;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;

/// `GET /home`: the user the bearer token was issued for, as indented JSON.
pub async fn home_handler(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> AppResult<Response> {
    let mut body = serde_json::to_string_pretty(&user)
        .map_err(|e| AppError::Internal(format!("serialize user: {e}")))?;
    body.push('\n');
    Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
}
