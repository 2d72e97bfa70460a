//! Authentication middleware: bearer token extraction and validation.

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tokengate_core::models::auth::User;

use crate::AppState;
use crate::error::AppError;
use crate::services::bearer::{extract_bearer, validate_bearer};

/// Key used to store the resolved `User` in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

#[derive(Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

/// Axum middleware: extracts the bearer token, resolves it to a user,
/// and injects `AuthenticatedUser` into request extensions.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let query_token = Query::<TokenQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(q)| q.access_token);

    let token = extract_bearer(request.headers(), query_token.as_deref())?;
    let user = validate_bearer(&state, &token).await?;

    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}
