//! Token endpoint handler.

use axum::Json;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Query, State};
use axum::http::{Method, Uri};
use axum::http::header::{CACHE_CONTROL, PRAGMA};
use axum::response::{IntoResponse, Response};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{TokenRequest, TokenResponse};
use crate::services::grant;

/// `POST /oauth` (and `GET /oauth` when allowed): password grant.
///
/// `Form` reads the body for POST and the query string for GET. A POST also
/// takes any parameter its body lacks from the query string.
pub async fn token_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> Response {
    let no_store = [(CACHE_CONTROL, "no-store"), (PRAGMA, "no-cache")];

    match handle_token_request(&state, &method, &uri, form).await {
        Ok(resp) => (no_store, Json(resp)).into_response(),
        Err(e) => (no_store, e).into_response(),
    }
}

async fn handle_token_request(
    state: &AppState,
    method: &Method,
    uri: &Uri,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> AppResult<TokenResponse> {
    if *method == Method::GET {
        if !state.config.allow_get_access_request {
            return Err(AppError::InvalidRequest("GET token requests are disabled".into()));
        }
        let Form(req) = form.map_err(|e| AppError::InvalidRequest(e.body_text()))?;
        return grant::password_grant(state, req).await;
    }

    let body = match form {
        Ok(Form(req)) => req,
        // No form body at all: parameters may still arrive in the query.
        Err(FormRejection::InvalidFormContentType(_)) => TokenRequest::default(),
        Err(e) => return Err(AppError::InvalidRequest(e.body_text())),
    };
    let Query(query) = Query::<TokenRequest>::try_from_uri(uri)
        .map_err(|e| AppError::InvalidRequest(e.body_text()))?;
    grant::password_grant(state, body.or(query)).await
}
