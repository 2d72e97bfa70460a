//! Bearer token validation: extract, look up, resolve the bound user.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use tokengate_core::auth::AuthError;
use tokengate_core::models::auth::User;
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the bearer token from `Authorization: Bearer <token>`, falling back
/// to an `access_token` query parameter when the header is absent.
pub fn extract_bearer(headers: &HeaderMap, query_token: Option<&str>) -> AppResult<String> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let header = value.to_str().map_err(|_| AppError::MissingToken)?;
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .ok_or(AppError::MissingToken)?;
        if token.is_empty() {
            return Err(AppError::MissingToken);
        }
        return Ok(token.to_string());
    }

    match query_token {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => Err(AppError::MissingToken),
    }
}

/// Resolve a bearer token to the user it was issued for.
pub async fn validate_bearer(state: &AppState, token: &str) -> AppResult<User> {
    let binding = state.tokens.lookup(token).map_err(|e| {
        debug!("bearer token rejected: {e}");
        AppError::from(e)
    })?;

    // The token store lock is released by `lookup`; the directory call may block.
    match state.directory.find_by_id(&binding.user_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(AuthError::Internal(format!(
            "token bound to unknown user {}",
            binding.user_id
        ))
        .into()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(auth: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        h
    }

    #[test]
    fn extracts_from_header() {
        assert_eq!(extract_bearer(&headers("Bearer abc123"), None).unwrap(), "abc123");
    }

    #[test]
    fn header_wins_over_query() {
        assert_eq!(
            extract_bearer(&headers("Bearer fromheader"), Some("fromquery")).unwrap(),
            "fromheader"
        );
    }

    #[test]
    fn falls_back_to_query() {
        assert_eq!(
            extract_bearer(&HeaderMap::new(), Some("fromquery")).unwrap(),
            "fromquery"
        );
    }

    #[test]
    fn non_bearer_header_blocks_query_fallback() {
        assert!(matches!(
            extract_bearer(&headers("Basic dXNlcjpwdw=="), Some("fromquery")),
            Err(AppError::MissingToken)
        ));
    }

    #[test]
    fn rejects_missing_and_malformed() {
        assert!(matches!(
            extract_bearer(&HeaderMap::new(), None),
            Err(AppError::MissingToken)
        ));
        assert!(matches!(
            extract_bearer(&HeaderMap::new(), Some("")),
            Err(AppError::MissingToken)
        ));
        for bad in ["Basic dXNlcjpwdw==", "Bearer ", "Bearer    ", "abc123", "bearer"] {
            assert!(
                matches!(extract_bearer(&headers(bad), None), Err(AppError::MissingToken)),
                "{bad}"
            );
        }
    }
}
