//! Wire models for the token endpoint.

use serde::{Deserialize, Serialize};

/// Token request parameters (form body and query string for POST, query
/// string for GET).
#[derive(Default, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Accepted and ignored.
    pub scope: Option<String>,
}

impl TokenRequest {
    /// Fill fields this request lacks from `fallback`. Present values win.
    pub fn or(self, fallback: TokenRequest) -> Self {
        Self {
            grant_type: self.grant_type.or(fallback.grant_type),
            client_id: self.client_id.or(fallback.client_id),
            client_secret: self.client_secret.or(fallback.client_secret),
            username: self.username.or(fallback.username),
            password: self.password.or(fallback.password),
            scope: self.scope.or(fallback.scope),
        }
    }
}

/// Successful token response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// OAuth2 error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthErrorResponse {
    pub error: String,
    pub error_description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_keeps_present_fields_and_fills_missing() {
        let body = TokenRequest {
            grant_type: Some("password".into()),
            username: Some("body@b.com".into()),
            ..Default::default()
        };
        let query = TokenRequest {
            grant_type: Some("client_credentials".into()),
            username: Some("query@b.com".into()),
            password: Some("secret".into()),
            ..Default::default()
        };

        let merged = body.or(query);
        assert_eq!(merged.grant_type.as_deref(), Some("password"));
        assert_eq!(merged.username.as_deref(), Some("body@b.com"));
        assert_eq!(merged.password.as_deref(), Some("secret"));
        assert!(merged.client_id.is_none());
    }
}
