//! Password grant: client auth, user auth, token issuance.
//!
//! ```text
//! Start -> ClientAuthenticated -> UserAuthenticated -> TokenIssued
//!   |            |                      |
//!   v            v                      v
//! invalid_request / invalid_client / invalid_grant / server_error
//! ```

use tokengate_core::auth::AuthError;
use tokengate_core::auth::directory::UserDirectory;
use tokengate_core::auth::password::{verify_dummy_blocking, verify_password_blocking};
use tokengate_core::models::auth::User;
use tracing::{debug, info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{TokenRequest, TokenResponse};

/// The only grant type served.
pub const PASSWORD_GRANT: &str = "password";

/// Token type reported in responses.
pub const TOKEN_TYPE: &str = "Bearer";

/// Parameters after presence checks.
struct PasswordGrantRequest {
    client_id: String,
    client_secret: String,
    username: String,
    password: String,
}

fn required(value: Option<String>, name: &str) -> Result<String, AuthError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AuthError::MalformedRequest(format!("missing {name}"))),
    }
}

fn parse_request(req: TokenRequest) -> AppResult<PasswordGrantRequest> {
    let grant_type = required(req.grant_type, "grant_type")?;
    if grant_type != PASSWORD_GRANT {
        return Err(AppError::UnsupportedGrantType(grant_type));
    }
    Ok(PasswordGrantRequest {
        client_id: required(req.client_id, "client_id")?,
        client_secret: required(req.client_secret, "client_secret")?,
        username: required(req.username, "username")?,
        password: required(req.password, "password")?,
    })
}

/// Authenticate a resource owner by email and password.
///
/// Unknown email and wrong password both return `UserRejected`, and both pay
/// for one bcrypt verification.
pub async fn authenticate_user(
    directory: &dyn UserDirectory,
    email: &str,
    password: String,
) -> Result<User, AuthError> {
    let Some(found) = directory.find_by_email(email).await? else {
        verify_dummy_blocking(password).await;
        return Err(AuthError::UserRejected);
    };

    match verify_password_blocking(password, found.password_hash).await {
        Ok(()) => Ok(found.user),
        Err(AuthError::Mismatch) => Err(AuthError::UserRejected),
        Err(e) => Err(e),
    }
}

/// Run the password grant for one token request.
pub async fn password_grant(state: &AppState, req: TokenRequest) -> AppResult<TokenResponse> {
    let req = parse_request(req)?;

    if !state.clients.authenticate(&req.client_id, &req.client_secret) {
        warn!(client_id = %req.client_id, "token request rejected: client authentication failed");
        return Err(AuthError::ClientRejected.into());
    }
    debug!(client_id = %req.client_id, "client authenticated");

    let user = match authenticate_user(state.directory.as_ref(), &req.username, req.password).await
    {
        Ok(user) => user,
        Err(AuthError::UserRejected) => {
            warn!(client_id = %req.client_id, "token request rejected: invalid resource owner credentials");
            return Err(AppError::InvalidGrant);
        }
        Err(e) => return Err(e.into()),
    };
    debug!(user_id = %user.id, "resource owner authenticated");

    let token = state.tokens.issue(&user.id, &req.client_id)?;
    info!(user_id = %user.id, client_id = %req.client_id, "access token granted");

    let expires_in = token.expires_in();
    Ok(TokenResponse {
        access_token: token.value,
        token_type: TOKEN_TYPE.to_string(),
        expires_in,
    })
}
