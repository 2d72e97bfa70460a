//! # tokengate_api
//!
//! HTTP API library for Tokengate.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokengate_core::auth::clients::ClientRegistry;
use tokengate_core::auth::directory::UserDirectory;
use tokengate_core::auth::tokens::TokenStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{home, oauth};

/// Token endpoint path.
pub const OAUTH_PATH: &str = "/oauth";

/// Protected profile endpoint path.
pub const HOME_PATH: &str = "/home";

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read-only user lookups.
    pub directory: Arc<dyn UserDirectory>,
    /// Applications allowed to call the token endpoint.
    pub clients: Arc<ClientRegistry>,
    /// Issued access tokens.
    pub tokens: Arc<TokenStore>,
    /// API configuration.
    pub config: ApiConfig,
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new().route(
        OAUTH_PATH,
        get(oauth::token_handler).post(oauth::token_handler),
    );

    // Protected routes (require a bearer token)
    let protected = Router::new()
        .route(HOME_PATH, get(home::home_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_bearer,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
