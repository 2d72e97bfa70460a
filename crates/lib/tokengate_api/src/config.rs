//! API server configuration.

use thiserror::Error;

/// Configuration read failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} must be true or false, got {value:?}")]
    InvalidFlag { name: &'static str, value: String },
}

/// Configuration for the API server.
///
/// Built by the server binary from CLI flags / environment (`BIND_ADDR`,
/// `APP_ID`, `APP_SECRET`, `ALLOW_GET_ACCESS_REQUEST`).
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:8000").
    pub bind_addr: String,
    /// Shared application (client) id.
    pub app_id: String,
    /// Shared application (client) secret.
    pub app_secret: String,
    /// Accept token requests as GET with query parameters.
    pub allow_get_access_request: bool,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                   | Default        |
    /// |----------------------------|----------------|
    /// | `BIND_ADDR`                | `0.0.0.0:8000` |
    /// | `APP_ID`                   | required       |
    /// | `APP_SECRET`               | required       |
    /// | `ALLOW_GET_ACCESS_REQUEST` | `true`         |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ApiConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let allow_get_access_request = match lookup("ALLOW_GET_ACCESS_REQUEST") {
            None => true,
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidFlag {
                name: "ALLOW_GET_ACCESS_REQUEST",
                value: v,
            })?,
        };
        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".into()),
            app_id: required("APP_ID")?,
            app_secret: required("APP_SECRET")?,
            allow_get_access_request,
        })
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("allow_get_access_request", &self.allow_get_access_request)
            .finish()
    }
}
