//! # tokengate_core
//!
//! Core credential, client and token logic for Tokengate.

pub mod auth;
pub mod clock;
pub mod db;
pub mod migrate;
pub mod models;
pub mod seed;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
