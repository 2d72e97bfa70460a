//! In-memory access token store.
//!
//! Tokens are 64 random alphanumeric characters. The map is keyed by the
//! SHA-256 digest of the value so the plaintext only exists in the issuance
//! response. Expiry is checked on read; `purge_expired` and the cleanup task
//! bound growth for long-running processes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::AuthError;
use crate::clock::{Clock, SystemClock};
use crate::models::auth::{Token, TokenBinding};

/// Access token lifetime: 5 minutes.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 5 * 60;

/// Length of a generated token value.
const TOKEN_LEN: usize = 64;

#[derive(Debug, Clone)]
struct StoredToken {
    user_id: String,
    client_id: String,
    issued_at: DateTime<Utc>,
    ttl: chrono::Duration,
}

impl StoredToken {
    fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + self.ttl
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }
}

/// Generate a random token (64 alphanumeric chars).
fn generate_token() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// SHA-256 hash a token for use as the map key.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Store of issued access tokens.
pub struct TokenStore {
    tokens: DashMap<String, StoredToken>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
}

impl TokenStore {
    /// Store on the wall clock with the 5 minute TTL.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tokens: DashMap::new(),
            clock,
            ttl: chrono::Duration::seconds(ACCESS_TOKEN_TTL_SECS),
        }
    }

    /// Mint a token bound to `user_id` and `client_id`.
    pub fn issue(&self, user_id: &str, client_id: &str) -> Result<Token, AuthError> {
        let issued_at = self.clock.now();
        let stored = StoredToken {
            user_id: user_id.to_string(),
            client_id: client_id.to_string(),
            issued_at,
            ttl: self.ttl,
        };

        // A collision over 62^64 values is not expected; retry rather than
        // overwrite another user's binding if one ever happens.
        for _ in 0..3 {
            let value = generate_token();
            match self.tokens.entry(hash_token(&value)) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    slot.insert(stored.clone());
                    debug!(user_id, client_id, "access token issued");
                    return Ok(Token {
                        value,
                        user_id: stored.user_id,
                        client_id: stored.client_id,
                        issued_at,
                        ttl: stored.ttl,
                        refresh_token: None,
                    });
                }
            }
        }
        Err(AuthError::Internal("token value collision".into()))
    }

    /// Resolve a token value to its binding.
    pub fn lookup(&self, token_value: &str) -> Result<TokenBinding, AuthError> {
        let stored = self
            .tokens
            .get(&hash_token(token_value))
            .map(|e| e.value().clone())
            .ok_or(AuthError::TokenNotFound)?;

        if stored.is_expired(self.clock.now()) {
            return Err(AuthError::TokenExpired);
        }

        Ok(TokenBinding {
            expires_at: stored.expires_at(),
            user_id: stored.user_id,
            client_id: stored.client_id,
            issued_at: stored.issued_at,
        })
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.tokens.len();
        self.tokens.retain(|_, t| !t.is_expired(now));
        before.saturating_sub(self.tokens.len())
    }

    /// Spawn a periodic cleanup task.
    pub fn spawn_cleanup_task(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let removed = store.purge_expired();
                if removed > 0 {
                    debug!(removed, "purged expired access tokens");
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::clock::ManualClock;

    fn store_at_fixed_time() -> (Arc<ManualClock>, TokenStore) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = TokenStore::with_clock(clock.clone());
        (clock, store)
    }

    #[test]
    fn issued_token_shape() {
        let (clock, store) = store_at_fixed_time();
        let token = store.issue("u1", "app").unwrap();

        assert_eq!(token.value.len(), 64);
        assert!(token.value.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(token.issued_at, clock.now());
        assert_eq!(token.expires_in(), 300);
        assert_eq!(token.expires_at(), clock.now() + chrono::Duration::minutes(5));
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn lookup_returns_binding() {
        let (_, store) = store_at_fixed_time();
        let token = store.issue("u1", "app").unwrap();

        let binding = store.lookup(&token.value).unwrap();
        assert_eq!(binding.user_id, "u1");
        assert_eq!(binding.client_id, "app");
        assert_eq!(binding.issued_at, token.issued_at);
        assert_eq!(binding.expires_at, token.expires_at());
    }

    #[test]
    fn unknown_token_is_not_found() {
        let (_, store) = store_at_fixed_time();
        store.issue("u1", "app").unwrap();
        assert!(matches!(
            store.lookup("never-issued"),
            Err(AuthError::TokenNotFound)
        ));
        assert!(matches!(store.lookup(""), Err(AuthError::TokenNotFound)));
    }

    #[test]
    fn expiry_boundaries() {
        let (clock, store) = store_at_fixed_time();
        let token = store.issue("u1", "app").unwrap();

        clock.set(token.issued_at + chrono::Duration::seconds(4 * 60 + 59));
        assert!(store.lookup(&token.value).is_ok());

        clock.set(token.issued_at + chrono::Duration::seconds(5 * 60));
        assert!(store.lookup(&token.value).is_ok());

        clock.set(token.issued_at + chrono::Duration::seconds(5 * 60 + 1));
        assert!(matches!(
            store.lookup(&token.value),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn expired_entries_stay_until_purged() {
        let (clock, store) = store_at_fixed_time();
        let old = store.issue("u1", "app").unwrap();
        clock.advance(chrono::Duration::minutes(4));
        let fresh = store.issue("u2", "app").unwrap();
        clock.advance(chrono::Duration::minutes(2));

        assert_eq!(store.len(), 2);
        assert!(matches!(store.lookup(&old.value), Err(AuthError::TokenExpired)));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(matches!(store.lookup(&old.value), Err(AuthError::TokenNotFound)));
        assert!(store.lookup(&fresh.value).is_ok());
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        let (_, store) = store_at_fixed_time();
        let values: HashSet<String> = (0..200)
            .map(|i| store.issue(&format!("u{i}"), "app").unwrap().value)
            .collect();
        assert_eq!(values.len(), 200);
        assert_eq!(store.len(), 200);
    }

    #[test]
    fn same_user_gets_distinct_tokens() {
        let (_, store) = store_at_fixed_time();
        let a = store.issue("u1", "app").unwrap();
        let b = store.issue("u1", "app").unwrap();
        assert_ne!(a.value, b.value);
        assert!(store.lookup(&a.value).is_ok());
        assert!(store.lookup(&b.value).is_ok());
    }

    #[tokio::test]
    async fn concurrent_issue_and_lookup() {
        let store = Arc::new(TokenStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let user = format!("user-{i}");
                let token = store.issue(&user, "app").unwrap();
                let binding = store.lookup(&token.value).unwrap();
                assert_eq!(binding.user_id, user);
                token.value
            }));
        }
        let mut seen = HashSet::new();
        for h in handles {
            assert!(seen.insert(h.await.unwrap()));
        }
        assert_eq!(store.len(), 32);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_task_purges_periodically() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = Arc::new(TokenStore::with_clock(clock.clone()));
        store.issue("u1", "app").unwrap();
        clock.advance(chrono::Duration::minutes(6));

        let handle = store.spawn_cleanup_task(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert!(store.is_empty());
        handle.abort();
    }
}
