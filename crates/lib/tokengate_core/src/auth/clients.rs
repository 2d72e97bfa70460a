//! Client registry: applications allowed to call the token endpoint.
//!
//! Every seeded user registers the same shared (APP_ID, APP_SECRET) pair.
//! Entries are keyed by client id, so repeated registration overwrites and the
//! registry holds one record per distinct application id.

use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::models::auth::{ClientRecord, User};

/// In-memory client registry.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: DashMap<String, ClientRecord>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
        }
    }

    /// Build a registry with the shared application credentials registered
    /// against every user.
    pub fn from_users<'a>(
        app_id: &str,
        app_secret: &str,
        users: impl IntoIterator<Item = &'a User>,
    ) -> Self {
        let registry = Self::new();
        for user in users {
            registry.register(app_id, app_secret, &user.id);
        }
        registry
    }

    /// Insert or overwrite a client entry.
    pub fn register(&self, client_id: &str, secret: &str, bound_user_id: &str) {
        self.clients.insert(
            client_id.to_string(),
            ClientRecord {
                id: client_id.to_string(),
                secret: secret.to_string(),
                bound_user_id: bound_user_id.to_string(),
            },
        );
    }

    /// Exact match on both client id and secret.
    pub fn authenticate(&self, client_id: &str, secret: &str) -> bool {
        // Clone out so the shard lock is released before comparing.
        let stored = match self.clients.get(client_id) {
            Some(entry) => entry.secret.clone(),
            None => return false,
        };
        secrets_equal(&stored, secret)
    }

    /// Fetch a client record by id.
    pub fn get(&self, client_id: &str) -> Option<ClientRecord> {
        self.clients.get(client_id).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// Compare fixed-length digests without short-circuiting.
fn secrets_equal(a: &str, b: &str) -> bool {
    let da = Sha256::digest(a.as_bytes());
    let db = Sha256::digest(b.as_bytes());
    da.iter().zip(db.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            username: format!("{id}-name"),
            email: format!("{id}@example.com"),
        }
    }

    #[test]
    fn authenticate_requires_exact_pair() {
        let registry = ClientRegistry::new();
        registry.register("app", "s3cret", "u1");

        assert!(registry.authenticate("app", "s3cret"));
        assert!(!registry.authenticate("app", "s3cre"));
        assert!(!registry.authenticate("app", "s3cret "));
        assert!(!registry.authenticate("app", ""));
        assert!(!registry.authenticate("ap", "s3cret"));
        assert!(!registry.authenticate("other", "s3cret"));
    }

    #[test]
    fn register_is_idempotent_and_overwrites() {
        let registry = ClientRegistry::new();
        registry.register("app", "old", "u1");
        registry.register("app", "new", "u2");
        registry.register("app", "new", "u2");

        assert_eq!(registry.len(), 1);
        assert!(!registry.authenticate("app", "old"));
        assert!(registry.authenticate("app", "new"));
        assert_eq!(registry.get("app").unwrap().bound_user_id, "u2");
    }

    #[test]
    fn from_users_registers_shared_pair() {
        let users = [user("u1"), user("u2"), user("u3")];
        let registry = ClientRegistry::from_users("app", "shared", users.iter());

        assert_eq!(registry.len(), 1);
        assert!(registry.authenticate("app", "shared"));
        assert_eq!(registry.get("app").unwrap().bound_user_id, "u3");
    }

    #[test]
    fn empty_user_set_registers_nothing() {
        let registry = ClientRegistry::from_users("app", "shared", std::iter::empty());
        assert!(registry.is_empty());
        assert!(!registry.authenticate("app", "shared"));
    }
}
