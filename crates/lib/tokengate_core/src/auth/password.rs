//! Password hashing via bcrypt.
//!
//! bcrypt is deliberately slow, so the async wrappers move the work onto the
//! blocking pool. Callers must not hold any lock across them.

use std::sync::LazyLock;

use super::AuthError;

/// bcrypt cost factor.
pub const BCRYPT_COST: u32 = 10;

/// Hash compared against when the user does not exist, so an unknown email
/// costs the same as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| bcrypt::hash("tokengate-dummy-password", BCRYPT_COST).ok());

/// Hash a password with bcrypt (cost 10).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::HashingFailure(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
///
/// Returns `Mismatch` when the password does not produce the stored hash. A
/// stored hash that bcrypt cannot parse is an internal failure.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    match bcrypt::verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthError::Mismatch),
        Err(e) => Err(AuthError::HashingFailure(format!("bcrypt verify: {e}"))),
    }
}

/// Build the dummy hash now rather than on the first unknown-email request.
pub fn warm_up() {
    LazyLock::force(&DUMMY_HASH);
}

/// Burn one bcrypt verification without a real hash.
pub fn verify_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = bcrypt::verify(password, hash);
    }
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::HashingFailure(format!("hash task: {e}")))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<(), AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::HashingFailure(format!("verify task: {e}")))?
}

/// [`verify_dummy`] on the blocking pool.
pub async fn verify_dummy_blocking(password: String) {
    let _ = tokio::task::spawn_blocking(move || verify_dummy(&password)).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("secret").unwrap();
        assert!(hash.starts_with("$2"));
        assert_ne!(hash, "secret");
        assert!(verify_password("secret", &hash).is_ok());
    }

    #[test]
    fn wrong_password_is_a_mismatch() {
        let hash = hash_password("secret").unwrap();
        assert!(matches!(
            verify_password("secret ", &hash),
            Err(AuthError::Mismatch)
        ));
        assert!(matches!(verify_password("", &hash), Err(AuthError::Mismatch)));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a).is_ok());
        assert!(verify_password("same", &b).is_ok());
    }

    #[test]
    fn hashing_never_fails_on_content() {
        let long = "x".repeat(100);
        for input in ["", "ünïcødé", long.as_str()] {
            assert!(hash_password(input).is_ok(), "failed on {input:?}");
        }
    }

    #[test]
    fn malformed_hash_is_internal_failure() {
        assert!(matches!(
            verify_password("secret", "not-a-bcrypt-hash"),
            Err(AuthError::HashingFailure(_))
        ));
    }

    #[test]
    fn warm_up_builds_dummy_hash() {
        warm_up();
        let hash = DUMMY_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$2"));
        assert!(matches!(verify_password("x", hash), Err(AuthError::Mismatch)));
    }

    #[tokio::test]
    async fn blocking_wrappers_match_sync_behaviour() {
        let hash = hash_password_blocking("pw".into()).await.unwrap();
        assert!(verify_password_blocking("pw".into(), hash.clone()).await.is_ok());
        assert!(matches!(
            verify_password_blocking("nope".into(), hash).await,
            Err(AuthError::Mismatch)
        ));
        verify_dummy_blocking("anything".into()).await;
    }
}
