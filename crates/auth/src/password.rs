//! Password hashing with Argon2id.
//!
//! Hashing is deliberately slow. Async callers should go through
//! [`hash_blocking`] and [`verify_blocking`] so the work runs on the blocking
//! pool instead of a runtime worker.

use std::sync::OnceLock;

use argon2::Argon2;
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};

use crate::error::CredentialError;

/// Hashes a plaintext password with a fresh random salt.
pub fn hash(plaintext: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Checks a plaintext password against a stored digest.
///
/// Returns `Ok(false)` on mismatch. Only an unreadable digest or a hasher
/// failure is an error.
pub fn verify(digest: &str, plaintext: &str) -> Result<bool, CredentialError> {
    let parsed =
        PasswordHash::new(digest).map_err(|e| CredentialError::MalformedDigest(e.to_string()))?;

    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::Hash(e.to_string())),
    }
}

/// [`hash`] on the blocking thread pool.
pub async fn hash_blocking(plaintext: String) -> Result<String, CredentialError> {
    tokio::task::spawn_blocking(move || hash(&plaintext)).await?
}

/// [`verify`] on the blocking thread pool.
pub async fn verify_blocking(digest: String, plaintext: String) -> Result<bool, CredentialError> {
    tokio::task::spawn_blocking(move || verify(&digest, &plaintext)).await?
}

static DECOY_DIGEST: OnceLock<String> = OnceLock::new();

fn decoy_digest() -> Result<&'static str, CredentialError> {
    if let Some(digest) = DECOY_DIGEST.get() {
        return Ok(digest);
    }
    let digest = hash("decoy password, never assigned to an account")?;
    Ok(DECOY_DIGEST.get_or_init(|| digest))
}

/// Spends the cost of a verification when there is no account to check.
///
/// Login for an unknown email runs this so it takes as long as a wrong password.
pub async fn verify_decoy_blocking(plaintext: String) -> Result<(), CredentialError> {
    tokio::task::spawn_blocking(move || verify(decoy_digest()?, &plaintext).map(|_| ())).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_password_verifies() {
        let digest = hash("correct horse battery staple").unwrap();
        assert!(verify(&digest, "correct horse battery staple").unwrap());
    }

    #[test]
    fn wrong_password_is_false_not_error() {
        let digest = hash("correct horse battery staple").unwrap();
        assert!(!verify(&digest, "Tr0ub4dor&3").unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash("password123").unwrap();
        let b = hash("password123").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
    }

    #[test]
    fn malformed_digest_is_an_error() {
        let result = verify("not-a-phc-string", "password123");
        assert!(matches!(result, Err(CredentialError::MalformedDigest(_))));
    }

    #[tokio::test]
    async fn blocking_wrappers_agree_with_sync_versions() {
        let digest = hash_blocking("password123".to_string()).await.unwrap();
        assert!(
            verify_blocking(digest.clone(), "password123".to_string())
                .await
                .unwrap()
        );
        assert!(!verify_blocking(digest, "password124".to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn decoy_verification_runs_a_real_argon2_check() {
        verify_decoy_blocking("guess".to_string()).await.unwrap();

        let digest = decoy_digest().unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(!verify(digest, "guess").unwrap());
    }
}
