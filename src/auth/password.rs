//! Password Hashing
//! Mission: Salted one-way hashing of account passwords with bcrypt

use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// bcrypt work factor applied to every stored password.
pub const PASSWORD_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum HashingError {
    #[error("{0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hash a plaintext password for storage.
pub fn hash(plaintext: &str) -> Result<String, HashingError> {
    Ok(bcrypt::hash(plaintext, PASSWORD_COST)?)
}

/// Check a plaintext password against a stored digest.
///
/// Mismatches and unparseable digests both yield `false`.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    match bcrypt::verify(plaintext, digest) {
        Ok(valid) => valid,
        Err(e) => {
            debug!("Rejecting unverifiable password digest: {}", e);
            false
        }
    }
}

/// [`hash`] on the blocking pool.
pub async fn hash_blocking(plaintext: String) -> Result<String, HashingError> {
    tokio::task::spawn_blocking(move || hash(&plaintext)).await?
}

/// [`verify`] on the blocking pool.
pub async fn verify_blocking(plaintext: String, digest: String) -> Result<bool, HashingError> {
    Ok(tokio::task::spawn_blocking(move || verify(&plaintext, &digest)).await?)
}

/// Burn one verification for an unknown username so the response time
/// matches a wrong-password attempt.
pub async fn verify_dummy(plaintext: String) -> Result<(), HashingError> {
    static DUMMY_DIGEST: OnceLock<Option<String>> = OnceLock::new();

    tokio::task::spawn_blocking(move || {
        let digest = DUMMY_DIGEST.get_or_init(|| hash("food-delivery-dummy-password").ok());
        if let Some(digest) = digest {
            let _ = verify(&plaintext, digest);
        }
    })
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let digest = hash("password123").unwrap();

        assert_ne!(digest, "password123");
        assert!(digest.starts_with("$2"));
        assert!(digest.contains("$10$"));

        assert!(verify("password123", &digest));
        assert!(!verify("wrongpassword", &digest));
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash("same-password").unwrap();
        let second = hash("same-password").unwrap();

        assert_ne!(first, second);
        assert!(verify("same-password", &first));
        assert!(verify("same-password", &second));
    }

    #[test]
    fn test_malformed_digest_does_not_verify() {
        assert!(!verify("password123", "not-a-bcrypt-digest"));
        assert!(!verify("password123", ""));
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let digest = hash_blocking("secret-pass".to_string()).await.unwrap();

        assert!(verify_blocking("secret-pass".to_string(), digest.clone())
            .await
            .unwrap());
        assert!(!verify_blocking("other-pass".to_string(), digest)
            .await
            .unwrap());
        verify_dummy("anything".to_string()).await.unwrap();
    }
}
