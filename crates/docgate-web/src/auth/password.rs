//! Argon2 password hashes for user documents.
//!
//! Hashing and verification are CPU-heavy, so the request path goes through
//! [`hash_on_pool`] and [`verify_user`], which run on tokio's blocking pool.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

use crate::store::User;

/// Produces a PHC string (`$argon2id$...`) for `password`.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))
}

/// `Ok(false)` on a wrong password; `Err` only if `stored` is not a valid
/// PHC string.
pub fn matches(stored: &str, password: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| anyhow::anyhow!("Stored password hash is malformed: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub async fn hash_on_pool(password: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// Checks `password` against `user`'s stored hash.
pub async fn verify_user(user: &User, password: String) -> anyhow::Result<bool> {
    let stored = user.password_hash.clone();
    tokio::task::spawn_blocking(move || matches(&stored, &password)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_phc_and_salted() {
        let a = hash_password("hunter2").unwrap();
        let b = hash_password("hunter2").unwrap();
        assert!(a.starts_with("$argon2"));
        assert_ne!(a, b);
        assert!(matches(&a, "hunter2").unwrap());
        assert!(!matches(&a, "hunter3").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches("not-a-hash", "hunter2").is_err());
    }

    #[tokio::test]
    async fn verify_user_uses_stored_hash() {
        let hash = hash_on_pool("pw".to_string()).await.unwrap();
        let user = User::new("alice".to_string(), hash);
        assert!(verify_user(&user, "pw".to_string()).await.unwrap());
        assert!(!verify_user(&user, "nope".to_string()).await.unwrap());
    }
}
