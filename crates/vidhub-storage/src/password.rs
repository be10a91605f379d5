// Password hashing using Argon2id
//
// Decision: Argon2id with default parameters; the cost is fixed, not
// configurable, so every stored hash is comparable over time.
// Hashing runs only at registration and password change; plain update paths
// never touch the password field, so nothing is ever double-hashed.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    Ok(hash.to_string())
}

/// Verify a candidate password against a stored hash.
///
/// Fails closed: an unparseable stored hash counts as a non-match (logged
/// server-side) rather than an error the caller could mishandle.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(e) => {
            tracing::warn!("Stored password hash is unparseable: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
