use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::thread_rng;

use crate::error::AppError;

/// Argon2id with a fresh random salt, encoded as a PHC string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::internal(format!("Password hashing failed: {err}")))?
        .to_string();
    Ok(hash)
}

/// A stored value that is not a valid hash never matches.
pub fn verify_password(hash: &str, password: &str) -> Result<(), AppError> {
    let mismatch = || AppError::password_mismatch("password doesn't match");

    let parsed = PasswordHash::new(hash).map_err(|err| {
        tracing::warn!(error = %err, "stored password hash is malformed");
        mismatch()
    })?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| mismatch())
}
