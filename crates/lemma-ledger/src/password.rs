//! Password hashing and login cache keys.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{LedgerError, LedgerResult};

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password with Argon2id, returning the PHC string.
pub fn hash_password(password: &str) -> LedgerResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LedgerError::Internal(format!("failed to hash password: {e}")))
}

/// Check `password` against a stored PHC hash.
pub fn verify_password(password: &str, hash: &str) -> LedgerResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| LedgerError::Internal(format!("invalid password hash format: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Cache key for a successful login. Only a digest of the password is kept.
pub fn login_cache_key(account: &str, password: &str) -> String {
    let digest = blake3::hash(password.as_bytes());
    format!("login-{account}-{}", digest.to_hex())
}
