use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

/// Hash a password with Argon2id and a fresh random salt (PHC string format).
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// Check a password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch; `Err` only if the stored hash is unparsable.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow!("Stored password hash is corrupt: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Hash of a throwaway password, built on first use with the same
/// parameters as real hashes.
static DECOY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password("quill-decoy-password").ok());

/// Spend the cost of one verification without a stored hash to check
/// against, so a login for an unknown username takes as long as a wrong
/// password. Always `false`.
pub fn verify_decoy(password: &str) -> bool {
    if let Some(hash) = DECOY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}
