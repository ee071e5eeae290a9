use sha2::{Digest, Sha256};

/// Hex SHA-256 of a stored password hash.
///
/// Session tokens carry this instead of the hash itself. Any change to the
/// stored hash changes the fingerprint, which invalidates outstanding tokens.
pub fn password_fingerprint(password_hash: &str) -> String {
    hex::encode(Sha256::digest(password_hash.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_and_hex() {
        let a = password_fingerprint("$argon2id$v=19$m=19456,t=2,p=1$abc$def");
        let b = password_fingerprint("$argon2id$v=19$m=19456,t=2,p=1$abc$def");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn differs_per_hash() {
        assert_ne!(password_fingerprint("hash-one"), password_fingerprint("hash-two"));
    }
}
