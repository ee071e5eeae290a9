/// Quill Crypto Library
///
/// Password hashing (Argon2id), password-hash fingerprints carried inside
/// session tokens, and random token-signing secrets.

pub mod fingerprint;
pub mod keys;
pub mod password;
