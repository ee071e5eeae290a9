use anyhow::Result;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;

/// Generate a random 256-bit secret for signing session tokens.
pub fn generate_token_secret() -> [u8; 32] {
    let mut key = [0u8; 32];
    rand::rng().fill_bytes(&mut key);
    key
}

/// Encode a secret to base64 for display/config files.
pub fn secret_to_base64(key: &[u8; 32]) -> String {
    BASE64.encode(key)
}

/// Decode a base64 secret.
pub fn secret_from_base64(encoded: &str) -> Result<[u8; 32]> {
    let bytes = BASE64.decode(encoded)?;
    let key: [u8; 32] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("Invalid secret length"))?;
    Ok(key)
}
