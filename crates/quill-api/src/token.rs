use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quill_crypto::fingerprint::password_fingerprint;

/// Self-contained session claim held by the client.
///
/// It is never trusted on its own: the gate re-checks it against the user
/// row on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionClaim {
    #[serde(rename = "uid")]
    pub user_id: i64,
    pub username: String,
    pub issued_at: i64,
    /// SHA-256 of the stored password hash at issue time.
    #[serde(rename = "pwd")]
    pub password_fingerprint: String,
    #[serde(rename = "exp")]
    pub expires_at: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    Signature,
    #[error("token has expired")]
    Expired,
}

impl From<jsonwebtoken::errors::Error> for DecodeError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => DecodeError::Signature,
            ErrorKind::ExpiredSignature => DecodeError::Expired,
            _ => DecodeError::Malformed,
        }
    }
}

/// Signs and verifies session tokens (HS256 over the JSON claim).
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Build the claim for a freshly authenticated user.
    pub fn mint(&self, user_id: i64, username: &str, password_hash: &str) -> SessionClaim {
        self.mint_at(user_id, username, password_hash, Utc::now())
    }

    pub fn mint_at(
        &self,
        user_id: i64,
        username: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> SessionClaim {
        SessionClaim {
            user_id,
            username: username.to_string(),
            issued_at: now.timestamp(),
            password_fingerprint: password_fingerprint(password_hash),
            expires_at: (now + self.ttl).timestamp().max(0) as u64,
        }
    }

    pub fn encode(&self, claim: &SessionClaim) -> anyhow::Result<String> {
        let token = encode(&Header::new(Algorithm::HS256), claim, &self.encoding)?;
        Ok(token)
    }

    /// Structure and signature are checked before any field is read.
    pub fn decode(&self, token: &str) -> Result<SessionClaim, DecodeError> {
        let data = decode::<SessionClaim>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}
