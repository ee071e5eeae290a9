use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Duration;

use quill_crypto::keys::secret_from_base64;

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub api_prefix: String,
    /// `None` means a throwaway secret is generated at startup.
    pub token_secret: Option<[u8; 32]>,
    pub token_ttl: Duration,
    pub admin_username: String,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port: u16 = var("QUILL_PORT", "3000")
            .parse()
            .context("QUILL_PORT must be a port number")?;

        let ttl_days: i64 = var("QUILL_TOKEN_TTL_DAYS", "30")
            .parse()
            .context("QUILL_TOKEN_TTL_DAYS must be a whole number of days")?;
        if ttl_days <= 0 {
            bail!("QUILL_TOKEN_TTL_DAYS must be positive");
        }

        let cookie_secure: bool = var("QUILL_COOKIE_SECURE", "false")
            .parse()
            .context("QUILL_COOKIE_SECURE must be true or false")?;

        let api_prefix = var("QUILL_API_PREFIX", "/api");
        if !api_prefix.starts_with('/') {
            bail!("QUILL_API_PREFIX must start with '/'");
        }

        let token_secret = match lookup("QUILL_TOKEN_SECRET").filter(|v| !v.trim().is_empty()) {
            Some(encoded) => Some(
                secret_from_base64(encoded.trim())
                    .context("QUILL_TOKEN_SECRET must be 32 random bytes, base64-encoded")?,
            ),
            None => None,
        };

        Ok(Self {
            host: var("QUILL_HOST", "0.0.0.0"),
            port,
            db_path: var("QUILL_DB_PATH", "quill.db").into(),
            api_prefix,
            token_secret,
            token_ttl: Duration::days(ttl_days),
            admin_username: var("QUILL_ADMIN_USERNAME", "admin"),
            cookie_secure,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port).parse()?;
        Ok(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_crypto::keys::{generate_token_secret, secret_to_base64};
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.admin_username, "admin");
        assert_eq!(config.token_ttl, Duration::days(30));
        assert_eq!(config.db_path, PathBuf::from("quill.db"));
        assert!(config.token_secret.is_none());
        assert!(!config.cookie_secure);
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn overrides() {
        let secret = generate_token_secret();
        let encoded = secret_to_base64(&secret);
        let config = load(&[
            ("QUILL_HOST", "127.0.0.1"),
            ("QUILL_PORT", "8080"),
            ("QUILL_API_PREFIX", "/v1"),
            ("QUILL_TOKEN_SECRET", &encoded),
            ("QUILL_TOKEN_TTL_DAYS", "7"),
            ("QUILL_ADMIN_USERNAME", "root"),
            ("QUILL_COOKIE_SECURE", "true"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.api_prefix, "/v1");
        assert_eq!(config.token_secret, Some(secret));
        assert_eq!(config.token_ttl, Duration::days(7));
        assert_eq!(config.admin_username, "root");
        assert!(config.cookie_secure);
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = load(&[("QUILL_PORT", ""), ("QUILL_TOKEN_SECRET", "  ")]).unwrap();
        assert_eq!(config.port, 3000);
        assert!(config.token_secret.is_none());
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(load(&[("QUILL_PORT", "eighty")]).is_err());
        assert!(load(&[("QUILL_TOKEN_TTL_DAYS", "0")]).is_err());
        assert!(load(&[("QUILL_COOKIE_SECURE", "yes please")]).is_err());
        assert!(load(&[("QUILL_API_PREFIX", "api")]).is_err());
        assert!(load(&[("QUILL_TOKEN_SECRET", "dev-secret-change-me")]).is_err());
    }
}
