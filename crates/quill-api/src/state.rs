use std::sync::Arc;

use quill_db::Database;

use crate::error::ApiError;
use crate::token::TokenCodec;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenCodec,
    pub settings: AuthSettings,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Registering this username grants the admin role.
    pub admin_username: String,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            cookie_name: "token".to_string(),
            cookie_secure: false,
        }
    }
}

/// Run blocking work (SQLite, Argon2) off the async runtime.
pub async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?;
    Ok(result?)
}

/// Run a store operation against the shared database.
pub async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    run_blocking(move || f(&state.db)).await
}
