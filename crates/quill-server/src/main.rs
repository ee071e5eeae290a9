mod config;

use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use quill_api::router;
use quill_api::state::{AppState, AppStateInner, AuthSettings};
use quill_api::token::TokenCodec;
use quill_crypto::keys::generate_token_secret;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill_server=debug,quill_api=debug,quill_db=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let secret = match config.token_secret {
        Some(secret) => secret,
        None => {
            warn!("QUILL_TOKEN_SECRET is unset; using a random secret, sessions will not survive a restart");
            generate_token_secret()
        }
    };

    // Init database
    let db = quill_db::Database::open(&config.db_path)?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        tokens: TokenCodec::new(&secret, config.token_ttl),
        settings: AuthSettings {
            admin_username: config.admin_username.clone(),
            cookie_secure: config.cookie_secure,
            ..AuthSettings::default()
        },
    });

    let app = router::build(state, &config.api_prefix).layer(TraceLayer::new_for_http());

    let addr = config.bind_addr()?;
    info!("Quill server listening on {} (routes under {})", addr, config.api_prefix);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
