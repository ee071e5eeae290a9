use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::session::{verify_admin, verify_user};
use crate::state::{AppState, run_db};

#[derive(Debug, Clone, Copy)]
enum Gate {
    User,
    Admin,
}

impl Gate {
    fn missing(self) -> ApiError {
        match self {
            Gate::User => ApiError::unauthorized("Please login"),
            Gate::Admin => ApiError::unauthorized("Requires admin rights"),
        }
    }

    fn invalid(self) -> ApiError {
        match self {
            Gate::User => ApiError::unauthorized("Invalid token"),
            Gate::Admin => ApiError::unauthorized("Invalid admin token"),
        }
    }
}

/// Let the request through only with a token that verifies against the
/// user it names. The verified claim is left in the request extensions.
pub async fn require_user(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    check(state, Gate::User, req, next).await
}

/// As [`require_user`], and the user must hold the admin role.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    check(state, Gate::Admin, req, next).await
}

async fn check(state: AppState, gate: Gate, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let token = session_token(req.headers(), &state.settings.cookie_name).ok_or_else(|| gate.missing())?;

    let claim = state.tokens.decode(&token).map_err(|e| {
        debug!("Rejected session token: {}", e);
        gate.invalid()
    })?;

    let candidate = claim.clone();
    let valid = run_db(&state, move |db| match gate {
        Gate::User => verify_user(db, &candidate),
        Gate::Admin => verify_admin(db, &candidate),
    })
    .await?;

    if !valid {
        warn!(user_id = claim.user_id, gate = ?gate, "Session token failed verification");
        return Err(gate.invalid());
    }

    req.extensions_mut().insert(claim);
    Ok(next.run(req).await)
}

/// Session token from the cookie, falling back to `Authorization: Bearer`.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(cookie_name).filter(|c| !c.value().is_empty()) {
        return Some(cookie.value().to_string());
    }

    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().to_string())
}
