use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, warn};

use quill_crypto::password::{hash_password, verify_decoy, verify_password};
use quill_types::api::{LoginForm, LoginResponse, RegisterForm};
use quill_types::models::Role;

use crate::error::ApiError;
use crate::extract::ApiForm;
use crate::state::{AppState, run_blocking, run_db};
use crate::validate::required;

const INCORRECT_CREDENTIALS: &str = "Incorrect username or password.";

fn already_registered(username: &str) -> ApiError {
    ApiError::validation(format!("{} is already registered.", username))
}

pub async fn register(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<RegisterForm>,
) -> Result<impl IntoResponse, ApiError> {
    let username = required(form.username, "Username is required.")?;
    let password = required(form.password, "Password is required.")?;

    // Fast path for the common case; the UNIQUE constraint below settles races.
    let name = username.clone();
    if run_db(&state, move |db| db.get_user_by_username(&name))
        .await?
        .is_some()
    {
        return Err(already_registered(&username));
    }

    let password_hash = run_blocking(move || hash_password(&password)).await?;

    let role = if username == state.settings.admin_username {
        Role::Admin
    } else {
        Role::User
    };

    let name = username.clone();
    let created = run_db(&state, move |db| db.create_user(&name, &password_hash, role)).await?;

    match created {
        Some(user_id) => {
            info!(user_id, username = %username, role = role.as_str(), "User registered");
            Ok(StatusCode::CREATED)
        }
        None => Err(already_registered(&username)),
    }
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    let username = required(form.username, "Username is required.")?;
    let password = required(form.password, "Password is required.")?;

    let name = username.clone();
    let Some(user) = run_db(&state, move |db| db.get_user_by_username(&name)).await? else {
        run_blocking(move || Ok(verify_decoy(&password))).await?;
        warn!(username = %username, "Login failed");
        return Err(ApiError::unauthorized(INCORRECT_CREDENTIALS));
    };

    let stored_hash = user.password.clone();
    let matches = run_blocking(move || verify_password(&password, &stored_hash)).await?;
    if !matches {
        warn!(username = %username, "Login failed");
        return Err(ApiError::unauthorized(INCORRECT_CREDENTIALS));
    }

    let claim = state.tokens.mint(user.id, &user.username, &user.password);
    let token = state.tokens.encode(&claim)?;

    let cookie = Cookie::build((state.settings.cookie_name.clone(), token.clone()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.settings.cookie_secure)
        .path("/");

    info!(user_id = user.id, username = %user.username, "User logged in");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Here is your token.".to_string(),
            user_id: user.id,
            username: user.username,
            token,
        }),
    ))
}
