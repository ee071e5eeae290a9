use axum::{Json, extract::State, http::Method};
use tracing::info;

use quill_types::api::{UserDetail, UserSummary};

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::state::{AppState, run_db};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let rows = run_db(&state, |db| db.list_users()).await?;

    Ok(Json(
        rows.into_iter()
            .map(|row| UserSummary {
                id: row.id,
                username: row.username,
            })
            .collect(),
    ))
}

/// GET and DELETE /user/{id}. A delete still answers with the user as it
/// was before removal.
pub async fn user_detail(
    State(state): State<AppState>,
    method: Method,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserDetail>, ApiError> {
    let delete = method == Method::DELETE;

    let row = run_db(&state, move |db| {
        if delete {
            db.take_user(id)
        } else {
            db.get_user_by_id(id)
        }
    })
    .await?
    .ok_or_else(|| ApiError::not_found("No user with that ID"))?;

    if delete {
        info!(user_id = id, username = %row.username, "User deleted");
    }

    Ok(Json(UserDetail {
        username: row.username,
    }))
}
