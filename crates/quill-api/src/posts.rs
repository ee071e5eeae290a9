use axum::{Json, extract::State, http::{Method, StatusCode}};
use tracing::info;

use quill_types::api::{CreatePostForm, PostResponse};

use crate::convert::post_response;
use crate::error::ApiError;
use crate::extract::{ApiForm, ApiPath};
use crate::state::{AppState, run_db};
use crate::validate::{numeric_id, required};

pub async fn create_post(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<CreatePostForm>,
) -> Result<StatusCode, ApiError> {
    let title = required(form.title, "Title is required.")?;
    let body = required(form.body, "Content is required.")?;
    let author = required(form.author_id, "Author is required.")?;
    let author_id = numeric_id(&author, "Author must be a numeric id.")?;

    let created = run_db(&state, move |db| db.create_post(&title, &body, author_id)).await?;

    match created {
        Some(post_id) => {
            info!(post_id, author_id, "Post created");
            Ok(StatusCode::CREATED)
        }
        None => Err(ApiError::validation("Author does not exist.")),
    }
}

/// Newest first, joined with the author's username.
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let rows = run_db(&state, |db| db.list_posts()).await?;
    Ok(Json(rows.into_iter().map(post_response).collect()))
}

/// GET and DELETE /post/{id}, show-then-delete.
pub async fn post_detail(
    State(state): State<AppState>,
    method: Method,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<PostResponse>, ApiError> {
    let delete = method == Method::DELETE;

    let row = run_db(&state, move |db| {
        if delete {
            db.take_post(id)
        } else {
            db.get_post(id)
        }
    })
    .await?
    .ok_or_else(|| ApiError::not_found("No post with that ID"))?;

    if delete {
        info!(post_id = id, "Post deleted");
    }

    Ok(Json(post_response(row)))
}
