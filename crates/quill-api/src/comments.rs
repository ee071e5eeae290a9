use axum::{Json, extract::State, http::{Method, StatusCode}};
use tracing::info;

use quill_types::api::{CommentQuery, CommentResponse, CreateCommentForm};

use crate::convert::comment_response;
use crate::error::ApiError;
use crate::extract::{ApiForm, ApiPath, ApiQuery};
use crate::state::{AppState, run_db};
use crate::validate::{numeric_id, required};

pub async fn create_comment(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<CreateCommentForm>,
) -> Result<StatusCode, ApiError> {
    let body = required(form.body, "Content is required.")?;
    let post = required(form.post_id, "Post is required.")?;
    let post_id = numeric_id(&post, "Post must be a numeric id.")?;
    let author = required(form.author_id, "Author is required.")?;
    let author_id = numeric_id(&author, "Author must be a numeric id.")?;

    let created = run_db(&state, move |db| db.create_comment(&body, author_id, post_id)).await?;

    match created {
        Some(comment_id) => {
            info!(comment_id, post_id, author_id, "Comment created");
            Ok(StatusCode::CREATED)
        }
        None => Err(ApiError::validation("Author or post does not exist.")),
    }
}

/// Oldest first; `?post_id=` restricts to one post.
pub async fn list_comments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CommentQuery>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let filter = match query.post_id {
        None => None,
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(post_id) => Some(post_id),
            Err(_) => return Ok(Json(Vec::new())),
        },
    };

    let rows = run_db(&state, move |db| db.list_comments(filter)).await?;
    Ok(Json(rows.into_iter().map(comment_response).collect()))
}

pub async fn comment_detail(
    State(state): State<AppState>,
    method: Method,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<CommentResponse>, ApiError> {
    let delete = method == Method::DELETE;

    let row = run_db(&state, move |db| {
        if delete {
            db.take_comment(id)
        } else {
            db.get_comment(id)
        }
    })
    .await?
    .ok_or_else(|| ApiError::not_found("No comment with that ID"))?;

    if delete {
        info!(comment_id = id, "Comment deleted");
    }

    Ok(Json(comment_response(row)))
}
