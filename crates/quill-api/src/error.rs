use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use quill_types::api::ErrorBody;

/// Every handler and gate failure ends up here and is rendered as
/// `{"error": "<message>"}` with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400, user-correctable input problem.
    #[error("{0}")]
    Validation(String),

    /// 404, no row for the requested id.
    #[error("{0}")]
    NotFound(String),

    /// 401, missing, invalid or insufficiently privileged token.
    #[error("{0}")]
    Unauthorized(String),

    /// 500, store or runtime fault. The cause is logged, never sent.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Store(e) => {
                error!("Store failure: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
