use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Request bodies arrive form-encoded. Every field is optional at the wire
// level so that a missing field and an empty field produce the same
// validation message.

// -- Auth --

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user_id: i64,
    pub username: String,
    pub token: String,
}

// -- Users --

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDetail {
    pub username: String,
}

// -- Posts --

#[derive(Debug, Default, Deserialize)]
pub struct CreatePostForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
}

/// A post joined with its author's username.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created: DateTime<Utc>,
    pub author_id: i64,
    pub username: String,
}

// -- Comments --

#[derive(Debug, Default, Deserialize)]
pub struct CreateCommentForm {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
}

/// `post_id` stays raw text: a value that is not a post id filters out
/// everything rather than failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct CommentQuery {
    #[serde(default)]
    pub post_id: Option<String>,
}

/// A comment joined with its author's username.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub created: DateTime<Utc>,
    pub body: String,
    pub username: String,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
