//! Database row types. Each maps directly to a SQLite row.
//! Distinct from quill-types API models to keep the DB layer independent.

use quill_types::models::Role;

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: String,
}

impl UserRow {
    pub fn role(&self) -> Role {
        Role::from_column(&self.role)
    }
}

/// Post joined with the author's username.
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created: String,
    pub author_id: i64,
    pub username: String,
}

/// Comment joined with the author's username.
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub created: String,
    pub body: String,
    pub username: String,
}
