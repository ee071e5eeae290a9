use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Create the tables if they do not exist yet. The schema is never altered.
pub fn create(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS user (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            role        TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS post (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id   INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            created     TEXT NOT NULL DEFAULT (datetime('now')),
            title       TEXT NOT NULL,
            body        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_post_created
            ON post(created);

        CREATE TABLE IF NOT EXISTS comment (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id     INTEGER NOT NULL REFERENCES post(id) ON DELETE CASCADE,
            author_id   INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            created     TEXT NOT NULL DEFAULT (datetime('now')),
            body        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_comment_post
            ON comment(post_id, created);
        ",
    )?;

    info!("Database schema ready");
    Ok(())
}
