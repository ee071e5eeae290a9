use crate::models::{CommentRow, PostRow, UserRow};
use crate::Database;
use anyhow::Result;
use quill_types::models::Role;
use rusqlite::{Connection, ffi};

const POST_SELECT: &str = "SELECT p.id, p.title, p.body, p.created, p.author_id, u.username
     FROM post p
     JOIN user u ON p.author_id = u.id";

const COMMENT_SELECT: &str = "SELECT c.id, c.post_id, c.author_id, c.created, c.body, u.username
     FROM comment c
     JOIN post p ON c.post_id = p.id
     JOIN user u ON c.author_id = u.id";

impl Database {
    // -- Users --

    /// Insert a user. Returns `None` when the username is already taken;
    /// the UNIQUE constraint is the final arbiter, not any pre-check.
    pub fn create_user(&self, username: &str, password_hash: &str, role: Role) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO user (username, password, role) VALUES (?1, ?2, ?3)",
                (username, password_hash, role.as_str()),
            );
            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(e) if is_constraint(&e, ffi::SQLITE_CONSTRAINT_UNIQUE) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, password, role FROM user ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Remove the user together with their posts and comments (cascade),
    /// returning the row as it was. Lookup and delete share one lock, so
    /// only one of several concurrent callers gets `Some`.
    pub fn take_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let Some(user) = query_user(conn, "id = ?1", id)? else {
                return Ok(None);
            };
            conn.execute("DELETE FROM user WHERE id = ?1", [id])?;
            Ok(Some(user))
        })
    }

    // -- Posts --

    /// Returns `None` when `author_id` does not reference a user.
    pub fn create_post(&self, title: &str, body: &str, author_id: i64) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO post (title, body, author_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![title, body, author_id],
            );
            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(e) if is_constraint(&e, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// All posts, newest first. Posts created within the same second are
    /// ordered by id so the order is stable.
    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{POST_SELECT} ORDER BY p.created DESC, p.id DESC"
            ))?;
            let rows = stmt
                .query_map([], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    /// Remove the post and its comments (cascade), returning the post as it was.
    pub fn take_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let Some(post) = query_post(conn, id)? else {
                return Ok(None);
            };
            conn.execute("DELETE FROM post WHERE id = ?1", [id])?;
            Ok(Some(post))
        })
    }

    // -- Comments --

    /// Returns `None` when `author_id` or `post_id` does not reference a row.
    pub fn create_comment(&self, body: &str, author_id: i64, post_id: i64) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO comment (body, author_id, post_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![body, author_id, post_id],
            );
            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(e) if is_constraint(&e, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Comments oldest first, optionally restricted to one post.
    pub fn list_comments(&self, post_id: Option<i64>) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{COMMENT_SELECT}
                 WHERE (?1 IS NULL OR c.post_id = ?1)
                 ORDER BY c.created ASC, c.id ASC"
            ))?;
            let rows = stmt
                .query_map([post_id], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_comment(&self, id: i64) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| query_comment(conn, id))
    }

    pub fn take_comment(&self, id: i64) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let Some(comment) = query_comment(conn, id)? else {
                return Ok(None);
            };
            conn.execute("DELETE FROM comment WHERE id = ?1", [id])?;
            Ok(Some(comment))
        })
    }
}

fn query_user<P: rusqlite::ToSql>(conn: &Connection, filter: &str, value: P) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, password, role FROM user WHERE {filter}"
    ))?;

    let row = stmt.query_row([value], user_from_row).optional()?;

    Ok(row)
}

fn query_post(conn: &Connection, id: i64) -> Result<Option<PostRow>> {
    let mut stmt = conn.prepare(&format!("{POST_SELECT} WHERE p.id = ?1"))?;
    Ok(stmt.query_row([id], post_from_row).optional()?)
}

fn query_comment(conn: &Connection, id: i64) -> Result<Option<CommentRow>> {
    let mut stmt = conn.prepare(&format!("{COMMENT_SELECT} WHERE c.id = ?1"))?;
    Ok(stmt.query_row([id], comment_from_row).optional()?)
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        role: row.get(3)?,
    })
}

fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        created: row.get(3)?,
        author_id: row.get(4)?,
        username: row.get(5)?,
    })
}

fn comment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        post_id: row.get(1)?,
        author_id: row.get(2)?,
        created: row.get(3)?,
        body: row.get(4)?,
        username: row.get(5)?,
    })
}

fn is_constraint(err: &rusqlite::Error, extended_code: std::os::raw::c_int) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.extended_code == extended_code)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_author() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let id = db.create_user("alice", "hash", Role::User).unwrap().unwrap();
        (db, id)
    }

    #[test]
    fn duplicate_username_rejected_by_constraint() {
        let (db, id) = db_with_author();
        assert_eq!(id, 1);
        assert!(db.create_user("alice", "other-hash", Role::User).unwrap().is_none());
        assert_eq!(db.list_users().unwrap().len(), 1);
    }

    #[test]
    fn user_lookup_by_id_and_name() {
        let db = Database::open_in_memory().unwrap();
        let id = db.create_user("admin", "h", Role::Admin).unwrap().unwrap();

        let by_id = db.get_user_by_id(id).unwrap().unwrap();
        assert_eq!(by_id.username, "admin");
        assert!(by_id.role().is_admin());

        let by_name = db.get_user_by_username("admin").unwrap().unwrap();
        assert_eq!(by_name.id, id);

        assert!(db.get_user_by_id(999).unwrap().is_none());
        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn posts_newest_first() {
        let (db, author) = db_with_author();
        let first = db.create_post("one", "body", author).unwrap().unwrap();
        let second = db.create_post("two", "body", author).unwrap().unwrap();

        let posts = db.list_posts().unwrap();
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(posts[0].username, "alice");
    }

    #[test]
    fn post_with_unknown_author_rejected() {
        let (db, _) = db_with_author();
        assert!(db.create_post("t", "b", 42).unwrap().is_none());
        assert!(db.list_posts().unwrap().is_empty());
    }

    #[test]
    fn comments_filtered_and_oldest_first() {
        let (db, author) = db_with_author();
        let p1 = db.create_post("p1", "b", author).unwrap().unwrap();
        let p2 = db.create_post("p2", "b", author).unwrap().unwrap();

        let c1 = db.create_comment("first", author, p1).unwrap().unwrap();
        let c2 = db.create_comment("other post", author, p2).unwrap().unwrap();
        let c3 = db.create_comment("second", author, p1).unwrap().unwrap();

        let all: Vec<i64> = db.list_comments(None).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(all, vec![c1, c2, c3]);

        let filtered = db.list_comments(Some(p1)).unwrap();
        let ids: Vec<i64> = filtered.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![c1, c3]);
        assert!(filtered.iter().all(|c| c.post_id == p1));

        assert!(db.list_comments(Some(999)).unwrap().is_empty());
    }

    #[test]
    fn comment_with_unknown_post_rejected() {
        let (db, author) = db_with_author();
        assert!(db.create_comment("c", author, 7).unwrap().is_none());
    }

    #[test]
    fn delete_post_cascades_to_comments() {
        let (db, author) = db_with_author();
        let post = db.create_post("p", "b", author).unwrap().unwrap();
        let comment = db.create_comment("c", author, post).unwrap().unwrap();

        let taken = db.take_post(post).unwrap().unwrap();
        assert_eq!(taken.title, "p");
        assert_eq!(taken.username, "alice");
        assert!(db.get_post(post).unwrap().is_none());
        assert!(db.get_comment(comment).unwrap().is_none());
        assert!(db.take_post(post).unwrap().is_none());
    }

    #[test]
    fn delete_user_cascades() {
        let (db, author) = db_with_author();
        let post = db.create_post("p", "b", author).unwrap().unwrap();
        db.create_comment("c", author, post).unwrap().unwrap();

        assert_eq!(db.take_user(author).unwrap().unwrap().username, "alice");
        assert!(db.get_user_by_id(author).unwrap().is_none());
        assert!(db.list_posts().unwrap().is_empty());
        assert!(db.list_comments(None).unwrap().is_empty());
    }

    #[test]
    fn take_comment_only_once() {
        let (db, author) = db_with_author();
        let post = db.create_post("p", "b", author).unwrap().unwrap();
        let comment = db.create_comment("c", author, post).unwrap().unwrap();

        let taken = db.take_comment(comment).unwrap().unwrap();
        assert_eq!((taken.id, taken.post_id, taken.body.as_str()), (comment, post, "c"));
        assert!(db.take_comment(comment).unwrap().is_none());
        assert!(db.get_post(post).unwrap().is_some());
    }

    #[test]
    fn concurrent_takes_yield_one_row() {
        let (db, author) = db_with_author();
        let post = db.create_post("p", "b", author).unwrap().unwrap();
        let db = std::sync::Arc::new(db);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || db.take_post(post).unwrap().is_some())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|took| *took)
            .count();
        assert_eq!(winners, 1);
    }
}
