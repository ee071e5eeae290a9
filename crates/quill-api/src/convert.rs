use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use quill_db::models::{CommentRow, PostRow};
use quill_types::api::{CommentResponse, PostResponse};

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Parse as naive UTC and convert.
fn parse_created(raw: &str, what: &str, id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt created '{}' on {} '{}': {}", raw, what, id, e);
            DateTime::default()
        })
}

pub fn post_response(row: PostRow) -> PostResponse {
    PostResponse {
        created: parse_created(&row.created, "post", row.id),
        id: row.id,
        title: row.title,
        body: row.body,
        author_id: row.author_id,
        username: row.username,
    }
}

pub fn comment_response(row: CommentRow) -> CommentResponse {
    CommentResponse {
        created: parse_created(&row.created, "comment", row.id),
        id: row.id,
        post_id: row.post_id,
        author_id: row.author_id,
        body: row.body,
        username: row.username,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn sqlite_datetime_parses_as_utc() {
        let ts = parse_created("2024-03-05 14:07:09", "post", 1);
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 3, 5));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (14, 7, 9));
    }

    #[test]
    fn rfc3339_accepted() {
        let ts = parse_created("2024-03-05T14:07:09Z", "post", 1);
        assert_eq!(ts.hour(), 14);
    }

    #[test]
    fn corrupt_falls_back_to_epoch() {
        assert_eq!(parse_created("yesterday", "comment", 9), DateTime::<Utc>::default());
    }
}
