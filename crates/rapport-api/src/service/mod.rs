//! User and like services. Both hold an injected store handle and run every
//! blocking call (SQLite, Argon2) on the blocking thread pool.

pub mod likes;
pub mod users;

pub use likes::LikeService;
pub use users::{AuthError, CreateUserError, UserService};

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use tracing::{error, warn};

use rapport_db::models::UserRow;
use rapport_types::models::User;

/// Run blocking store or hashing work off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        anyhow!("Blocking task failed: {}", e)
    })?
}

pub(crate) fn user_from_row(row: UserRow) -> User {
    User {
        created_at: parse_timestamp(&row.created_at, row.id),
        updated_at: parse_timestamp(&row.updated_at, row.id),
        id: row.id,
        username: row.username,
    }
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without a timezone; they
/// are UTC. RFC 3339 is accepted too.
pub(crate) fn parse_timestamp(raw: &str, user_id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on user {}: {}", raw, user_id, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_datetime() {
        let ts = parse_timestamp("2024-03-01 12:30:45", 1);
        assert_eq!(ts.to_rfc3339(), "2024-03-01T12:30:45+00:00");
    }

    #[test]
    fn parses_rfc3339() {
        let ts = parse_timestamp("2024-03-01T12:30:45Z", 1);
        assert_eq!(ts.timestamp(), 1_709_296_245);
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_epoch() {
        assert_eq!(parse_timestamp("yesterday", 1), DateTime::<Utc>::default());
    }
}
