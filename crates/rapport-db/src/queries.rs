use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::Database;
use crate::models::{LikeCountRow, LikedUserRow, UserRow};
use crate::store::{LikeStore, UserStore};

const USER_COLUMNS: &str = "id, username, password, created_at, updated_at";

/// Received likes that count: the edge is active and so is its sender.
const ACTIVE_LIKES_OF_U: &str = "SELECT COUNT(1) FROM likes l
     JOIN users s ON s.id = l.sender_id AND s.is_deleted = 0
     WHERE l.receiver_id = u.id AND l.is_deleted = 0";

// -- Users --

impl UserStore for Database {
    fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    fn insert_user(&self, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(())
        })
    }

    fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET password = ?2, updated_at = datetime('now')
                 WHERE id = ?1 AND is_deleted = 0",
                rusqlite::params![id, password_hash],
            )?;
            Ok(())
        })
    }
}

// -- Likes --

impl LikeStore for Database {
    fn upsert_like(&self, sender_id: i64, receiver_id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO likes (sender_id, receiver_id) VALUES (?1, ?2)
                 ON CONFLICT(sender_id, receiver_id) DO UPDATE
                 SET is_deleted = 0, updated_at = datetime('now')
                 WHERE likes.is_deleted = 1",
                (sender_id, receiver_id),
            )?;
            Ok(())
        })
    }

    fn soft_delete_like(&self, sender_id: i64, receiver_id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE likes SET is_deleted = 1, updated_at = datetime('now')
                 WHERE sender_id = ?1 AND receiver_id = ?2 AND is_deleted = 0",
                (sender_id, receiver_id),
            )?;
            Ok(())
        })
    }

    fn like_count(&self, user_id: i64) -> Result<Option<LikeCountRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT u.id, u.username, ({ACTIVE_LIKES_OF_U}) AS total
                 FROM users u
                 WHERE u.id = ?1 AND u.is_deleted = 0"
            );

            let row = conn
                .query_row(&sql, [user_id], |row| {
                    Ok(LikeCountRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        total: row.get(2)?,
                    })
                })
                .optional()?;

            Ok(row)
        })
    }

    fn most_liked_users(&self, limit: Option<u32>) -> Result<Vec<LikedUserRow>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(i64::from).unwrap_or(-1);

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT u.id, u.username, u.created_at, u.updated_at,
                        ({ACTIVE_LIKES_OF_U}) AS like_count
                 FROM users u
                 WHERE u.is_deleted = 0
                 ORDER BY like_count DESC, u.id ASC
                 LIMIT ?1"
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([limit], |row| {
                    Ok(LikedUserRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        created_at: row.get(2)?,
                        updated_at: row.get(3)?,
                        like_count: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    fn likers_of(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.id, s.username, s.password, s.created_at, s.updated_at
                 FROM likes l
                 JOIN users s ON s.id = l.sender_id
                 WHERE l.receiver_id = ?1 AND l.is_deleted = 0 AND s.is_deleted = 0
                 ORDER BY l.updated_at DESC, s.id ASC",
            )?;

            let rows = stmt
                .query_map([user_id], map_user_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?1 AND is_deleted = 0"
    ))?;

    Ok(stmt.query_row([id], map_user_row).optional()?)
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ?1 AND is_deleted = 0 LIMIT 1"
    ))?;

    Ok(stmt.query_row([username], map_user_row).optional()?)
}

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_users(names: &[&str]) -> (Database, Vec<i64>) {
        let db = Database::open_in_memory().unwrap();
        let ids = names
            .iter()
            .map(|name| {
                db.insert_user(name, "hash").unwrap();
                db.get_user_by_username(name).unwrap().unwrap().id
            })
            .collect();
        (db, ids)
    }

    fn edge_rows(db: &Database, sender: i64, receiver: i64) -> (i64, i64) {
        db.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(is_deleted = 0), 0) FROM likes
                 WHERE sender_id = ?1 AND receiver_id = ?2",
                (sender, receiver),
                |r| Ok((r.get(0)?, r.get(1)?)),
            )?)
        })
        .unwrap()
    }

    fn soft_delete_user(db: &Database, id: i64) {
        db.with_conn_mut(|conn| {
            conn.execute("UPDATE users SET is_deleted = 1 WHERE id = ?1", [id])?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn user_lookup_by_id_and_name() {
        let (db, ids) = db_with_users(&["alice"]);

        let by_id = db.get_user_by_id(ids[0]).unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
        assert_eq!(by_id.password_hash, "hash");
        assert!(db.get_user_by_id(ids[0] + 100).unwrap().is_none());
    }

    #[test]
    fn usernames_are_case_sensitive() {
        let (db, _) = db_with_users(&["alice"]);
        assert!(db.get_user_by_username("Alice").unwrap().is_none());
        db.insert_user("Alice", "hash").unwrap();
    }

    #[test]
    fn duplicate_active_username_rejected() {
        let (db, _) = db_with_users(&["alice"]);
        assert!(db.insert_user("alice", "other").is_err());
    }

    #[test]
    fn deleted_username_can_be_reused() {
        let (db, ids) = db_with_users(&["alice"]);
        soft_delete_user(&db, ids[0]);

        assert!(db.get_user_by_id(ids[0]).unwrap().is_none());
        db.insert_user("alice", "fresh").unwrap();

        let row = db.get_user_by_username("alice").unwrap().unwrap();
        assert_ne!(row.id, ids[0]);
        assert_eq!(row.password_hash, "fresh");
    }

    #[test]
    fn update_password_overwrites_hash() {
        let (db, ids) = db_with_users(&["alice"]);
        db.update_password(ids[0], "new-hash").unwrap();
        assert_eq!(db.get_user_by_id(ids[0]).unwrap().unwrap().password_hash, "new-hash");
    }

    #[test]
    fn repeated_like_keeps_one_edge() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        db.upsert_like(ids[0], ids[1]).unwrap();
        db.upsert_like(ids[0], ids[1]).unwrap();

        assert_eq!(edge_rows(&db, ids[0], ids[1]), (1, 1));
        assert_eq!(db.like_count(ids[1]).unwrap().unwrap().total, 1);
    }

    #[test]
    fn unlike_soft_deletes() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        db.upsert_like(ids[0], ids[1]).unwrap();
        db.soft_delete_like(ids[0], ids[1]).unwrap();
        db.soft_delete_like(ids[0], ids[1]).unwrap();

        assert_eq!(edge_rows(&db, ids[0], ids[1]), (1, 0));
        assert_eq!(db.like_count(ids[1]).unwrap().unwrap().total, 0);
    }

    #[test]
    fn unlike_without_like_is_ignored() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        db.soft_delete_like(ids[0], ids[1]).unwrap();
        assert_eq!(edge_rows(&db, ids[0], ids[1]), (0, 0));
    }

    #[test]
    fn relike_revives_edge() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        db.upsert_like(ids[0], ids[1]).unwrap();
        db.soft_delete_like(ids[0], ids[1]).unwrap();
        db.upsert_like(ids[0], ids[1]).unwrap();

        assert_eq!(edge_rows(&db, ids[0], ids[1]), (1, 1));
        assert_eq!(db.like_count(ids[1]).unwrap().unwrap().total, 1);
    }

    #[test]
    fn likes_are_directed() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        db.upsert_like(ids[0], ids[1]).unwrap();

        assert_eq!(db.like_count(ids[0]).unwrap().unwrap().total, 0);
        assert_eq!(db.like_count(ids[1]).unwrap().unwrap().total, 1);
    }

    #[test]
    fn like_count_missing_user() {
        let (db, _) = db_with_users(&[]);
        assert!(db.like_count(42).unwrap().is_none());
    }

    #[test]
    fn deleted_senders_do_not_count() {
        let (db, ids) = db_with_users(&["alice", "bob", "carol"]);
        db.upsert_like(ids[0], ids[2]).unwrap();
        db.upsert_like(ids[1], ids[2]).unwrap();
        soft_delete_user(&db, ids[0]);

        assert_eq!(db.like_count(ids[2]).unwrap().unwrap().total, 1);
        let likers = db.likers_of(ids[2]).unwrap();
        assert_eq!(likers.len(), 1);
        assert_eq!(likers[0].username, "bob");
    }

    #[test]
    fn most_liked_sorted_descending() {
        let (db, ids) = db_with_users(&["a", "b", "c", "d"]);
        // c: 3 likes, b: 1 like, a and d: none
        for &sender in &[ids[0], ids[1], ids[3]] {
            db.upsert_like(sender, ids[2]).unwrap();
        }
        db.upsert_like(ids[0], ids[1]).unwrap();

        let ranking = db.most_liked_users(None).unwrap();
        let counts: Vec<i64> = ranking.iter().map(|r| r.like_count).collect();
        assert_eq!(counts, vec![3, 1, 0, 0]);
        assert_eq!(ranking[0].username, "c");
        assert_eq!(ranking[1].username, "b");
        // Ties fall back to id order
        assert_eq!(ranking[2].id, ids[0]);
        assert_eq!(ranking[3].id, ids[3]);
    }

    #[test]
    fn most_liked_respects_limit() {
        let (db, ids) = db_with_users(&["a", "b", "c"]);
        db.upsert_like(ids[0], ids[1]).unwrap();

        let ranking = db.most_liked_users(Some(1)).unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].id, ids[1]);
    }

    #[test]
    fn most_liked_ignores_unliked_edges() {
        let (db, ids) = db_with_users(&["a", "b"]);
        db.upsert_like(ids[0], ids[1]).unwrap();
        db.soft_delete_like(ids[0], ids[1]).unwrap();

        let ranking = db.most_liked_users(None).unwrap();
        assert!(ranking.iter().all(|r| r.like_count == 0));
    }
}
