//! Capability traits the services depend on. `Database` implements both;
//! tests can substitute their own.

use anyhow::Result;

use crate::models::{LikeCountRow, LikedUserRow, UserRow};

pub trait UserStore: Send + Sync + 'static {
    /// Active (non-deleted) user by id.
    fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>>;

    /// Active (non-deleted) user by exact, case-sensitive username.
    fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>>;

    fn insert_user(&self, username: &str, password_hash: &str) -> Result<()>;

    fn update_password(&self, id: i64, password_hash: &str) -> Result<()>;
}

pub trait LikeStore: Send + Sync + 'static {
    /// Insert the edge, or revive it if it was soft-deleted. An active edge is left untouched.
    fn upsert_like(&self, sender_id: i64, receiver_id: i64) -> Result<()>;

    /// Soft-delete the edge. Missing or already deleted edges are ignored.
    fn soft_delete_like(&self, sender_id: i64, receiver_id: i64) -> Result<()>;

    fn like_count(&self, user_id: i64) -> Result<Option<LikeCountRow>>;

    /// Users ordered by received likes, highest first. `None` means no limit.
    fn most_liked_users(&self, limit: Option<u32>) -> Result<Vec<LikedUserRow>>;

    /// Active users currently liking `user_id`, most recent first.
    fn likers_of(&self, user_id: i64) -> Result<Vec<UserRow>>;
}
