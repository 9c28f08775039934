use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use rapport_db::LikeStore;
use rapport_types::models::{LikeCount, LikedUser, User};

use super::{blocking, parse_timestamp, user_from_row};

/// Upper bound for the most-liked ranking when a limit is requested.
pub const MAX_RANKING_LIMIT: u32 = 200;

#[derive(Clone)]
pub struct LikeService {
    store: Arc<dyn LikeStore>,
}

impl LikeService {
    pub fn new(store: Arc<dyn LikeStore>) -> Self {
        Self { store }
    }

    /// Like `receiver_id` as `sender_id`. Liking twice changes nothing.
    pub async fn create(&self, sender_id: i64, receiver_id: i64) -> Result<()> {
        let store = self.store.clone();
        blocking(move || store.upsert_like(sender_id, receiver_id)).await?;
        debug!("User {} likes user {}", sender_id, receiver_id);
        Ok(())
    }

    /// Withdraw a like. Unliking something never liked is not an error.
    pub async fn delete(&self, sender_id: i64, receiver_id: i64) -> Result<()> {
        let store = self.store.clone();
        blocking(move || store.soft_delete_like(sender_id, receiver_id)).await?;
        debug!("User {} no longer likes user {}", sender_id, receiver_id);
        Ok(())
    }

    pub async fn get_user_likes_count(&self, user_id: i64) -> Result<Option<LikeCount>> {
        let store = self.store.clone();
        let row = blocking(move || store.like_count(user_id)).await?;

        Ok(row.map(|r| LikeCount {
            id: r.id,
            username: r.username,
            total: r.total,
        }))
    }

    pub async fn get_most_liked_users(&self, limit: Option<u32>) -> Result<Vec<LikedUser>> {
        let limit = limit.map(|l| l.min(MAX_RANKING_LIMIT));
        let store = self.store.clone();
        let rows = blocking(move || store.most_liked_users(limit)).await?;

        Ok(rows
            .into_iter()
            .map(|r| LikedUser {
                created_at: parse_timestamp(&r.created_at, r.id),
                updated_at: parse_timestamp(&r.updated_at, r.id),
                id: r.id,
                username: r.username,
                like_count: r.like_count,
            })
            .collect())
    }

    pub async fn get_likers(&self, user_id: i64) -> Result<Vec<User>> {
        let store = self.store.clone();
        let rows = blocking(move || store.likers_of(user_id)).await?;
        Ok(rows.into_iter().map(user_from_row).collect())
    }
}
