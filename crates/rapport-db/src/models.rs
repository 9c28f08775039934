//! Database row types. These map directly to SQLite rows and stay
//! independent of the rapport-types API models.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct LikeCountRow {
    pub id: i64,
    pub username: String,
    pub total: i64,
}

pub struct LikedUserRow {
    pub id: i64,
    pub username: String,
    pub created_at: String,
    pub updated_at: String,
    pub like_count: i64,
}
