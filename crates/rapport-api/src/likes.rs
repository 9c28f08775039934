use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
};

use rapport_types::api::MostLikedQuery;
use rapport_types::models::{LikeCount, LikedUser, User};

use crate::AppState;
use crate::error::ApiError;
use crate::extract::UserIdPath;
use crate::middleware::AuthUser;
use crate::users::require_user;

/// GET /like-api/most-liked
pub async fn most_liked(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    query: Result<Query<MostLikedQuery>, QueryRejection>,
) -> Result<Json<Vec<LikedUser>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    require_user(&state, caller).await?;

    let ranking = state.likes.get_most_liked_users(query.limit).await?;
    Ok(Json(ranking))
}

/// GET /like-api/user/{id}
pub async fn user_likes(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    UserIdPath(user_id): UserIdPath,
) -> Result<Json<LikeCount>, ApiError> {
    let count = state
        .likes
        .get_user_likes_count(user_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    Ok(Json(count))
}

/// GET /like-api/user/{id}/likers
pub async fn likers(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    UserIdPath(user_id): UserIdPath,
) -> Result<Json<Vec<User>>, ApiError> {
    require_user(&state, user_id).await?;

    let users = state.likes.get_likers(user_id).await?;
    Ok(Json(users))
}

/// POST /like-api/user/{id}/like
pub async fn like(
    State(state): State<AppState>,
    AuthUser(sender): AuthUser,
    UserIdPath(receiver): UserIdPath,
) -> Result<StatusCode, ApiError> {
    require_user(&state, sender).await?;
    require_user(&state, receiver).await?;

    state.likes.create(sender, receiver).await?;
    Ok(StatusCode::OK)
}

/// DELETE /like-api/user/{id}/unlike
pub async fn unlike(
    State(state): State<AppState>,
    AuthUser(sender): AuthUser,
    UserIdPath(receiver): UserIdPath,
) -> Result<StatusCode, ApiError> {
    require_user(&state, sender).await?;
    require_user(&state, receiver).await?;

    state.likes.delete(sender, receiver).await?;
    Ok(StatusCode::OK)
}
