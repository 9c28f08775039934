use axum::{Json, extract::State, http::StatusCode};
use tracing::info;

use rapport_types::api::{CredentialsRequest, MeResponse, TokenResponse, UpdatePasswordRequest};
use rapport_types::models::User;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::middleware::AuthUser;

/// POST /user-api/signup
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user_id = state.users.create(&req.username, &req.password).await?;
    let token = state.tokens.issue(user_id)?;

    Ok(Json(TokenResponse { token }))
}

/// POST /user-api/login
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user_id = state.users.authenticate(&req.username, &req.password).await?;
    let token = state.tokens.issue(user_id)?;

    info!("User {} logged in", user_id);
    Ok(Json(TokenResponse { token }))
}

/// GET /user-api/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = require_user(&state, user_id).await?;
    Ok(Json(MeResponse { user }))
}

/// POST /user-api/me/update-password
pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(req): ValidJson<UpdatePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .users
        .change_password(user_id, &req.current_password, &req.new_password)
        .await?;

    Ok(StatusCode::OK)
}

/// Load an active user or answer 404.
pub(crate) async fn require_user(state: &AppState, user_id: i64) -> Result<User, ApiError> {
    state
        .users
        .get(user_id)
        .await?
        .ok_or(ApiError::UserNotFound)
}
