use serde::{Deserialize, Serialize};

use crate::models::User;

// -- JWT Claims --

/// Session token claims, shared by the issuer (rapport-crypto) and the
/// request middleware (rapport-api).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub iat: usize,
    pub exp: usize,
}

// -- Users --

/// Body of both `/signup` and `/login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// -- Likes --

#[derive(Debug, Default, Deserialize)]
pub struct MostLikedQuery {
    pub limit: Option<u32>,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body returned for paths no route matches.
#[derive(Debug, Serialize, Deserialize)]
pub struct RouteNotFound {
    pub message: String,
}
