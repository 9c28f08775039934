use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use rapport_crypto::TokenError;
use rapport_types::api::ErrorResponse;

use crate::service::{AuthError, CreateUserError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Invalid credentials used")]
    InvalidCredentials,

    #[error("Invalid credentials used")]
    UnknownUsername,

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Unable to create the user")]
    UserCreationFailed,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::UserAlreadyExists => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Token(_) | ApiError::InvalidCredentials => StatusCode::FORBIDDEN,
            ApiError::UserNotFound | ApiError::UnknownUsername => StatusCode::NOT_FOUND,
            ApiError::UserCreationFailed | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(e) => {
                error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (self.status(), Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<CreateUserError> for ApiError {
    fn from(err: CreateUserError) -> Self {
        match err {
            CreateUserError::AlreadyExists => ApiError::UserAlreadyExists,
            CreateUserError::CreationFailed => ApiError::UserCreationFailed,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::UnknownUsername => ApiError::UnknownUsername,
            AuthError::NotFound => ApiError::UserNotFound,
            AuthError::Store(e) => ApiError::Internal(e),
        }
    }
}
