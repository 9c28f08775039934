//! Request extractors that validate input before any handler logic runs.
//! Every rejection is a 400 with an `{error}` body.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use rapport_types::api::{CredentialsRequest, UpdatePasswordRequest};

use crate::error::ApiError;

/// Field-level checks applied after deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// `Json<T>` that answers 400 instead of 422 and runs `T::validate`.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// The `{id}` path segment, required to be a positive integer.
#[derive(Debug, Clone, Copy)]
pub struct UserIdPath(pub i64);

impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let invalid = || ApiError::BadRequest("id must be a positive integer".into());

        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid())?;

        if id < 1 {
            return Err(invalid());
        }
        Ok(UserIdPath(id))
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl Validate for CredentialsRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("username", &self.username)?;
        require_non_empty("password", &self.password)
    }
}

impl Validate for UpdatePasswordRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty("currentPassword", &self.current_password)?;
        require_non_empty("newPassword", &self.new_password)
    }
}
