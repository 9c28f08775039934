use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use rapport_crypto::TokenError;
use rapport_types::api::Claims;

use crate::AppState;
use crate::error::ApiError;

/// Validate the session token in the `authorization` header, if any.
///
/// The header carries the raw token; a `Bearer ` prefix is tolerated. A
/// request without a token passes through unauthenticated, and handlers that
/// need an identity ask for [`AuthUser`]. A token that is present but fails
/// verification is rejected here with 403.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => {
            let raw = value.to_str().map_err(|_| ApiError::Token(TokenError::Invalid))?;
            raw.strip_prefix("Bearer ").unwrap_or(raw).trim().to_string()
        }
        None => String::new(),
    };

    if token.is_empty() {
        return Ok(next.run(req).await);
    }

    let claims = state.tokens.verify(&token).map_err(|e| {
        warn!("Rejected token on {}: {}", req.uri().path(), e);
        ApiError::Token(e)
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Id of the authenticated caller. Rejects with 401 when [`authenticate`]
/// attached no claims.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i64);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .map(|claims| AuthUser(claims.sub))
            .ok_or(ApiError::Unauthorized)
    }
}
