pub mod error;
pub mod extract;
pub mod likes;
pub mod middleware;
pub mod service;
pub mod users;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::OriginalUri,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use rapport_crypto::TokenIssuer;
use rapport_db::Database;
use rapport_types::api::RouteNotFound;

use crate::service::{LikeService, UserService};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub users: UserService,
    pub likes: LikeService,
    pub tokens: TokenIssuer,
}

impl AppStateInner {
    /// Wire both services to the same database handle.
    pub fn new(db: Arc<Database>, tokens: TokenIssuer) -> AppState {
        Arc::new(Self {
            users: UserService::new(db.clone()),
            likes: LikeService::new(db),
            tokens,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let auth = from_fn_with_state(state.clone(), middleware::authenticate);

    let user_routes = Router::new()
        .route("/me", get(users::me))
        .route("/me/update-password", post(users::update_password))
        .route_layer(auth.clone())
        .route("/signup", post(users::signup))
        .route("/login", post(users::login));

    let like_routes = Router::new()
        .route("/most-liked", get(likes::most_liked))
        .route("/user/{id}", get(likes::user_likes))
        .route("/user/{id}/likers", get(likes::likers))
        .route("/user/{id}/like", post(likes::like))
        .route("/user/{id}/unlike", delete(likes::unlike))
        .route_layer(auth);

    Router::new()
        .route("/health", get(health))
        .nest("/user-api", user_routes)
        .nest("/like-api", like_routes)
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<RouteNotFound>) {
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFound {
            message: format!("{} is not a valid URL route", uri),
        }),
    )
}
