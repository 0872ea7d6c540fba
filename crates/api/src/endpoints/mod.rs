//! API endpoints.

mod comments;
mod follow;
mod groups;
mod jwt;
mod posts;
mod users;

use axum::Router;
use yatube_common::AppError;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(posts::router())
        .merge(comments::router())
        .merge(groups::router())
        .merge(follow::router())
        .merge(users::router())
        .merge(jwt::router())
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("No such endpoint".to_string())
}
