//! Follow endpoints.
//!
//! Only listing and creating exist; there is no per-follow resource.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use yatube_common::AppResult;
use yatube_core::{CreateFollowInput, FollowView};

use crate::{
    extractors::{AuthUser, SearchParams},
    middleware::AppState,
};

/// List the requesting user's follows.
async fn list_follows(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<FollowView>>> {
    let follows = state
        .follow_service
        .list(&user, params.search.as_deref())
        .await?;
    Ok(Json(follows))
}

/// Follow a user.
async fn create_follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateFollowInput>,
) -> AppResult<(StatusCode, Json<FollowView>)> {
    let follow = state.follow_service.follow(&user, input).await?;
    Ok((StatusCode::CREATED, Json(follow)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/follow/", get(list_follows).post(create_follow))
}
