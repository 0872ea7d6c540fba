//! Group endpoints (read-only).

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use yatube_common::AppResult;
use yatube_db::entities::group;

use crate::{extractors::parse_id, middleware::AppState};

/// List all groups.
async fn list_groups(State(state): State<AppState>) -> AppResult<Json<Vec<group::Model>>> {
    Ok(Json(state.group_service.list().await?))
}

/// Get a group.
async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<group::Model>> {
    Ok(Json(state.group_service.get(parse_id(&id)?).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/groups/", get(list_groups))
        .route("/groups/{id}/", get(get_group))
}
