//! Account endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use yatube_common::AppResult;
use yatube_core::CreateUserInput;
use yatube_db::entities::user;

use crate::{extractors::AuthUser, middleware::AppState};

/// Account response.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Account deletion request.
#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub current_password: String,
}

/// Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.user_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get the requesting user's account.
async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

/// Delete the requesting user's account.
async fn delete_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<DeleteAccountRequest>,
) -> AppResult<StatusCode> {
    state
        .user_service
        .delete_account(&user, &req.current_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/", post(register))
        .route("/users/me/", get(me).delete(delete_me))
}
