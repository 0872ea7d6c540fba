//! JWT endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use serde_json::{Value, json};
use yatube_common::{AppResult, TokenPair};
use yatube_core::AccessToken;

use crate::middleware::AppState;

/// Credentials for obtaining a token pair.
#[derive(Debug, Deserialize)]
pub struct TokenCreateRequest {
    pub username: String,
    pub password: String,
}

/// Refresh request.
#[derive(Debug, Deserialize)]
pub struct TokenRefreshRequest {
    pub refresh: String,
}

/// Verify request.
#[derive(Debug, Deserialize)]
pub struct TokenVerifyRequest {
    pub token: String,
}

/// Obtain an access/refresh pair.
async fn create_token(
    State(state): State<AppState>,
    Json(req): Json<TokenCreateRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state
        .user_service
        .obtain_tokens(&req.username, &req.password)
        .await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for an access token.
async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRefreshRequest>,
) -> AppResult<Json<AccessToken>> {
    Ok(Json(state.user_service.refresh_access(&req.refresh).await?))
}

/// Check a token.
async fn verify_token(
    State(state): State<AppState>,
    Json(req): Json<TokenVerifyRequest>,
) -> AppResult<Json<Value>> {
    state.user_service.verify_token(&req.token)?;
    Ok(Json(json!({})))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jwt/create/", post(create_token))
        .route("/jwt/refresh/", post(refresh_token))
        .route("/jwt/verify/", post(verify_token))
}
