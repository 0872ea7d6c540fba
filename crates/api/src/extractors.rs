//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Deserialize;
use yatube_common::{AppError, AppResult};
use yatube_core::{Operation, collection_access, require_authenticated};
use yatube_db::entities::user;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get user from request extensions (set by auth middleware)
        let principal = parts.extensions.get::<user::Model>();
        require_authenticated(principal).cloned().map(AuthUser)
    }
}

/// Principal of a write request.
///
/// Runs the collection-level check for the request method while only the
/// head has been read, so an anonymous write is answered with 401 before any
/// body extractor can reject it.
#[derive(Debug, Clone)]
pub struct WriteUser(pub user::Model);

impl<S> FromRequestParts<S> for WriteUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts.extensions.get::<user::Model>();
        let op = Operation::from_method(parts.method.as_str());
        collection_access(op, principal).into_result()?;
        require_authenticated(principal).cloned().map(WriteUser)
    }
}

/// Limit/offset query parameters.
///
/// Kept as raw strings so malformed values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
}

/// Search query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: Option<String>,
}

/// Parse a path ID; anything that is not a valid ID cannot match a record.
pub fn parse_id(raw: &str) -> AppResult<i32> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("No record matches id {raw}")))
}
