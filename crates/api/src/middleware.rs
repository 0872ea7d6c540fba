//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use url::Url;
use yatube_common::config::PaginationConfig;
use yatube_core::{CommentService, FollowService, GroupService, PostService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub group_service: GroupService,
    pub follow_service: FollowService,
    pub pagination: PaginationConfig,
    /// Public base URL, used for absolute pagination links.
    pub public_url: Url,
}

/// Authentication middleware.
///
/// A valid access token puts its user into the request extensions and a
/// request without one stays anonymous. A token that is presented but fails
/// validation is answered with 401, except on the token endpoints so that a
/// client holding an expired access token can still refresh it.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&req)
        && !is_token_endpoint(req.uri().path())
    {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                return e.into_response();
            }
        }
    }

    next.run(req).await
}

fn bearer_token(req: &Request<Body>) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// `/jwt/create/`, `/jwt/refresh/` and `/jwt/verify/`, under any prefix.
fn is_token_endpoint(path: &str) -> bool {
    path.trim_end_matches('/').rsplit('/').nth(1) == Some("jwt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_endpoints() {
        assert!(is_token_endpoint("/api/v1/jwt/create/"));
        assert!(is_token_endpoint("/api/v1/jwt/refresh/"));
        assert!(!is_token_endpoint("/api/v1/posts/"));
        assert!(!is_token_endpoint("/api/v1/jwt/"));
    }
}
