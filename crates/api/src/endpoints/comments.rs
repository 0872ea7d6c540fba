//! Comment endpoints, scoped to one post.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::SecondsFormat;
use serde::Serialize;
use yatube_common::AppResult;
use yatube_core::CommentInput;
use yatube_db::entities::{comment, user};

use crate::{
    extractors::{WriteUser, parse_id},
    middleware::AppState,
};

/// Comment response.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i32,
    /// Author username.
    pub author: String,
    /// Post ID.
    pub post: i32,
    pub text: String,
    pub created: String,
}

impl CommentResponse {
    fn render(comment: comment::Model, author: Option<user::Model>) -> Self {
        Self {
            id: comment.id,
            author: author.map(|a| a.username).unwrap_or_default(),
            post: comment.post_id,
            text: comment.text,
            created: comment.created.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// List a post's comments, newest first.
async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Json<Vec<CommentResponse>>> {
    let comments = state.comment_service.list(parse_id(&post_id)?).await?;
    Ok(Json(
        comments
            .into_iter()
            .map(|(comment, author)| CommentResponse::render(comment, author))
            .collect(),
    ))
}

/// Comment on a post as the requesting user.
async fn create_comment(
    State(state): State<AppState>,
    WriteUser(author): WriteUser,
    Path(post_id): Path<String>,
    Json(input): Json<CommentInput>,
) -> AppResult<(StatusCode, Json<CommentResponse>)> {
    let comment = state
        .comment_service
        .create(parse_id(&post_id)?, &author, input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse::render(comment, Some(author))),
    ))
}

/// Get one comment.
async fn get_comment(
    State(state): State<AppState>,
    Path((post_id, id)): Path<(String, String)>,
) -> AppResult<Json<CommentResponse>> {
    let (comment, author) = state
        .comment_service
        .get(parse_id(&post_id)?, parse_id(&id)?)
        .await?;
    Ok(Json(CommentResponse::render(comment, author)))
}

async fn update(
    state: &AppState,
    user: user::Model,
    (post_id, id): (String, String),
    input: CommentInput,
    partial: bool,
) -> AppResult<Json<CommentResponse>> {
    let comment = state
        .comment_service
        .update(parse_id(&post_id)?, parse_id(&id)?, &user, input, partial)
        .await?;
    Ok(Json(CommentResponse::render(comment, Some(user))))
}

/// Replace a comment's text.
async fn put_comment(
    State(state): State<AppState>,
    WriteUser(user): WriteUser,
    Path(ids): Path<(String, String)>,
    Json(input): Json<CommentInput>,
) -> AppResult<Json<CommentResponse>> {
    update(&state, user, ids, input, false).await
}

/// Update a comment.
async fn patch_comment(
    State(state): State<AppState>,
    WriteUser(user): WriteUser,
    Path(ids): Path<(String, String)>,
    Json(input): Json<CommentInput>,
) -> AppResult<Json<CommentResponse>> {
    update(&state, user, ids, input, true).await
}

/// Delete a comment.
async fn delete_comment(
    State(state): State<AppState>,
    WriteUser(user): WriteUser,
    Path((post_id, id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .comment_service
        .delete(parse_id(&post_id)?, parse_id(&id)?, &user)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/posts/{post_id}/comments/",
            get(list_comments).post(create_comment),
        )
        .route(
            "/posts/{post_id}/comments/{id}/",
            get(get_comment)
                .put(put_comment)
                .patch(patch_comment)
                .delete(delete_comment),
        )
}
