//! Post endpoints.

use axum::{
    Json, Router,
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::SecondsFormat;
use serde::Serialize;
use yatube_common::AppResult;
use yatube_core::{CreatePostInput, UpdatePostInput};
use yatube_db::entities::{post, user};

use crate::{
    extractors::{PageParams, WriteUser, parse_id},
    middleware::AppState,
    response::{Listing, Page, Paginated},
};

/// Post response.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i32,
    /// Author username.
    pub author: String,
    pub text: String,
    pub pub_date: String,
    /// Public image URL.
    pub image: Option<String>,
    /// Group ID.
    pub group: Option<i32>,
}

impl PostResponse {
    fn render(state: &AppState, post: post::Model, author: Option<user::Model>) -> Self {
        Self {
            image: state.post_service.image_url(&post),
            id: post.id,
            author: author.map(|a| a.username).unwrap_or_default(),
            text: post.text,
            pub_date: post.pub_date.to_rfc3339_opts(SecondsFormat::Micros, true),
            group: post.group_id,
        }
    }
}

/// List posts, newest first.
async fn list_posts(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Listing<PostResponse>>> {
    let Some(page) = Page::resolve(&params, &state.pagination) else {
        let posts = state.post_service.list(None, 0).await?;
        let results = posts
            .into_iter()
            .map(|(post, author)| PostResponse::render(&state, post, author))
            .collect();
        return Ok(Json(Listing::All(results)));
    };

    let count = state.post_service.count().await?;
    let posts = state
        .post_service
        .list(Some(page.limit), page.offset)
        .await?;
    let results = posts
        .into_iter()
        .map(|(post, author)| PostResponse::render(&state, post, author))
        .collect();

    Ok(Json(Listing::Page(Paginated::new(
        results,
        count,
        page,
        &state.public_url,
        &uri,
    ))))
}

/// Create a post as the requesting user.
async fn create_post(
    State(state): State<AppState>,
    WriteUser(author): WriteUser,
    Json(input): Json<CreatePostInput>,
) -> AppResult<(StatusCode, Json<PostResponse>)> {
    let post = state.post_service.create(&author, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(PostResponse::render(&state, post, Some(author))),
    ))
}

/// Get a post.
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostResponse>> {
    let (post, author) = state.post_service.get(parse_id(&id)?).await?;
    Ok(Json(PostResponse::render(&state, post, author)))
}

async fn update(
    state: &AppState,
    user: user::Model,
    id: &str,
    input: UpdatePostInput,
    partial: bool,
) -> AppResult<Json<PostResponse>> {
    let post = state
        .post_service
        .update(parse_id(id)?, &user, input, partial)
        .await?;
    Ok(Json(PostResponse::render(state, post, Some(user))))
}

/// Replace a post's fields.
async fn put_post(
    State(state): State<AppState>,
    WriteUser(user): WriteUser,
    Path(id): Path<String>,
    Json(input): Json<UpdatePostInput>,
) -> AppResult<Json<PostResponse>> {
    update(&state, user, &id, input, false).await
}

/// Update some of a post's fields.
async fn patch_post(
    State(state): State<AppState>,
    WriteUser(user): WriteUser,
    Path(id): Path<String>,
    Json(input): Json<UpdatePostInput>,
) -> AppResult<Json<PostResponse>> {
    update(&state, user, &id, input, true).await
}

/// Delete a post.
async fn delete_post(
    State(state): State<AppState>,
    WriteUser(user): WriteUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.post_service.delete(parse_id(&id)?, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/", get(list_posts).post(create_post))
        .route(
            "/posts/{post_id}/",
            get(get_post)
                .put(put_post)
                .patch(patch_post)
                .delete(delete_post),
        )
}
