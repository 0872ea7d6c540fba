//! Comment service.

use sea_orm::Set;
use serde::Deserialize;
use yatube_common::{AppError, AppResult};
use yatube_db::{
    entities::{comment, user},
    repositories::{CommentRepository, PostRepository, comment::CommentWithAuthor},
};

use super::permission::{Operation, object_access};
use super::validation::{optional_text, required_text};

/// Input for creating or updating a comment.
///
/// The author and post come from the request context, never the body.
#[derive(Debug, Default, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub text: Option<String>,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
        }
    }

    /// List a post's comments, newest first.
    pub async fn list(&self, post_id: i32) -> AppResult<Vec<CommentWithAuthor>> {
        self.post_repo.get_by_id(post_id).await?;
        self.comment_repo.list_by_post_with_authors(post_id).await
    }

    /// Get one comment of a post.
    pub async fn get(&self, post_id: i32, id: i32) -> AppResult<CommentWithAuthor> {
        self.post_repo.get_by_id(post_id).await?;
        self.comment_repo
            .find_in_post_with_author(post_id, id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound(id.to_string()))
    }

    /// Comment on a post.
    pub async fn create(
        &self,
        post_id: i32,
        author: &user::Model,
        input: CommentInput,
    ) -> AppResult<comment::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let text = required_text("text", input.text)?;

        let model = comment::ActiveModel {
            author_id: Set(author.id),
            text: Set(text),
            created: Set(chrono::Utc::now().into()),
            post_id: Set(post.id),
            ..Default::default()
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::debug!(comment_id = comment.id, post_id, "Created comment");
        Ok(comment)
    }

    /// Update a comment. Only its author may do this.
    ///
    /// A full update (`partial == false`) requires `text`.
    pub async fn update(
        &self,
        post_id: i32,
        id: i32,
        principal: &user::Model,
        input: CommentInput,
        partial: bool,
    ) -> AppResult<comment::Model> {
        let comment = self.load(post_id, id).await?;
        object_access(Operation::Write, Some(principal), comment.author_id).into_result()?;

        let text = if partial {
            optional_text("text", input.text)?
        } else {
            Some(required_text("text", input.text)?)
        };

        let mut active: comment::ActiveModel = comment.into();
        if let Some(text) = text {
            active.text = Set(text);
        }

        self.comment_repo.update(active).await
    }

    /// Delete a comment. Only its author may do this.
    pub async fn delete(&self, post_id: i32, id: i32, principal: &user::Model) -> AppResult<()> {
        let comment = self.load(post_id, id).await?;
        object_access(Operation::Write, Some(principal), comment.author_id).into_result()?;

        self.comment_repo.delete(comment.id).await
    }

    async fn load(&self, post_id: i32, id: i32) -> AppResult<comment::Model> {
        self.post_repo.get_by_id(post_id).await?;
        self.comment_repo.get_in_post(post_id, id).await
    }
}
