//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, User, comment, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use yatube_common::{AppError, AppResult};

/// A comment joined with its author.
pub type CommentWithAuthor = (comment::Model, Option<user::Model>);

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID within a post.
    pub async fn find_in_post(&self, post_id: i32, id: i32) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID within a post, returning an error if not found.
    pub async fn get_in_post(&self, post_id: i32, id: i32) -> AppResult<comment::Model> {
        self.find_in_post(post_id, id)
            .await?
            .ok_or_else(|| AppError::CommentNotFound(id.to_string()))
    }

    /// Find a comment within a post together with its author.
    pub async fn find_in_post_with_author(
        &self,
        post_id: i32,
        id: i32,
    ) -> AppResult<Option<CommentWithAuthor>> {
        Comment::find_by_id(id)
            .filter(comment::Column::PostId.eq(post_id))
            .find_also_related(User)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a post's comments newest first.
    pub async fn list_by_post_with_authors(
        &self,
        post_id: i32,
    ) -> AppResult<Vec<CommentWithAuthor>> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .find_also_related(User)
            .order_by_desc(comment::Column::Created)
            .order_by_desc(comment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a comment.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
