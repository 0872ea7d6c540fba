//! Follow repository.

use std::sync::Arc;

use crate::entities::{Follow, User, follow, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, SqlErr,
    sea_query::{Expr, Func, LikeExpr},
};
use yatube_common::{AppError, AppResult};

/// A follow row joined with the followed user.
pub type FollowWithTarget = (follow::Model, Option<user::Model>);

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a follow row by its pair.
    pub async fn find_by_pair(
        &self,
        user_id: i32,
        following_id: i32,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find_by_id((user_id, following_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is following another user.
    pub async fn exists(&self, user_id: i32, following_id: i32) -> AppResult<bool> {
        Ok(self.find_by_pair(user_id, following_id).await?.is_some())
    }

    /// Insert a follow row.
    ///
    /// A primary key violation comes back as [`AppError::Conflict`], a
    /// self-follow check violation as [`AppError::Validation`].
    pub async fn create(&self, model: follow::ActiveModel) -> AppResult<follow::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| classify_insert_error(&e))
    }

    /// List the users someone follows, ordered by username.
    ///
    /// `search` is a case-insensitive substring of the followed username.
    pub async fn list_following(
        &self,
        user_id: i32,
        search: Option<&str>,
    ) -> AppResult<Vec<FollowWithTarget>> {
        let mut query = Follow::find()
            .filter(follow::Column::UserId.eq(user_id))
            .find_also_related(User)
            .order_by_asc(user::Column::Username);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((User, user::Column::Username))))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count how many users someone follows.
    pub async fn count_following(&self, user_id: i32) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn classify_insert_error(err: &DbErr) -> AppError {
    let message = err.to_string();
    let unique_violation = matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)));

    if unique_violation || message.contains(follow::PAIR_CONSTRAINT) {
        AppError::Conflict("Follow pair already exists".to_string())
    } else if message.contains(follow::SELF_FOLLOW_CONSTRAINT) {
        AppError::Validation("A user cannot follow themselves".to_string())
    } else {
        AppError::Database(message)
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, RuntimeErr, Set};

    fn create_test_user(id: i32, username: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            password: "hash".to_string(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            date_joined: Utc::now().into(),
        }
    }

    fn pair(user_id: i32, following_id: i32) -> follow::ActiveModel {
        follow::ActiveModel {
            user_id: Set(user_id),
            following_id: Set(following_id),
        }
    }

    #[tokio::test]
    async fn test_exists() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[follow::Model {
                    user_id: 1,
                    following_id: 2,
                }]])
                .append_query_results([Vec::<follow::Model>::new()])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        assert!(repo.exists(1, 2).await.unwrap());
        assert!(!repo.exists(1, 3).await.unwrap());
    }

    #[tokio::test]
    async fn test_create() {
        let created = follow::Model {
            user_id: 1,
            following_id: 2,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created.clone()]])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        assert_eq!(repo.create(pair(1, 2)).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_duplicate_maps_to_conflict() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                    "duplicate key value violates unique constraint \"pk_follow\"".to_string(),
                ))])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        assert!(matches!(
            repo.create(pair(1, 2)).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_create_self_follow_maps_to_validation() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                    "new row violates check constraint \"follow_prevent_self_follow\"".to_string(),
                ))])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        assert!(matches!(
            repo.create(pair(1, 1)).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_following() {
        let f1 = follow::Model {
            user_id: 1,
            following_id: 2,
        };
        let f2 = follow::Model {
            user_id: 1,
            following_id: 3,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    (f1, create_test_user(2, "alice")),
                    (f2, create_test_user(3, "bob")),
                ]])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        let rows = repo.list_following(1, Some("")).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].1.as_ref().unwrap().username, "bob");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a_b%c\\"), "a\\_b\\%c\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
