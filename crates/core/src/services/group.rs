//! Group service.
//!
//! Groups are read-only over HTTP; `create` exists for administration and
//! seeding.

use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use yatube_common::{AppError, AppResult};
use yatube_db::{entities::group, repositories::GroupRepository};

use super::validation::SLUG_RE;

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 50), regex(path = *SLUG_RE))]
    pub slug: String,

    #[serde(default)]
    pub description: String,
}

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self { group_repo }
    }

    /// List all groups.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }

    /// Get a group by ID.
    pub async fn get(&self, id: i32) -> AppResult<group::Model> {
        self.group_repo.get_by_id(id).await
    }

    /// Create a group.
    pub async fn create(&self, input: CreateGroupInput) -> AppResult<group::Model> {
        input.validate()?;

        if self.group_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(slug_taken());
        }

        let model = group::ActiveModel {
            title: Set(input.title),
            slug: Set(input.slug),
            description: Set(input.description),
            ..Default::default()
        };

        let group = self.group_repo.create(model).await.map_err(|e| match e {
            AppError::Conflict(_) => slug_taken(),
            other => other,
        })?;

        tracing::info!(group_id = group.id, slug = %group.slug, "Created group");
        Ok(group)
    }
}

fn slug_taken() -> AppError {
    AppError::field("slug", "group with this slug already exists.")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_group(id: i32, slug: &str) -> group::Model {
        group::Model {
            id,
            title: format!("Group {slug}"),
            slug: slug.to_string(),
            description: String::new(),
        }
    }

    fn input(slug: &str) -> CreateGroupInput {
        CreateGroupInput {
            title: "Cats".to_string(),
            slug: slug.to_string(),
            description: "All about cats".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_groups() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_group(1, "cats"), create_test_group(2, "dogs")]])
                .into_connection(),
        );

        let svc = GroupService::new(GroupRepository::new(db));
        assert_eq!(svc.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_group() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group::Model>::new()])
                .into_connection(),
        );

        let svc = GroupService::new(GroupRepository::new(db));
        assert!(matches!(svc.get(3).await, Err(AppError::GroupNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_slug() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let svc = GroupService::new(GroupRepository::new(db));

        assert!(matches!(
            svc.create(input("no spaces")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_taken_slug() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_group(1, "cats")]])
                .into_connection(),
        );
        let svc = GroupService::new(GroupRepository::new(db));

        assert!(matches!(
            svc.create(input("cats")).await,
            Err(AppError::InvalidField { field: "slug", .. })
        ));
    }

    #[tokio::test]
    async fn test_create_group() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group::Model>::new()])
                .append_query_results([[create_test_group(4, "cats")]])
                .into_connection(),
        );
        let svc = GroupService::new(GroupRepository::new(db));

        let group = svc.create(input("cats")).await.unwrap();
        assert_eq!(group.id, 4);
    }
}
