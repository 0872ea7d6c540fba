//! Post service.

use std::sync::Arc;

use sea_orm::Set;
use serde::{Deserialize, Deserializer};
use yatube_common::{AppError, AppResult, StorageBackend};
use yatube_db::{
    entities::{post, user},
    repositories::{GroupRepository, PostRepository, post::PostWithAuthor},
};

use super::image::decode_upload;
use super::permission::{Operation, object_access};
use super::validation::{optional_text, required_text};

/// Input for creating a post.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePostInput {
    #[serde(default)]
    pub text: Option<String>,
    /// Group ID.
    #[serde(default)]
    pub group: Option<i32>,
    /// Base64 image, optionally as a `data:` URI.
    #[serde(default)]
    pub image: Option<String>,
}

/// Input for updating a post.
///
/// `group` and `image` distinguish an absent key (keep) from `null` (clear).
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostInput {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub group: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    group_repo: GroupRepository,
    storage: Arc<dyn StorageBackend>,
    max_image_bytes: usize,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        group_repo: GroupRepository,
        storage: Arc<dyn StorageBackend>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            post_repo,
            group_repo,
            storage,
            max_image_bytes,
        }
    }

    /// Create a post authored by `author`.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreatePostInput,
    ) -> AppResult<post::Model> {
        let text = required_text("text", input.text)?;
        if let Some(group_id) = input.group {
            self.ensure_group(group_id).await?;
        }

        let image = match input.image.filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(self.store_image(&raw).await?),
            None => None,
        };

        let model = post::ActiveModel {
            author_id: Set(author.id),
            text: Set(text),
            pub_date: Set(chrono::Utc::now().into()),
            image: Set(image.clone()),
            group_id: Set(input.group),
            ..Default::default()
        };

        let post = match self.post_repo.create(model).await {
            Ok(post) => post,
            Err(e) => {
                if let Some(key) = image {
                    self.remove_image(&key).await;
                }
                return Err(e);
            }
        };

        tracing::debug!(post_id = post.id, author = %author.username, "Created post");
        Ok(post)
    }

    /// Get a post with its author.
    pub async fn get(&self, id: i32) -> AppResult<PostWithAuthor> {
        self.post_repo
            .find_with_author(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// List posts newest first.
    pub async fn list(&self, limit: Option<u64>, offset: u64) -> AppResult<Vec<PostWithAuthor>> {
        self.post_repo.list_with_authors(limit, offset).await
    }

    /// Count all posts.
    pub async fn count(&self) -> AppResult<u64> {
        self.post_repo.count().await
    }

    /// Update a post. Only its author may do this.
    ///
    /// A full update (`partial == false`) requires `text`.
    pub async fn update(
        &self,
        id: i32,
        principal: &user::Model,
        input: UpdatePostInput,
        partial: bool,
    ) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(id).await?;
        object_access(Operation::Write, Some(principal), post.author_id).into_result()?;

        let text = if partial {
            optional_text("text", input.text)?
        } else {
            Some(required_text("text", input.text)?)
        };
        if let Some(Some(group_id)) = input.group {
            self.ensure_group(group_id).await?;
        }

        let old_image = post.image.clone();
        let mut active: post::ActiveModel = post.into();

        if let Some(text) = text {
            active.text = Set(text);
        }
        if let Some(group_id) = input.group {
            active.group_id = Set(group_id);
        }

        let mut stored = None;
        let mut replaced = false;
        if let Some(image) = input.image {
            replaced = true;
            match image.filter(|s| !s.trim().is_empty()) {
                Some(raw) => {
                    let key = self.store_image(&raw).await?;
                    stored = Some(key.clone());
                    active.image = Set(Some(key));
                }
                None => active.image = Set(None),
            }
        }

        let updated = match self.post_repo.update(active).await {
            Ok(post) => post,
            Err(e) => {
                if let Some(key) = stored {
                    self.remove_image(&key).await;
                }
                return Err(e);
            }
        };

        if replaced && let Some(key) = old_image {
            self.remove_image(&key).await;
        }

        Ok(updated)
    }

    /// Delete a post and its comments. Only its author may do this.
    pub async fn delete(&self, id: i32, principal: &user::Model) -> AppResult<()> {
        let post = self.post_repo.get_by_id(id).await?;
        object_access(Operation::Write, Some(principal), post.author_id).into_result()?;

        self.post_repo.delete(post.id).await?;
        if let Some(key) = post.image {
            self.remove_image(&key).await;
        }

        tracing::debug!(post_id = id, "Deleted post");
        Ok(())
    }

    /// Public URL of a post's image.
    #[must_use]
    pub fn image_url(&self, post: &post::Model) -> Option<String> {
        post.image.as_deref().map(|key| self.storage.public_url(key))
    }

    async fn ensure_group(&self, group_id: i32) -> AppResult<()> {
        if self.group_repo.find_by_id(group_id).await?.is_none() {
            return Err(AppError::field(
                "group",
                format!("Invalid pk \"{group_id}\" - object does not exist."),
            ));
        }
        Ok(())
    }

    async fn store_image(&self, raw: &str) -> AppResult<String> {
        let image = decode_upload(raw, self.max_image_bytes)?;
        let key = format!("posts/{}.{}", uuid::Uuid::new_v4(), image.extension());
        self.storage
            .upload(&key, &image.bytes, image.content_type())
            .await?;
        Ok(key)
    }

    async fn remove_image(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(error = %e, key = %key, "Failed to remove post image");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::image::tests::png_base64;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::path::PathBuf;
    use yatube_common::LocalStorage;
    use yatube_db::entities::group;

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

    fn create_test_post(id: i32, author_id: i32, image: Option<&str>) -> post::Model {
        post::Model {
            id,
            author_id,
            text: "hello".to_string(),
            pub_date: Utc::now().into(),
            image: image.map(str::to_string),
            group_id: None,
        }
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("yatube-posts-{}", uuid::Uuid::new_v4()))
    }

    fn service(db: MockDatabase, media: PathBuf) -> PostService {
        let db = Arc::new(db.into_connection());
        PostService::new(
            PostRepository::new(db.clone()),
            GroupRepository::new(db),
            Arc::new(LocalStorage::new(media, "https://yatube.example/media".to_string())),
            1024 * 1024,
        )
    }

    #[tokio::test]
    async fn test_create_sets_author_and_pub_date() {
        let author = create_test_user(1, "leo");
        let created = create_test_post(1, 1, None);

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[created.clone()]]),
            temp_dir(),
        );

        let input = CreatePostInput {
            text: Some("hello".to_string()),
            ..Default::default()
        };
        let post = svc.create(&author, input).await.unwrap();
        assert_eq!(post.author_id, 1);
        assert_eq!(svc.image_url(&post), None);
    }

    #[tokio::test]
    async fn test_create_requires_text() {
        let author = create_test_user(1, "leo");
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres), temp_dir());

        let result = svc.create(&author, CreatePostInput::default()).await;
        assert!(matches!(
            result,
            Err(AppError::InvalidField { field: "text", .. })
        ));
    }

    #[tokio::test]
    async fn test_create_with_unknown_group() {
        let author = create_test_user(1, "leo");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group::Model>::new()]),
            temp_dir(),
        );

        let input = CreatePostInput {
            text: Some("hello".to_string()),
            group: Some(42),
            ..Default::default()
        };
        let result = svc.create(&author, input).await;
        assert!(matches!(
            result,
            Err(AppError::InvalidField { field: "group", ref message })
                if message == "Invalid pk \"42\" - object does not exist."
        ));
    }

    #[tokio::test]
    async fn test_create_with_image_stores_file() {
        let author = create_test_user(1, "leo");
        let media = temp_dir();
        let created = create_test_post(1, 1, Some("posts/x.png"));

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[created]]),
            media.clone(),
        );

        let input = CreatePostInput {
            text: Some("with picture".to_string()),
            image: Some(format!("data:image/png;base64,{}", png_base64())),
            ..Default::default()
        };
        let post = svc.create(&author, input).await.unwrap();
        assert_eq!(
            svc.image_url(&post).as_deref(),
            Some("https://yatube.example/media/posts/x.png")
        );

        let stored: Vec<_> = std::fs::read_dir(media.join("posts")).unwrap().collect();
        assert_eq!(stored.len(), 1);

        let _ = std::fs::remove_dir_all(media);
    }

    #[tokio::test]
    async fn test_update_by_non_author_forbidden() {
        let other = create_test_user(2, "anna");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post(1, 1, None)]]),
            temp_dir(),
        );

        let input = UpdatePostInput {
            text: Some("mine now".to_string()),
            ..Default::default()
        };
        let result = svc.update(1, &other, input, true).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_full_update_requires_text() {
        let author = create_test_user(1, "leo");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post(1, 1, None)]]),
            temp_dir(),
        );

        let result = svc.update(1, &author, UpdatePostInput::default(), false).await;
        assert!(matches!(
            result,
            Err(AppError::InvalidField { field: "text", .. })
        ));
    }

    #[tokio::test]
    async fn test_partial_update_by_author() {
        let author = create_test_user(1, "leo");
        let mut updated = create_test_post(1, 1, None);
        updated.text = "edited".to_string();

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post(1, 1, None)]])
                .append_query_results([[updated]]),
            temp_dir(),
        );

        let input = UpdatePostInput {
            text: Some("edited".to_string()),
            ..Default::default()
        };
        let post = svc.update(1, &author, input, true).await.unwrap();
        assert_eq!(post.text, "edited");
        assert_eq!(post.author_id, 1);
    }

    #[tokio::test]
    async fn test_delete_missing_post() {
        let author = create_test_user(1, "leo");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()]),
            temp_dir(),
        );

        assert!(matches!(
            svc.delete(9, &author).await,
            Err(AppError::PostNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_by_author() {
        let author = create_test_user(1, "leo");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_post(1, 1, Some("posts/gone.png"))]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }]),
            temp_dir(),
        );

        // The image file does not exist; removal stays best-effort.
        svc.delete(1, &author).await.unwrap();
    }

    #[test]
    fn test_update_input_distinguishes_null_from_absent() {
        let absent: UpdatePostInput = serde_json::from_str(r#"{"text":"x"}"#).unwrap();
        assert_eq!(absent.group, None);

        let cleared: UpdatePostInput = serde_json::from_str(r#"{"group":null}"#).unwrap();
        assert_eq!(cleared.group, Some(None));

        let set: UpdatePostInput = serde_json::from_str(r#"{"group":3}"#).unwrap();
        assert_eq!(set.group, Some(Some(3)));
    }
}
