//! User service: registration, credentials and JWT handling.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;
use yatube_common::{AppError, AppResult, JwtKeys, TokenPair, TokenType};
use yatube_db::{entities::user, repositories::UserRepository};

use super::validation::USERNAME_RE;

/// Input for registering a user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 150), regex(path = *USERNAME_RE))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
}

/// Freshly issued access token.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access: String,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    keys: JwtKeys,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, keys: JwtKeys) -> Self {
        Self { user_repo, keys }
    }

    /// Register a new user.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(username_taken());
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            username: Set(input.username),
            password: Set(password_hash),
            email: Set(input.email.unwrap_or_default()),
            first_name: Set(input.first_name.unwrap_or_default()),
            last_name: Set(input.last_name.unwrap_or_default()),
            is_active: Set(true),
            date_joined: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await.map_err(|e| match e {
            AppError::Conflict(_) => username_taken(),
            other => other,
        })?;

        tracing::info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: i32) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active || !verify_password(password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Resolve the principal behind an access token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.keys.verify_typed(token, TokenType::Access)?;
        let user = self
            .user_repo
            .find_by_id(claims.user_id()?)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::Unauthorized);
        }
        Ok(user)
    }

    /// Exchange credentials for an access/refresh pair.
    pub async fn obtain_tokens(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user = self.authenticate(username, password).await?;
        self.keys.issue_pair(user.id, &user.username)
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh_access(&self, refresh: &str) -> AppResult<AccessToken> {
        let claims = self.keys.verify_typed(refresh, TokenType::Refresh)?;
        let user = self
            .user_repo
            .find_by_id(claims.user_id()?)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::Unauthorized)?;

        Ok(AccessToken {
            access: self.keys.issue(user.id, &user.username, TokenType::Access)?,
        })
    }

    /// Check that a token of either type is valid.
    pub fn verify_token(&self, token: &str) -> AppResult<()> {
        self.keys.verify(token).map(|_| ())
    }

    /// Delete the principal's account after confirming the password.
    ///
    /// Posts, comments and follows go with it through the foreign keys.
    pub async fn delete_account(
        &self,
        user: &user::Model,
        current_password: &str,
    ) -> AppResult<()> {
        if !verify_password(current_password, &user.password)? {
            return Err(AppError::field("current_password", "Invalid password."));
        }

        self.user_repo.delete(user.id).await?;
        tracing::info!(user_id = user.id, "Deleted account");
        Ok(())
    }
}

fn username_taken() -> AppError {
    AppError::field("username", "A user with that username already exists.")
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn keys() -> JwtKeys {
        JwtKeys::new(b"test-secret", Duration::minutes(5), Duration::days(1))
    }

    fn create_test_user(id: i32, username: &str, password: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            password: hash_password(password).unwrap(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            date_joined: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase) -> UserService {
        UserService::new(UserRepository::new(Arc::new(db.into_connection())), keys())
    }

    fn input(username: &str, password: &str) -> CreateUserInput {
        CreateUserInput {
            username: username.to_string(),
            password: password.to_string(),
            email: None,
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_user_short_password() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        assert!(matches!(
            svc.create(input("leo", "short")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_user_invalid_username() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        assert!(matches!(
            svc.create(input("leo tolstoy", "long_enough")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_user_taken() {
        let existing = create_test_user(1, "leo", "long_enough");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        assert!(matches!(
            svc.create(input("leo", "long_enough")).await,
            Err(AppError::InvalidField { field: "username", .. })
        ));
    }

    #[tokio::test]
    async fn test_create_user() {
        let created = create_test_user(1, "leo", "long_enough");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created]]),
        );

        let user = svc.create(input("leo", "long_enough")).await.unwrap();
        assert_eq!(user.username, "leo");
    }

    #[tokio::test]
    async fn test_obtain_and_use_tokens() {
        let user = create_test_user(7, "leo", "long_enough");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_results([[user.clone()]])
                .append_query_results([[user]]),
        );

        let pair = svc.obtain_tokens("leo", "long_enough").await.unwrap();

        let principal = svc.authenticate_by_token(&pair.access).await.unwrap();
        assert_eq!(principal.id, 7);

        let refreshed = svc.refresh_access(&pair.refresh).await.unwrap();
        assert!(svc.verify_token(&refreshed.access).is_ok());
    }

    #[tokio::test]
    async fn test_refresh_token_does_not_authenticate() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let pair = keys().issue_pair(7, "leo").unwrap();

        assert!(matches!(
            svc.authenticate_by_token(&pair.refresh).await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            svc.refresh_access(&pair.access).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let user = create_test_user(7, "leo", "long_enough");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]),
        );

        assert!(matches!(
            svc.authenticate("leo", "not_the_password").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_log_in() {
        let mut user = create_test_user(7, "leo", "long_enough");
        user.is_active = false;
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]),
        );

        assert!(svc.obtain_tokens("leo", "long_enough").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_account_checks_password() {
        let user = create_test_user(7, "leo", "long_enough");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]),
        );

        assert!(matches!(
            svc.delete_account(&user, "wrong").await,
            Err(AppError::InvalidField { field: "current_password", .. })
        ));
        svc.delete_account(&user, "long_enough").await.unwrap();
    }
}
