//! Follow service and the follow integrity rule.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use yatube_common::{AppError, AppResult};
use yatube_db::{
    entities::{follow, user},
    repositories::{FollowRepository, UserRepository},
};
use sea_orm::Set;

/// Reasons a follow cannot be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FollowError {
    #[error("This field is required.")]
    Missing,

    #[error("Object with username={0} does not exist.")]
    UnknownUser(String),

    #[error("You cannot follow yourself.")]
    SelfFollow,

    #[error("You are already following this user.")]
    AlreadyFollowing,
}

impl From<FollowError> for AppError {
    fn from(err: FollowError) -> Self {
        Self::field("following", err.to_string())
    }
}

/// Input for creating a follow.
///
/// The follower is always the requesting principal, so there is no `user`
/// field to honour.
#[derive(Debug, Default, Deserialize)]
pub struct CreateFollowInput {
    /// Username of the user to follow.
    #[serde(default)]
    pub following: Option<String>,
}

/// Rendered follow pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowView {
    /// Follower username.
    pub user: String,
    /// Followed username.
    pub following: String,
}

/// Validate a proposed follow before it is stored.
pub fn check_follow(
    follower: &user::Model,
    target: &user::Model,
    already_following: bool,
) -> Result<(), FollowError> {
    if follower.id == target.id {
        return Err(FollowError::SelfFollow);
    }
    if already_following {
        return Err(FollowError::AlreadyFollowing);
    }
    Ok(())
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
        }
    }

    /// Follow a user by username.
    pub async fn follow(
        &self,
        follower: &user::Model,
        input: CreateFollowInput,
    ) -> AppResult<FollowView> {
        let username = input
            .following
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(FollowError::Missing)?;

        let target = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| FollowError::UnknownUser(username.to_string()))?;

        // Self-follow needs no lookup.
        check_follow(follower, &target, false)?;
        let exists = self.follow_repo.exists(follower.id, target.id).await?;
        check_follow(follower, &target, exists)?;

        let model = follow::ActiveModel {
            user_id: Set(follower.id),
            following_id: Set(target.id),
        };

        // Another request may have inserted the same pair after the check.
        self.follow_repo.create(model).await.map_err(|e| match e {
            AppError::Conflict(_) => FollowError::AlreadyFollowing.into(),
            AppError::Validation(_) => FollowError::SelfFollow.into(),
            other => other,
        })?;

        tracing::info!(
            follower = %follower.username,
            following = %target.username,
            "Created follow"
        );

        Ok(FollowView {
            user: follower.username.clone(),
            following: target.username,
        })
    }

    /// List the principal's own follows, optionally filtered by the followed
    /// username.
    pub async fn list(
        &self,
        follower: &user::Model,
        search: Option<&str>,
    ) -> AppResult<Vec<FollowView>> {
        let rows = self.follow_repo.list_following(follower.id, search).await?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, target)| target)
            .map(|target| FollowView {
                user: follower.username.clone(),
                following: target.username,
            })
            .collect())
    }
}
