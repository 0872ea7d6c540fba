//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod follow;
pub mod group;
pub mod image;
pub mod permission;
pub mod post;
pub mod user;
pub mod validation;

pub use comment::{CommentInput, CommentService};
pub use follow::{CreateFollowInput, FollowError, FollowService, FollowView, check_follow};
pub use group::{CreateGroupInput, GroupService};
pub use permission::{Decision, Operation, collection_access, object_access, require_authenticated};
pub use post::{CreatePostInput, PostService, UpdatePostInput};
pub use user::{AccessToken, CreateUserInput, UserService};
