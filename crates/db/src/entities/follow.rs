//! Follow entity (subscription of one user to another).
//!
//! The `(user_id, following_id)` pair is the primary key. Storage also
//! rejects rows where both sides are the same user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the primary key constraint on the follow pair.
pub const PAIR_CONSTRAINT: &str = "pk_follow";

/// Name of the check constraint forbidding self-follows.
pub const SELF_FOLLOW_CONSTRAINT: &str = "follow_prevent_self_follow";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follow")]
pub struct Model {
    /// The user who is following
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,

    /// The user being followed
    #[sea_orm(primary_key, auto_increment = false)]
    pub following_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Follower,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FollowingId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Following,
}

/// Joins resolve to the followed user.
impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Following.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
