//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Login name, also the display name in rendered records
    #[sea_orm(unique)]
    pub username: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password: String,

    #[sea_orm(default_value = "")]
    pub email: String,

    #[sea_orm(default_value = "")]
    pub first_name: String,

    #[sea_orm(default_value = "")]
    pub last_name: String,

    /// Inactive users cannot obtain or use tokens
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub date_joined: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
