//! Create follow table migration.

use sea_orm_migration::prelude::*;

use crate::entities::follow::{PAIR_CONSTRAINT, SELF_FOLLOW_CONSTRAINT};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Follow::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Follow::UserId).integer().not_null())
                    .col(ColumnDef::new(Follow::FollowingId).integer().not_null())
                    // Primary key: (user_id, following_id) - prevent duplicate follows
                    .primary_key(
                        Index::create()
                            .name(PAIR_CONSTRAINT)
                            .col(Follow::UserId)
                            .col(Follow::FollowingId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_user")
                            .from(Follow::Table, Follow::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_following")
                            .from(Follow::Table, Follow::FollowingId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Check: a user cannot follow themselves
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "ALTER TABLE follow ADD CONSTRAINT {SELF_FOLLOW_CONSTRAINT} \
                 CHECK (user_id <> following_id)"
            ))
            .await?;

        // Index: following_id (for cascades from the followed side)
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_following_id")
                    .table(Follow::Table)
                    .col(Follow::FollowingId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Follow::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Follow {
    Table,
    UserId,
    FollowingId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
