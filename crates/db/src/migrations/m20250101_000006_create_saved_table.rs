//! Create saved table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Saved::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Saved::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Saved::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Saved::PostId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Saved::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_user")
                            .from(Saved::Table, Saved::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_post")
                            .from(Saved::Table, Saved::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, post_id). The toggle relies on it.
        manager
            .create_index(
                Index::create()
                    .name("idx_saved_user_post")
                    .table(Saved::Table)
                    .col(Saved::UserId)
                    .col(Saved::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: post_id (for cleanup on post delete)
        manager
            .create_index(
                Index::create()
                    .name("idx_saved_post_id")
                    .table(Saved::Table)
                    .col(Saved::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Saved::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Saved {
    Table,
    Id,
    UserId,
    PostId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}
