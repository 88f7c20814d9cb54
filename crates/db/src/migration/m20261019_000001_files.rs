//! Files table: one row per file or folder.
//!
//! Built with the schema builder so the same migration runs on PostgreSQL
//! and SQLite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Files::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Files::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Files::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Files::IsDirectory)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Files::ParentId).uuid().null())
                    .col(
                        ColumnDef::new(Files::Size)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Files::MimeType).string_len(255).null())
                    .col(ColumnDef::new(Files::ContentHash).string_len(64).null())
                    .col(ColumnDef::new(Files::StorageKey).string_len(512).null())
                    .col(
                        ColumnDef::new(Files::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Files::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    // Children go before parents on delete; no cascade.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_files_parent")
                            .from(Files::Table, Files::ParentId)
                            .to(Files::Table, Files::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing: children of one folder for one owner.
        manager
            .create_index(
                Index::create()
                    .name("idx_files_owner_parent")
                    .table(Files::Table)
                    .col(Files::OwnerId)
                    .col(Files::ParentId)
                    .to_owned(),
            )
            .await?;

        // Search by name within one owner.
        manager
            .create_index(
                Index::create()
                    .name("idx_files_owner_name")
                    .table(Files::Table)
                    .col(Files::OwnerId)
                    .col(Files::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Files::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Files {
    Table,
    Id,
    OwnerId,
    Name,
    IsDirectory,
    ParentId,
    Size,
    MimeType,
    ContentHash,
    StorageKey,
    CreatedAt,
    UpdatedAt,
}
