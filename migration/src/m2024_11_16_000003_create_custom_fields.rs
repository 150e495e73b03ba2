//! Migration to create the custom_fields table.
//!
//! Each row is one client-defined attribute. Names are stored normalized, so
//! the `(client_id, name)` unique index is the storage-level guard for
//! case-insensitive uniqueness within a client.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomFields::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomFields::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CustomFields::ClientId).uuid().not_null())
                    .col(ColumnDef::new(CustomFields::Name).string().not_null())
                    .col(ColumnDef::new(CustomFields::FieldType).string().not_null())
                    .col(ColumnDef::new(CustomFields::EnumOptions).json_binary().null())
                    .col(
                        ColumnDef::new(CustomFields::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CustomFields::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_custom_fields_client_id")
                            .from(CustomFields::Table, CustomFields::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_custom_fields_client_id_name")
                    .table(CustomFields::Table)
                    .col(CustomFields::ClientId)
                    .col(CustomFields::Name)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomFields::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CustomFields {
    Table,
    Id,
    ClientId,
    Name,
    FieldType,
    EnumOptions,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
}
