//! Migration to create the custom_field_values table.
//!
//! Values are sparse: at most one row per `(building_id, custom_field_id)`,
//! enforced by a unique index. Rows go away with either parent.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomFieldValues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomFieldValues::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomFieldValues::BuildingId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomFieldValues::CustomFieldId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CustomFieldValues::Value).text().not_null())
                    .col(
                        ColumnDef::new(CustomFieldValues::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CustomFieldValues::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_custom_field_values_building_id")
                            .from(CustomFieldValues::Table, CustomFieldValues::BuildingId)
                            .to(Buildings::Table, Buildings::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_custom_field_values_custom_field_id")
                            .from(CustomFieldValues::Table, CustomFieldValues::CustomFieldId)
                            .to(CustomFields::Table, CustomFields::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_custom_field_values_building_field")
                    .table(CustomFieldValues::Table)
                    .col(CustomFieldValues::BuildingId)
                    .col(CustomFieldValues::CustomFieldId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_custom_field_values_custom_field_id")
                    .table(CustomFieldValues::Table)
                    .col(CustomFieldValues::CustomFieldId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomFieldValues::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CustomFieldValues {
    Table,
    Id,
    BuildingId,
    CustomFieldId,
    Value,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Buildings {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum CustomFields {
    Table,
    Id,
}
