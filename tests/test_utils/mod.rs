//! Test utilities for database testing.
//!
//! This module provides utilities for setting up in-memory SQLite databases
//! with migrations, plus small fixtures shared by the integration tests.

use anyhow::Result;
use async_trait::async_trait;
use buildings::config::AppConfig;
use buildings::error::RepositoryError;
use buildings::fields::{FieldKind, PlannedWrite, ProposedField};
use buildings::models::{client, custom_field, custom_field_value};
use buildings::repositories::{ClientRepository, CustomFieldRepository};
use buildings::server::AppState;
use buildings::services::ValueWriter;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, Set,
};
use uuid::Uuid;

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// Foreign keys stay enabled (the sqlx default) so cascades behave as they
/// do on Postgres.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Application state over a fresh database.
#[allow(dead_code)]
pub async fn setup_test_state() -> Result<AppState> {
    let db = setup_test_db().await?;
    Ok(AppState::new(test_config(), db))
}

#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        ..AppConfig::default()
    }
}

/// Creates a client with the given name.
#[allow(dead_code)]
pub async fn create_client(db: &DatabaseConnection, name: &str) -> Result<client::Model> {
    Ok(ClientRepository::new(db).create(name).await?)
}

/// Defines a field on a client.
#[allow(dead_code)]
pub async fn define_field(
    db: &DatabaseConnection,
    client_id: uuid::Uuid,
    name: &str,
    kind: FieldKind,
    options: &[&str],
) -> Result<custom_field::Model> {
    let mut proposed = ProposedField::new(name, kind);
    if !options.is_empty() {
        proposed = proposed.with_options(options.iter().copied());
    }
    Ok(CustomFieldRepository::new(db)
        .create(client_id, proposed)
        .await?)
}

/// A client with `area_sqft` (number), `roof_type` (enum Shingle/Metal) and
/// `brick_color` (freeform).
#[allow(dead_code)]
pub async fn roofing_client(db: &DatabaseConnection, name: &str) -> Result<client::Model> {
    let client = create_client(db, name).await?;
    define_field(db, client.id, "area_sqft", FieldKind::Number, &[]).await?;
    define_field(
        db,
        client.id,
        "roof_type",
        FieldKind::Enum,
        &["Shingle", "Metal"],
    )
    .await?;
    define_field(db, client.id, "brick_color", FieldKind::Freeform, &[]).await?;
    Ok(client)
}

/// Owned `(name, value)` pairs from string slices.
#[allow(dead_code)]
pub fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Inserts a value row directly, bypassing the repository checks.
#[allow(dead_code)]
pub async fn insert_value_row<C: ConnectionTrait>(
    db: &C,
    building_id: Uuid,
    field_id: Uuid,
    value: &str,
) -> Result<custom_field_value::Model, sea_orm::DbErr> {
    let now = Utc::now();
    custom_field_value::ActiveModel {
        id: Set(Uuid::new_v4()),
        building_id: Set(building_id),
        custom_field_id: Set(field_id),
        value: Set(value.to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
}

/// Behaves like a second writer that stored the same pair first: the row is
/// inserted twice, so the unique index on the pair rejects the second one.
#[allow(dead_code)]
pub struct RacingPairWriter;

#[async_trait]
impl ValueWriter for RacingPairWriter {
    async fn write(
        &self,
        txn: &DatabaseTransaction,
        building_id: Uuid,
        planned: &PlannedWrite,
    ) -> Result<(), RepositoryError> {
        for _ in 0..2 {
            insert_value_row(txn, building_id, planned.field_id, &planned.value)
                .await
                .map_err(RepositoryError::database_error)?;
        }
        Ok(())
    }
}
