//! Database migrations for the buildings service.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2024_11_16_000001_create_clients;
mod m2024_11_16_000002_create_buildings;
mod m2024_11_16_000003_create_custom_fields;
mod m2024_11_16_000004_create_custom_field_values;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_11_16_000001_create_clients::Migration),
            Box::new(m2024_11_16_000002_create_buildings::Migration),
            Box::new(m2024_11_16_000003_create_custom_fields::Migration),
            Box::new(m2024_11_16_000004_create_custom_field_values::Migration),
        ]
    }
}
