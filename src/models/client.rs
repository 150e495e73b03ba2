//! Client entity model
//!
//! This module contains the SeaORM entity model for the clients table.
//! A client is the tenant that owns buildings and custom field definitions.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Client entity representing tenant isolation for buildings and fields
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    /// Unique identifier for the client (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name, unique across clients ignoring case
    pub name: String,

    /// Timestamp when the client was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the client was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::building::Entity")]
    Building,
    #[sea_orm(has_many = "super::custom_field::Entity")]
    CustomField,
}

impl Related<super::building::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Building.def()
    }
}

impl Related<super::custom_field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomField.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
