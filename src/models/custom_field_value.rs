//! Custom field value entity model
//!
//! Sparse storage: at most one row per `(building_id, custom_field_id)`.
//! A missing row means the value was never set.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "custom_field_values")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub building_id: Uuid,

    pub custom_field_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub value: String,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::building::Entity",
        from = "Column::BuildingId",
        to = "super::building::Column::Id",
        on_delete = "Cascade"
    )]
    Building,
    #[sea_orm(
        belongs_to = "super::custom_field::Entity",
        from = "Column::CustomFieldId",
        to = "super::custom_field::Column::Id",
        on_delete = "Cascade"
    )]
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
