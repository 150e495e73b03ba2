//! Custom field entity model
//!
//! One row per client-defined attribute. `name` is stored normalized and is
//! unique per client; `enum_options` holds a JSON array for enum fields.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;

use crate::fields::{FieldKind, FieldType, SchemaField};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "custom_fields")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning client
    pub client_id: Uuid,

    /// Normalized identifier (e.g. `brick_color`)
    pub name: String,

    /// Type tag: `number`, `freeform` or `enum`
    pub field_type: String,

    /// Allowed values for enum fields, as a JSON array of strings
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub enum_options: Option<JsonValue>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Stored enum options as strings; non-string entries are skipped.
    pub fn options(&self) -> Vec<String> {
        self.enum_options
            .as_ref()
            .and_then(JsonValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The typed rule for this field, or `None` if the stored tag is not
    /// recognised.
    pub fn rule(&self) -> Option<FieldType> {
        match self.field_type.parse::<FieldKind>().ok()? {
            FieldKind::Number => Some(FieldType::Number),
            FieldKind::Freeform => Some(FieldType::Freeform),
            FieldKind::Enum => Some(FieldType::Enum {
                options: self.options(),
            }),
        }
    }

    pub fn to_schema_field(&self) -> SchemaField {
        SchemaField {
            id: self.id,
            name: self.name.clone(),
            field_type: self.rule(),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
    #[sea_orm(has_many = "super::custom_field_value::Entity")]
    CustomFieldValue,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::custom_field_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomFieldValue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
