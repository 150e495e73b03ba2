//! # Custom Field Value Repository
//!
//! Sparse value storage keyed by `(building_id, custom_field_id)`.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::fields::{BulkSetError, FieldValueError};
use crate::models::custom_field_value::{
    self, ActiveModel as CustomFieldValueActiveModel, Entity as CustomFieldValue,
};
use crate::repositories::CustomFieldRepository;

pub struct CustomFieldValueRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CustomFieldValueRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Stored values of one building keyed by field id.
    pub async fn values_for_building(
        &self,
        building_id: Uuid,
    ) -> Result<HashMap<Uuid, String>, RepositoryError> {
        let mut by_building = self.values_for_buildings(&[building_id]).await?;
        Ok(by_building.remove(&building_id).unwrap_or_default())
    }

    /// Stored values of several buildings, keyed by building id then field id.
    pub async fn values_for_buildings(
        &self,
        building_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, HashMap<Uuid, String>>, RepositoryError> {
        if building_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = CustomFieldValue::find()
            .filter(custom_field_value::Column::BuildingId.is_in(building_ids.iter().copied()))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let mut values: HashMap<Uuid, HashMap<Uuid, String>> = HashMap::new();
        for row in rows {
            values
                .entry(row.building_id)
                .or_default()
                .insert(row.custom_field_id, row.value);
        }
        Ok(values)
    }

    pub async fn find(
        &self,
        building_id: Uuid,
        field_id: Uuid,
    ) -> Result<Option<custom_field_value::Model>, RepositoryError> {
        CustomFieldValue::find()
            .filter(custom_field_value::Column::BuildingId.eq(building_id))
            .filter(custom_field_value::Column::CustomFieldId.eq(field_id))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Create or replace the value for the pair.
    ///
    /// `raw` is checked against the field's current rule and stored trimmed.
    /// A concurrent insert of the same pair surfaces as
    /// [`RepositoryError::Conflict`].
    pub async fn upsert(
        &self,
        building_id: Uuid,
        field_id: Uuid,
        raw: &str,
    ) -> Result<custom_field_value::Model, RepositoryError> {
        let field = CustomFieldRepository::new(self.db).require(field_id).await?;
        field.to_schema_field().check(raw).map_err(|message| BulkSetError {
            errors: vec![FieldValueError::InvalidValue {
                name: field.name.clone(),
                message,
            }],
        })?;

        let value = raw.trim();
        let now = Utc::now();

        match self.find(building_id, field_id).await? {
            Some(existing) if existing.value == value => Ok(existing),
            Some(existing) => {
                let mut active = existing.into_active_model();
                active.value = Set(value.to_string());
                active.updated_at = Set(now.into());
                active
                    .update(self.db)
                    .await
                    .map_err(RepositoryError::database_error)
            }
            None => CustomFieldValueActiveModel {
                id: Set(Uuid::new_v4()),
                building_id: Set(building_id),
                custom_field_id: Set(field_id),
                value: Set(value.to_string()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error),
        }
    }
}
