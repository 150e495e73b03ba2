//! # Custom Field Repository
//!
//! Schema administration for client-defined fields. Every write runs the full
//! definition check, including per-client name uniqueness, before touching the
//! database; the unique index on `(client_id, name)` backs it up under races.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ClientRepository;
use crate::error::RepositoryError;
use crate::fields::{FieldDefinition, ProposedField, SchemaField, normalize_field_name};
use crate::models::custom_field::{
    self, ActiveModel as CustomFieldActiveModel, Entity as CustomField,
};

/// Partial update of a field definition; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct FieldChanges {
    pub name: Option<String>,
    pub field_type: Option<String>,
    pub enum_options: Option<Vec<String>>,
}

pub struct CustomFieldRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CustomFieldRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Define a new field for `client_id`.
    pub async fn create(
        &self,
        client_id: Uuid,
        proposed: ProposedField,
    ) -> Result<custom_field::Model, RepositoryError> {
        ClientRepository::new(self.db).require(client_id).await?;

        let taken = self
            .name_taken(client_id, &proposed.normalized_name(), None)
            .await?;
        let definition = proposed.validate(taken)?;

        let now = Utc::now();
        let field = CustomFieldActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(client_id),
            name: Set(definition.name.clone()),
            field_type: Set(definition.field_type.kind().as_str().to_string()),
            enum_options: Set(stored_options(&definition)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = field
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(
            %client_id,
            field = %created.name,
            field_type = %created.field_type,
            "Custom field defined"
        );
        Ok(created)
    }

    /// Change an existing definition. The merged result is validated as a
    /// whole; the field does not collide with its own name.
    pub async fn update(
        &self,
        field_id: Uuid,
        changes: FieldChanges,
    ) -> Result<custom_field::Model, RepositoryError> {
        let existing = self.require(field_id).await?;

        let proposed = ProposedField {
            name: changes.name.unwrap_or_else(|| existing.name.clone()),
            field_type: changes
                .field_type
                .unwrap_or_else(|| existing.field_type.clone()),
            enum_options: changes
                .enum_options
                .or_else(|| Some(existing.options()).filter(|options| !options.is_empty())),
        };

        let taken = self
            .name_taken(
                existing.client_id,
                &proposed.normalized_name(),
                Some(existing.id),
            )
            .await?;
        let definition = proposed.validate(taken)?;

        let mut active = existing.into_active_model();
        active.name = Set(definition.name.clone());
        active.field_type = Set(definition.field_type.kind().as_str().to_string());
        active.enum_options = Set(stored_options(&definition));
        active.updated_at = Set(Utc::now().into());

        let updated = active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(field_id = %updated.id, field = %updated.name, "Custom field updated");
        Ok(updated)
    }

    /// Remove a field and every value stored for it.
    pub async fn delete(&self, field_id: Uuid) -> Result<(), RepositoryError> {
        let field = self.require(field_id).await?;
        field
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(%field_id, "Custom field deleted");
        Ok(())
    }

    pub async fn get(
        &self,
        field_id: Uuid,
    ) -> Result<Option<custom_field::Model>, RepositoryError> {
        CustomField::find_by_id(field_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn require(&self, field_id: Uuid) -> Result<custom_field::Model, RepositoryError> {
        self.get(field_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Custom field not found"))
    }

    /// Fields of one client in definition order.
    pub async fn list_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<custom_field::Model>, RepositoryError> {
        self.list_for_clients(&[client_id]).await
    }

    /// Fields of several clients in definition order.
    pub async fn list_for_clients(
        &self,
        client_ids: &[Uuid],
    ) -> Result<Vec<custom_field::Model>, RepositoryError> {
        if client_ids.is_empty() {
            return Ok(Vec::new());
        }
        CustomField::find()
            .filter(custom_field::Column::ClientId.is_in(client_ids.iter().copied()))
            .order_by_asc(custom_field::Column::CreatedAt)
            .order_by_asc(custom_field::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Look a field up by label or identifier; the name is normalized first.
    pub async fn find_by_name(
        &self,
        client_id: Uuid,
        raw_name: &str,
    ) -> Result<Option<custom_field::Model>, RepositoryError> {
        let name = normalize_field_name(raw_name);
        if name.is_empty() {
            return Ok(None);
        }
        CustomField::find()
            .filter(custom_field::Column::ClientId.eq(client_id))
            .filter(custom_field::Column::Name.eq(name))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// The client's fields as the bulk planner sees them.
    pub async fn schema_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<SchemaField>, RepositoryError> {
        Ok(self
            .list_for_client(client_id)
            .await?
            .iter()
            .map(custom_field::Model::to_schema_field)
            .collect())
    }

    /// Whether another field of the client already uses `name`.
    pub async fn name_taken(
        &self,
        client_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, RepositoryError> {
        if name.is_empty() {
            return Ok(false);
        }
        let mut query = CustomField::find()
            .filter(custom_field::Column::ClientId.eq(client_id))
            .filter(custom_field::Column::Name.eq(name));
        if let Some(field_id) = exclude {
            query = query.filter(custom_field::Column::Id.ne(field_id));
        }
        let count = query
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(count > 0)
    }
}

fn stored_options(definition: &FieldDefinition) -> Option<serde_json::Value> {
    definition.stored_options().map(|options| json!(options))
}
