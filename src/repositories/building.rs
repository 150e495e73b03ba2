//! # Building Repository
//!
//! Persistence for the fixed building attributes. Custom field values are
//! handled by [`super::CustomFieldValueRepository`].

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::building::{self, ActiveModel as BuildingActiveModel, Entity as Building};

pub const MSG_STREET_BLANK: &str = "Street can't be blank";

/// Address attributes of a building.
///
/// On update, `None` keeps the stored value and an empty string clears an
/// optional column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct BuildingAttributes {
    #[schema(example = "1 Main St")]
    pub street: Option<String>,
    #[schema(example = "Austin")]
    pub city: Option<String>,
    #[schema(example = "TX")]
    pub state: Option<String>,
    #[schema(example = "10000")]
    pub zip: Option<String>,
    #[schema(example = "US")]
    pub country: Option<String>,
}

impl BuildingAttributes {
    pub fn with_street(street: impl Into<String>) -> Self {
        Self {
            street: Some(street.into()),
            ..Self::default()
        }
    }
}

/// Repository for building database operations
pub struct BuildingRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> BuildingRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Insert a building for `client_id`. The street is required.
    pub async fn create(
        &self,
        client_id: Uuid,
        attributes: BuildingAttributes,
    ) -> Result<building::Model, RepositoryError> {
        let street = attributes.street.as_deref().map(str::trim).unwrap_or("");
        if street.is_empty() {
            return Err(RepositoryError::validation_error(MSG_STREET_BLANK));
        }

        let now = Utc::now();
        let building = BuildingActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(client_id),
            street: Set(street.to_string()),
            city: Set(optional(attributes.city)),
            state: Set(optional(attributes.state)),
            zip: Set(optional(attributes.zip)),
            country: Set(optional(attributes.country)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        building
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Apply the provided attributes to an existing building.
    pub async fn update(
        &self,
        existing: building::Model,
        attributes: BuildingAttributes,
    ) -> Result<building::Model, RepositoryError> {
        let mut active = existing.into_active_model();

        if let Some(street) = attributes.street {
            let street = street.trim();
            if street.is_empty() {
                return Err(RepositoryError::validation_error(MSG_STREET_BLANK));
            }
            active.street = Set(street.to_string());
        }
        if let Some(city) = attributes.city {
            active.city = Set(optional(Some(city)));
        }
        if let Some(state) = attributes.state {
            active.state = Set(optional(Some(state)));
        }
        if let Some(zip) = attributes.zip {
            active.zip = Set(optional(Some(zip)));
        }
        if let Some(country) = attributes.country {
            active.country = Set(optional(Some(country)));
        }
        active.updated_at = Set(Utc::now().into());

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn get(&self, building_id: Uuid) -> Result<Option<building::Model>, RepositoryError> {
        Building::find_by_id(building_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Like [`Self::get`] but a missing building is an error.
    pub async fn require(&self, building_id: Uuid) -> Result<building::Model, RepositoryError> {
        self.get(building_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Building not found"))
    }

    /// First building of the client on `street`, compared after trimming.
    pub async fn find_by_street(
        &self,
        client_id: Uuid,
        street: &str,
    ) -> Result<Option<building::Model>, RepositoryError> {
        Building::find()
            .filter(building::Column::ClientId.eq(client_id))
            .filter(building::Column::Street.eq(street.trim()))
            .order_by_asc(building::Column::CreatedAt)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// One page of buildings in creation order. `page` starts at 1.
    pub async fn list_page(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Vec<building::Model>, RepositoryError> {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        Building::find()
            .order_by_asc(building::Column::CreatedAt)
            .order_by_asc(building::Column::Id)
            .offset(offset)
            .limit(per_page)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn count(&self) -> Result<u64, RepositoryError> {
        Building::find()
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete a building and its stored values.
    pub async fn delete(&self, building_id: Uuid) -> Result<(), RepositoryError> {
        let building = self.require(building_id).await?;
        building
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(())
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
