//! # Client Repository
//!
//! CRUD operations for clients, the tenants that own buildings and custom
//! field definitions.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::client::{self, ActiveModel as ClientActiveModel, Entity as Client};

const MAX_NAME_LEN: usize = 255;

/// Repository for client database operations
pub struct ClientRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ClientRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Create a client. The name is trimmed and must be unique ignoring case.
    pub async fn create(&self, name: &str) -> Result<client::Model, RepositoryError> {
        let name = name.trim();
        validate_name(name)?;

        if self.find_by_name(name).await?.is_some() {
            return Err(RepositoryError::validation_error(
                "name has already been taken",
            ));
        }

        let now = Utc::now();
        let client = ClientActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = client
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(client_id = %created.id, name = %created.name, "Client created");
        Ok(created)
    }

    pub async fn get(&self, client_id: Uuid) -> Result<Option<client::Model>, RepositoryError> {
        Client::find_by_id(client_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Like [`Self::get`] but a missing client is an error.
    pub async fn require(&self, client_id: Uuid) -> Result<client::Model, RepositoryError> {
        self.get(client_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Client not found"))
    }

    /// All clients ordered by name.
    pub async fn list(&self) -> Result<Vec<client::Model>, RepositoryError> {
        Client::find()
            .order_by_asc(client::Column::Name)
            .order_by_asc(client::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Names of the given clients keyed by id; unknown ids are left out.
    pub async fn names_for(
        &self,
        client_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, RepositoryError> {
        if client_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let clients = Client::find()
            .filter(client::Column::Id.is_in(client_ids.iter().copied()))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        Ok(clients
            .into_iter()
            .map(|client| (client.id, client.name))
            .collect())
    }

    /// Case-insensitive lookup on the trimmed name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<client::Model>, RepositoryError> {
        Client::find()
            .filter(
                Expr::expr(Func::lower(Expr::col((Client, client::Column::Name))))
                    .eq(name.trim().to_lowercase()),
            )
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete a client together with its buildings, fields and values.
    pub async fn delete(&self, client_id: Uuid) -> Result<(), RepositoryError> {
        let client = self.require(client_id).await?;

        client
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(%client_id, "Client deleted");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), RepositoryError> {
    if name.is_empty() {
        return Err(RepositoryError::validation_error("name can't be blank"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(RepositoryError::validation_error(format!(
            "name is too long (maximum is {MAX_NAME_LEN} characters)"
        )));
    }
    Ok(())
}
