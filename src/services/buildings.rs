//! # Building Service
//!
//! Orchestrates building writes together with their custom field values.
//!
//! Create and update run as one transaction: the client's schema is read,
//! the supplied values are planned under [`BulkSetPolicy::STRICT`], the
//! building row is written and then every planned value is upserted. Any
//! failure drops the transaction, which rolls back the building write and
//! every value written so far.
//!
//! The view returned by a write is read inside the same transaction, so a
//! caller either gets the committed state or an error and never both. Plain
//! reads are not isolated from concurrent writers.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde::Serialize;
use serde::ser::SerializeMap;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::fields::{
    BulkSetPolicy, PlannedWrite, Projection, ValueAnnotation, plan_bulk_set, project,
    values_from_json,
};
use crate::models::{building, custom_field};
use crate::repositories::{
    BuildingAttributes, BuildingRepository, ClientRepository, CustomFieldRepository,
    CustomFieldValueRepository,
};

/// Persists one planned value inside the caller's transaction.
#[async_trait]
pub trait ValueWriter: Send + Sync {
    async fn write(
        &self,
        txn: &DatabaseTransaction,
        building_id: Uuid,
        planned: &PlannedWrite,
    ) -> Result<(), RepositoryError>;
}

/// Writes through [`CustomFieldValueRepository::upsert`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryValueWriter;

#[async_trait]
impl ValueWriter for RepositoryValueWriter {
    async fn write(
        &self,
        txn: &DatabaseTransaction,
        building_id: Uuid,
        planned: &PlannedWrite,
    ) -> Result<(), RepositoryError> {
        CustomFieldValueRepository::new(txn)
            .upsert(building_id, planned.field_id, &planned.value)
            .await?;
        Ok(())
    }
}

/// A building with its client name and projected custom fields.
///
/// Serializes flat: `id`, `client_name`, `address`, then one key per custom
/// field. A custom field named like a fixed key does not replace it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingView {
    pub building: building::Model,
    pub client_name: String,
    pub custom_fields: Projection,
}

impl BuildingView {
    pub fn id(&self) -> Uuid {
        self.building.id
    }

    pub fn address(&self) -> String {
        self.building.address()
    }
}

const FIXED_KEYS: [&str; 3] = ["id", "client_name", "address"];

impl Serialize for BuildingView {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.building.id)?;
        map.serialize_entry("client_name", &self.client_name)?;
        map.serialize_entry("address", &self.building.address())?;
        for (name, value) in &self.custom_fields {
            if !FIXED_KEYS.contains(&name.as_str()) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

/// One page of buildings plus the total row count.
#[derive(Debug, Clone)]
pub struct BuildingPage {
    pub buildings: Vec<BuildingView>,
    pub page: u64,
    pub per_page: u64,
    pub total_count: u64,
}

impl BuildingPage {
    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(self.per_page.max(1))
    }
}

/// Result of a best-effort bulk assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Names of the fields that were written
    pub written: Vec<String>,
    /// Invalid values that were left out
    pub annotations: Vec<ValueAnnotation>,
}

impl BulkOutcome {
    pub fn messages(&self) -> Vec<String> {
        self.annotations.iter().map(ToString::to_string).collect()
    }
}

#[derive(Clone)]
pub struct BuildingService {
    db: DatabaseConnection,
    writer: Arc<dyn ValueWriter>,
}

impl BuildingService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_writer(db, Arc::new(RepositoryValueWriter))
    }

    pub fn with_writer(db: DatabaseConnection, writer: Arc<dyn ValueWriter>) -> Self {
        Self { db, writer }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Create a building for `client_id` and set `custom_fields` in strict
    /// mode, all in one transaction.
    pub async fn create_building(
        &self,
        client_id: Uuid,
        attributes: BuildingAttributes,
        custom_fields: Option<Vec<(String, String)>>,
    ) -> Result<BuildingView, RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        ClientRepository::new(&txn).require(client_id).await?;
        let writes = self
            .plan_strict(&txn, client_id, custom_fields.as_deref())
            .await?;

        let building = BuildingRepository::new(&txn)
            .create(client_id, attributes)
            .await?;
        self.apply(&txn, building.id, &writes).await?;
        let view = view_on(&txn, building).await?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(
            %client_id,
            building_id = %view.id(),
            values = writes.len(),
            "Building created"
        );
        Ok(view)
    }

    /// Update a building's attributes and set `custom_fields` in strict mode,
    /// all in one transaction.
    pub async fn update_building(
        &self,
        building_id: Uuid,
        attributes: BuildingAttributes,
        custom_fields: Option<Vec<(String, String)>>,
    ) -> Result<BuildingView, RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let buildings = BuildingRepository::new(&txn);
        let existing = buildings.require(building_id).await?;
        let writes = self
            .plan_strict(&txn, existing.client_id, custom_fields.as_deref())
            .await?;

        let building = buildings.update(existing, attributes).await?;
        self.apply(&txn, building.id, &writes).await?;
        let view = view_on(&txn, building).await?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(%building_id, values = writes.len(), "Building updated");
        Ok(view)
    }

    /// Assign values to an existing building under `policy`.
    ///
    /// Under [`BulkSetPolicy::STRICT`] any error rejects the batch and nothing
    /// is written. Under [`BulkSetPolicy::LENIENT`] unknown names are skipped
    /// and invalid values come back as annotations.
    pub async fn set_custom_field_values(
        &self,
        building_id: Uuid,
        values: &[(String, String)],
        policy: BulkSetPolicy,
    ) -> Result<BulkOutcome, RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let building = BuildingRepository::new(&txn).require(building_id).await?;
        let schema = CustomFieldRepository::new(&txn)
            .schema_for_client(building.client_id)
            .await?;

        let plan = plan_bulk_set(&schema, values, policy);
        let skipped = plan.skipped.len();
        let resolved = plan.resolve(policy).inspect_err(|error| {
            tracing::warn!(%building_id, errors = error.errors.len(), "Custom field values rejected");
        })?;

        self.apply(&txn, building_id, &resolved.writes).await?;
        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        for annotation in &resolved.annotations {
            tracing::warn!(%building_id, field = %annotation.name, "{}", annotation);
        }
        tracing::info!(
            %building_id,
            written = resolved.writes.len(),
            skipped,
            annotated = resolved.annotations.len(),
            "Custom field values applied"
        );

        Ok(BulkOutcome {
            written: resolved
                .writes
                .into_iter()
                .map(|write| write.field_name)
                .collect(),
            annotations: resolved.annotations,
        })
    }

    /// Lenient assignment from a JSON object. Anything other than an object
    /// is ignored.
    pub async fn set_custom_field_values_lenient(
        &self,
        building_id: Uuid,
        raw: &serde_json::Value,
    ) -> Result<BulkOutcome, RepositoryError> {
        let Some(values) = values_from_json(raw) else {
            return Ok(BulkOutcome::default());
        };
        self.set_custom_field_values(building_id, &values, BulkSetPolicy::LENIENT)
            .await
    }

    pub async fn get_building(&self, building_id: Uuid) -> Result<BuildingView, RepositoryError> {
        let building = BuildingRepository::new(&self.db)
            .require(building_id)
            .await?;
        view_on(&self.db, building).await
    }

    /// Dense view of the building's custom field values.
    pub async fn project(&self, building: &building::Model) -> Result<Projection, RepositoryError> {
        project_on(&self.db, building).await
    }

    /// One page of buildings, each with its projection.
    pub async fn list_buildings(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<BuildingPage, RepositoryError> {
        let repository = BuildingRepository::new(&self.db);
        let total_count = repository.count().await?;
        let rows = repository.list_page(page, per_page).await?;

        let client_ids: Vec<Uuid> = rows
            .iter()
            .map(|building| building.client_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let building_ids: Vec<Uuid> = rows.iter().map(|building| building.id).collect();

        let client_names = ClientRepository::new(&self.db)
            .names_for(&client_ids)
            .await?;
        let fields = CustomFieldRepository::new(&self.db)
            .list_for_clients(&client_ids)
            .await?;
        let mut stored = CustomFieldValueRepository::new(&self.db)
            .values_for_buildings(&building_ids)
            .await?;

        let mut fields_by_client: HashMap<Uuid, Vec<&custom_field::Model>> = HashMap::new();
        for field in &fields {
            fields_by_client
                .entry(field.client_id)
                .or_default()
                .push(field);
        }

        let buildings = rows
            .into_iter()
            .map(|building| {
                let values = stored.remove(&building.id).unwrap_or_default();
                let custom_fields = project(
                    fields_by_client
                        .get(&building.client_id)
                        .into_iter()
                        .flatten()
                        .map(|field| (field.id, field.name.as_str())),
                    &values,
                );
                BuildingView {
                    client_name: client_names
                        .get(&building.client_id)
                        .cloned()
                        .unwrap_or_default(),
                    building,
                    custom_fields,
                }
            })
            .collect();

        Ok(BuildingPage {
            buildings,
            page,
            per_page,
            total_count,
        })
    }

    pub async fn delete_building(&self, building_id: Uuid) -> Result<(), RepositoryError> {
        BuildingRepository::new(&self.db).delete(building_id).await?;
        tracing::info!(%building_id, "Building deleted");
        Ok(())
    }

    async fn plan_strict(
        &self,
        txn: &DatabaseTransaction,
        client_id: Uuid,
        custom_fields: Option<&[(String, String)]>,
    ) -> Result<Vec<PlannedWrite>, RepositoryError> {
        let Some(values) = custom_fields.filter(|values| !values.is_empty()) else {
            return Ok(Vec::new());
        };

        let schema = CustomFieldRepository::new(txn)
            .schema_for_client(client_id)
            .await?;
        let resolved = plan_bulk_set(&schema, values, BulkSetPolicy::STRICT)
            .resolve(BulkSetPolicy::STRICT)
            .inspect_err(|error| {
                tracing::warn!(%client_id, errors = error.errors.len(), "Custom field values rejected");
            })?;
        Ok(resolved.writes)
    }

    async fn apply(
        &self,
        txn: &DatabaseTransaction,
        building_id: Uuid,
        writes: &[PlannedWrite],
    ) -> Result<(), RepositoryError> {
        for planned in writes {
            self.writer.write(txn, building_id, planned).await?;
            tracing::debug!(%building_id, field = %planned.field_name, "Custom field value written");
        }
        Ok(())
    }
}

async fn project_on<C: ConnectionTrait>(
    conn: &C,
    building: &building::Model,
) -> Result<Projection, RepositoryError> {
    let fields = CustomFieldRepository::new(conn)
        .list_for_client(building.client_id)
        .await?;
    let stored = CustomFieldValueRepository::new(conn)
        .values_for_building(building.id)
        .await?;
    Ok(project(
        fields.iter().map(|field| (field.id, field.name.as_str())),
        &stored,
    ))
}

async fn view_on<C: ConnectionTrait>(
    conn: &C,
    building: building::Model,
) -> Result<BuildingView, RepositoryError> {
    let client = ClientRepository::new(conn)
        .require(building.client_id)
        .await?;
    let custom_fields = project_on(conn, &building).await?;
    Ok(BuildingView {
        building,
        client_name: client.name,
        custom_fields,
    })
}
