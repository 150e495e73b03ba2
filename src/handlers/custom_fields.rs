//! # Custom Fields API Handlers
//!
//! Schema administration: define, change and remove the typed fields a client
//! attaches to its buildings. Invalid definitions come back as 422 with one
//! message per failed attribute check.

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::types::{MessageResponse, SUCCESS};
use crate::error::ApiError;
use crate::fields::{FieldKind, ProposedField};
use crate::models::custom_field;
use crate::repositories::{ClientRepository, CustomFieldRepository, FieldChanges};
use crate::server::AppState;

/// Custom field definition returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomFieldDto {
    pub id: Uuid,
    pub client_id: Uuid,
    /// Normalized identifier
    #[schema(example = "roof_type")]
    pub name: String,
    pub field_type: FieldKind,
    /// Present for enum fields only
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = json!(["Shingle", "Metal"]))]
    pub enum_options: Option<Vec<String>>,
}

impl TryFrom<custom_field::Model> for CustomFieldDto {
    type Error = ApiError;

    fn try_from(model: custom_field::Model) -> Result<Self, Self::Error> {
        let field_type = model.field_type.parse::<FieldKind>().map_err(|error| {
            anyhow::anyhow!("stored custom field {} is unreadable: {error}", model.id)
        })?;
        let enum_options = (field_type == FieldKind::Enum).then(|| model.options());
        Ok(Self {
            id: model.id,
            client_id: model.client_id,
            name: model.name,
            field_type,
            enum_options,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomFieldResponse {
    #[schema(example = "success")]
    pub status: String,
    pub custom_field: CustomFieldDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomFieldListResponse {
    #[schema(example = "success")]
    pub status: String,
    pub custom_fields: Vec<CustomFieldDto>,
}

fn respond(model: custom_field::Model) -> Result<Json<CustomFieldResponse>, ApiError> {
    Ok(Json(CustomFieldResponse {
        status: SUCCESS.to_string(),
        custom_field: model.try_into()?,
    }))
}

/// Define a custom field for a client
#[utoipa::path(
    post,
    path = "/api/clients/{client_id}/custom_fields",
    params(("client_id" = Uuid, Path, description = "Client ID")),
    request_body = ProposedField,
    responses(
        (status = 201, description = "Custom field created", body = CustomFieldResponse),
        (status = 404, description = "Client not found", body = ApiError),
        (status = 409, description = "Conflicting concurrent write", body = ApiError),
        (status = 422, description = "Invalid definition", body = ApiError)
    ),
    tag = "custom_fields"
)]
pub async fn create_custom_field(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    payload: Result<Json<ProposedField>, JsonRejection>,
) -> Result<(StatusCode, Json<CustomFieldResponse>), ApiError> {
    let Json(proposed) = payload?;
    let field = CustomFieldRepository::new(&state.db)
        .create(client_id, proposed)
        .await?;
    Ok((StatusCode::CREATED, respond(field)?))
}

/// List a client's custom fields in definition order
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}/custom_fields",
    params(("client_id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "The client's fields", body = CustomFieldListResponse),
        (status = 404, description = "Client not found", body = ApiError)
    ),
    tag = "custom_fields"
)]
pub async fn list_custom_fields(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<CustomFieldListResponse>, ApiError> {
    ClientRepository::new(&state.db).require(client_id).await?;
    let fields = CustomFieldRepository::new(&state.db)
        .list_for_client(client_id)
        .await?;

    Ok(Json(CustomFieldListResponse {
        status: SUCCESS.to_string(),
        custom_fields: fields
            .into_iter()
            .map(CustomFieldDto::try_from)
            .collect::<Result<_, _>>()?,
    }))
}

/// Change a custom field definition
#[utoipa::path(
    patch,
    path = "/api/custom_fields/{id}",
    params(("id" = Uuid, Path, description = "Custom field ID")),
    request_body = FieldChanges,
    responses(
        (status = 200, description = "Custom field updated", body = CustomFieldResponse),
        (status = 404, description = "Custom field not found", body = ApiError),
        (status = 422, description = "Invalid definition", body = ApiError)
    ),
    tag = "custom_fields"
)]
pub async fn update_custom_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<FieldChanges>, JsonRejection>,
) -> Result<Json<CustomFieldResponse>, ApiError> {
    let Json(changes) = payload?;
    let field = CustomFieldRepository::new(&state.db)
        .update(id, changes)
        .await?;
    respond(field)
}

/// Remove a custom field and every stored value for it
#[utoipa::path(
    delete,
    path = "/api/custom_fields/{id}",
    params(("id" = Uuid, Path, description = "Custom field ID")),
    responses(
        (status = 200, description = "Custom field deleted", body = MessageResponse),
        (status = 404, description = "Custom field not found", body = ApiError)
    ),
    tag = "custom_fields"
)]
pub async fn delete_custom_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    CustomFieldRepository::new(&state.db).delete(id).await?;
    Ok(Json(MessageResponse::success(
        "Custom field deleted successfully",
    )))
}
