//! # Buildings API Handlers
//!
//! CRUD endpoints for buildings. Custom field values supplied with a create or
//! update are applied in strict mode in the same transaction as the building
//! write.

use axum::{
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::types::{MessageResponse, PaginationMeta, PaginationQuery, SUCCESS};
use crate::error::{ApiError, validation_error};
use crate::fields::values_from_json;
use crate::repositories::BuildingAttributes;
use crate::server::AppState;
use crate::services::BuildingView;

/// Request payload for creating a building
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBuildingRequest {
    /// Owning client
    pub client_id: Uuid,
    #[serde(flatten)]
    pub attributes: BuildingAttributes,
    /// Custom field values keyed by field name
    #[serde(default)]
    #[schema(value_type = Option<Object>, example = json!({"area_sqft": "25000", "roof_type": "Shingle"}))]
    pub custom_fields: Option<serde_json::Value>,
}

/// Request payload for updating a building
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBuildingRequest {
    #[serde(flatten)]
    pub attributes: BuildingAttributes,
    /// Custom field values keyed by field name
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub custom_fields: Option<serde_json::Value>,
}

/// Response carrying one building
#[derive(Debug, Serialize, ToSchema)]
pub struct BuildingResponse {
    #[schema(value_type = String, example = "success")]
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "Building created successfully")]
    pub message: Option<&'static str>,
    /// `id`, `client_name`, `address` and one key per custom field
    #[schema(value_type = Object)]
    pub building: BuildingView,
}

/// Response carrying one page of buildings
#[derive(Debug, Serialize, ToSchema)]
pub struct BuildingListResponse {
    #[schema(value_type = String, example = "success")]
    pub status: &'static str,
    #[schema(value_type = Vec<Object>)]
    pub buildings: Vec<BuildingView>,
    pub pagination: PaginationMeta,
}

/// Turns the optional `custom_fields` payload into name/value pairs.
fn custom_field_pairs(
    raw: Option<serde_json::Value>,
) -> Result<Option<Vec<(String, String)>>, ApiError> {
    match raw {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => values_from_json(&value)
            .map(Some)
            .ok_or_else(|| validation_error(vec!["custom_fields must be an object".to_string()])),
    }
}

/// List buildings with their custom fields
#[utoipa::path(
    get,
    path = "/api/buildings",
    params(PaginationQuery),
    responses(
        (status = 200, description = "One page of buildings", body = BuildingListResponse),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "buildings"
)]
pub async fn list_buildings(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<BuildingListResponse>, ApiError> {
    let (page, per_page) = query.resolve(&state.config.pagination);
    let page = state.buildings.list_buildings(page, per_page).await?;

    Ok(Json(BuildingListResponse {
        status: SUCCESS,
        pagination: PaginationMeta::from(&page),
        buildings: page.buildings,
    }))
}

/// Fetch one building
#[utoipa::path(
    get,
    path = "/api/buildings/{id}",
    params(("id" = Uuid, Path, description = "Building ID")),
    responses(
        (status = 200, description = "The building", body = BuildingResponse),
        (status = 404, description = "Building not found", body = ApiError)
    ),
    tag = "buildings"
)]
pub async fn get_building(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BuildingResponse>, ApiError> {
    let building = state.buildings.get_building(id).await?;
    Ok(Json(BuildingResponse {
        status: SUCCESS,
        message: None,
        building,
    }))
}

/// Create a building, optionally with custom field values
#[utoipa::path(
    post,
    path = "/api/buildings",
    request_body = CreateBuildingRequest,
    responses(
        (status = 201, description = "Building created successfully", body = BuildingResponse),
        (status = 404, description = "Client not found", body = ApiError),
        (status = 409, description = "Conflicting concurrent write", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError)
    ),
    tag = "buildings"
)]
pub async fn create_building(
    State(state): State<AppState>,
    payload: Result<Json<CreateBuildingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BuildingResponse>), ApiError> {
    let Json(request) = payload?;
    let custom_fields = custom_field_pairs(request.custom_fields)?;
    let building = state
        .buildings
        .create_building(request.client_id, request.attributes, custom_fields)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BuildingResponse {
            status: SUCCESS,
            message: Some("Building created successfully"),
            building,
        }),
    ))
}

/// Update a building, optionally with custom field values
#[utoipa::path(
    patch,
    path = "/api/buildings/{id}",
    params(("id" = Uuid, Path, description = "Building ID")),
    request_body = UpdateBuildingRequest,
    responses(
        (status = 200, description = "Building updated successfully", body = BuildingResponse),
        (status = 404, description = "Building not found", body = ApiError),
        (status = 409, description = "Conflicting concurrent write", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError)
    ),
    tag = "buildings"
)]
pub async fn update_building(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateBuildingRequest>, JsonRejection>,
) -> Result<Json<BuildingResponse>, ApiError> {
    let Json(request) = payload?;
    let custom_fields = custom_field_pairs(request.custom_fields)?;
    let building = state
        .buildings
        .update_building(id, request.attributes, custom_fields)
        .await?;

    Ok(Json(BuildingResponse {
        status: SUCCESS,
        message: Some("Building updated successfully"),
        building,
    }))
}

/// Delete a building and its custom field values
#[utoipa::path(
    delete,
    path = "/api/buildings/{id}",
    params(("id" = Uuid, Path, description = "Building ID")),
    responses(
        (status = 200, description = "Building deleted", body = MessageResponse),
        (status = 404, description = "Building not found", body = ApiError)
    ),
    tag = "buildings"
)]
pub async fn delete_building(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.buildings.delete_building(id).await?;
    Ok(Json(MessageResponse::success("Building deleted successfully")))
}
