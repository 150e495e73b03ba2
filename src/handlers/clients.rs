//! # Clients API Handlers
//!
//! This module contains handlers for client creation and management endpoints.

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
use crate::models::client;
use crate::repositories::ClientRepository;
use crate::server::AppState;

/// Request payload for creating a client
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateClientRequest {
    /// Display name (required, max 255 characters, unique ignoring case)
    #[schema(example = "Thejo Client1")]
    pub name: String,
}

/// Client representation returned by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientDto {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Thejo Client1")]
    pub name: String,
    /// Creation timestamp (RFC 3339)
    #[schema(example = "2024-11-16T10:30:00Z")]
    pub created_at: String,
}

impl From<client::Model> for ClientDto {
    fn from(model: client::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    #[schema(example = "success")]
    pub status: String,
    pub client: ClientDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientListResponse {
    #[schema(example = "success")]
    pub status: String,
    pub clients: Vec<ClientDto>,
}

/// Create a client
#[utoipa::path(
    post,
    path = "/api/clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created", body = ClientResponse),
        (status = 409, description = "Conflicting concurrent write", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError)
    ),
    tag = "clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    payload: Result<Json<CreateClientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    let Json(request) = payload?;
    let client = ClientRepository::new(&state.db).create(&request.name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ClientResponse {
            status: SUCCESS.to_string(),
            client: client.into(),
        }),
    ))
}

/// List clients ordered by name
#[utoipa::path(
    get,
    path = "/api/clients",
    responses(
        (status = 200, description = "All clients", body = ClientListResponse)
    ),
    tag = "clients"
)]
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<ClientListResponse>, ApiError> {
    let clients = ClientRepository::new(&state.db).list().await?;
    Ok(Json(ClientListResponse {
        status: SUCCESS.to_string(),
        clients: clients.into_iter().map(ClientDto::from).collect(),
    }))
}

/// Fetch one client
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "The client", body = ClientResponse),
        (status = 404, description = "Client not found", body = ApiError)
    ),
    tag = "clients"
)]
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = ClientRepository::new(&state.db).require(id).await?;
    Ok(Json(ClientResponse {
        status: SUCCESS.to_string(),
        client: client.into(),
    }))
}

/// Delete a client with its buildings, custom fields and values
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client deleted", body = MessageResponse),
        (status = 404, description = "Client not found", body = ApiError)
    ),
    tag = "clients"
)]
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    ClientRepository::new(&state.db).delete(id).await?;
    Ok(Json(MessageResponse::success("Client deleted successfully")))
}
