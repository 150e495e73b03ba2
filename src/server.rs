//! # Server Configuration
//!
//! This module contains the router and server setup for the buildings API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router, middleware,
    routing::{get, patch},
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers::{self, buildings, clients, custom_fields};
use crate::services::BuildingService;
use crate::telemetry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub buildings: BuildingService,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        Self {
            config: Arc::new(config),
            buildings: BuildingService::new(db.clone()),
            db,
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/clients/{id}",
            get(clients::get_client).delete(clients::delete_client),
        )
        .route(
            "/clients/{client_id}/custom_fields",
            get(custom_fields::list_custom_fields).post(custom_fields::create_custom_field),
        )
        .route(
            "/custom_fields/{id}",
            patch(custom_fields::update_custom_field).delete(custom_fields::delete_custom_field),
        )
        .route(
            "/buildings",
            get(buildings::list_buildings).post(buildings::create_building),
        )
        .route(
            "/buildings/{id}",
            get(buildings::get_building)
                .patch(buildings::update_building)
                .put(buildings::update_building)
                .delete(buildings::delete_building),
        );

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .nest("/api", api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(telemetry::trace_id_middleware))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("Invalid server address: {}", config.api_bind_addr))?;
    let profile = config.profile.clone();

    let app = create_app(AppState::new(config, db));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::clients::create_client,
        crate::handlers::clients::list_clients,
        crate::handlers::clients::get_client,
        crate::handlers::clients::delete_client,
        crate::handlers::custom_fields::create_custom_field,
        crate::handlers::custom_fields::list_custom_fields,
        crate::handlers::custom_fields::update_custom_field,
        crate::handlers::custom_fields::delete_custom_field,
        crate::handlers::buildings::list_buildings,
        crate::handlers::buildings::get_building,
        crate::handlers::buildings::create_building,
        crate::handlers::buildings::update_building,
        crate::handlers::buildings::delete_building,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::handlers::HealthResponse,
            crate::handlers::types::PaginationMeta,
            crate::handlers::types::MessageResponse,
            crate::handlers::clients::CreateClientRequest,
            crate::handlers::clients::ClientDto,
            crate::handlers::clients::ClientResponse,
            crate::handlers::clients::ClientListResponse,
            crate::fields::ProposedField,
            crate::fields::FieldKind,
            crate::repositories::FieldChanges,
            crate::repositories::BuildingAttributes,
            crate::handlers::custom_fields::CustomFieldDto,
            crate::handlers::custom_fields::CustomFieldResponse,
            crate::handlers::custom_fields::CustomFieldListResponse,
            crate::handlers::buildings::CreateBuildingRequest,
            crate::handlers::buildings::UpdateBuildingRequest,
            crate::handlers::buildings::BuildingResponse,
            crate::handlers::buildings::BuildingListResponse,
        )
    ),
    tags(
        (name = "root", description = "Service information and health"),
        (name = "clients", description = "Client administration"),
        (name = "custom_fields", description = "Per-client custom field definitions"),
        (name = "buildings", description = "Buildings and their custom field values"),
    ),
    info(
        title = "Buildings API",
        description = "Buildings with per-client typed custom fields",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
