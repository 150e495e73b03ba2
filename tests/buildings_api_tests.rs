//! HTTP tests for the buildings API, driven through the router with
//! `tower::ServiceExt::oneshot`.

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use buildings::server::{AppState, create_app};
use buildings::services::BuildingService;
use buildings::telemetry::TRACE_ID_HEADER;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{RacingPairWriter, roofing_client, setup_test_state};

struct TestApp {
    router: Router,
    client_id: uuid::Uuid,
}

async fn setup_app() -> Result<TestApp> {
    let state = setup_test_state().await?;
    let client = roofing_client(&state.db, "Roofing Co").await?;
    Ok(TestApp {
        router: create_app(state),
        client_id: client.id,
    })
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

#[tokio::test]
async fn create_returns_flat_building_with_every_field() -> Result<()> {
    let app = setup_app().await?;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/buildings",
        Some(json!({
            "client_id": app.client_id,
            "street": "1 Main St",
            "city": "Austin",
            "state": "TX",
            "zip": "10000",
            "custom_fields": {"area_sqft": "25000", "roof_type": "shingle"}
        })),
    )
    .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Building created successfully");
    let building = &body["building"];
    assert_eq!(building["client_name"], "Roofing Co");
    assert_eq!(building["address"], "1 Main St, Austin, TX, 10000");
    assert_eq!(building["area_sqft"], "25000");
    assert_eq!(building["roof_type"], "shingle");
    assert_eq!(building["brick_color"], "");
    assert!(building["id"].is_string());
    Ok(())
}

#[tokio::test]
async fn invalid_values_return_422_and_create_nothing() -> Result<()> {
    let app = setup_app().await?;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/buildings",
        Some(json!({
            "client_id": app.client_id,
            "street": "2 Main St",
            "custom_fields": {"roof_type": "Wood"}
        })),
    )
    .await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(
        body["errors"],
        json!(["Invalid value for 'roof_type': must be one of: Shingle, Metal"])
    );

    let (_, list) = send(&app.router, "GET", "/api/buildings", None).await?;
    assert_eq!(list["pagination"]["total_count"], 0);
    Ok(())
}

#[tokio::test]
async fn unique_violation_on_create_returns_409_and_creates_nothing() -> Result<()> {
    let state = setup_test_state().await?;
    let client = roofing_client(&state.db, "Roofing Co").await?;
    let state = AppState {
        buildings: BuildingService::with_writer(state.db.clone(), Arc::new(RacingPairWriter)),
        ..state
    };
    let router = create_app(state);

    let (status, body) = send(
        &router,
        "POST",
        "/api/buildings",
        Some(json!({
            "client_id": client.id,
            "street": "2 Main St",
            "custom_fields": {"brick_color": "Red"}
        })),
    )
    .await?;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["errors"], json!(["Resource already exists"]));

    let (_, list) = send(&router, "GET", "/api/buildings", None).await?;
    assert_eq!(list["pagination"]["total_count"], 0);
    Ok(())
}

#[tokio::test]
async fn custom_fields_must_be_an_object() -> Result<()> {
    let app = setup_app().await?;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/buildings",
        Some(json!({
            "client_id": app.client_id,
            "street": "3 Main St",
            "custom_fields": ["area_sqft"]
        })),
    )
    .await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"], json!(["custom_fields must be an object"]));
    Ok(())
}

#[tokio::test]
async fn unknown_ids_return_404() -> Result<()> {
    let app = setup_app().await?;
    let missing = uuid::Uuid::new_v4();

    let (status, body) = send(
        &app.router,
        "GET",
        &format!("/api/buildings/{missing}"),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"], json!(["Building not found"]));

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/buildings",
        Some(json!({"client_id": missing, "street": "4 Main St"})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"], json!(["Client not found"]));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() -> Result<()> {
    let app = setup_app().await?;

    let request = Request::builder()
        .method("POST")
        .uri("/api/buildings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))?;
    let response = app.router.clone().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn update_patches_attributes_and_values() -> Result<()> {
    let app = setup_app().await?;
    let (_, created) = send(
        &app.router,
        "POST",
        "/api/buildings",
        Some(json!({"client_id": app.client_id, "street": "5 Main St"})),
    )
    .await?;
    let id = created["building"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(
        &app.router,
        "PATCH",
        &format!("/api/buildings/{id}"),
        Some(json!({"city": "Dallas", "custom_fields": {"brick_color": "Red"}})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Building updated successfully");
    assert_eq!(body["building"]["address"], "5 Main St, Dallas");
    assert_eq!(body["building"]["brick_color"], "Red");

    let (status, _) = send(
        &app.router,
        "PUT",
        &format!("/api/buildings/{id}"),
        Some(json!({"custom_fields": {"area_sqft": "abc"}})),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn list_reports_pagination_meta() -> Result<()> {
    let app = setup_app().await?;
    for n in 1..=3 {
        send(
            &app.router,
            "POST",
            "/api/buildings",
            Some(json!({"client_id": app.client_id, "street": format!("{n} Main St")})),
        )
        .await?;
    }

    let (status, body) = send(&app.router, "GET", "/api/buildings?page=2&per_page=2", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["pagination"],
        json!({"current_page": 2, "per_page": 2, "total_pages": 2, "total_count": 3})
    );
    assert_eq!(body["buildings"].as_array().map(Vec::len), Some(1));

    let (_, clamped) = send(&app.router, "GET", "/api/buildings?per_page=1000", None).await?;
    assert_eq!(clamped["pagination"]["per_page"], 100);
    assert_eq!(clamped["pagination"]["current_page"], 1);
    Ok(())
}

#[tokio::test]
async fn delete_then_get_is_not_found() -> Result<()> {
    let app = setup_app().await?;
    let (_, created) = send(
        &app.router,
        "POST",
        "/api/buildings",
        Some(json!({"client_id": app.client_id, "street": "6 Main St"})),
    )
    .await?;
    let id = created["building"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(&app.router, "DELETE", &format!("/api/buildings/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (status, _) = send(&app.router, "GET", &format!("/api/buildings/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn schema_admin_round_trip() -> Result<()> {
    let state = setup_test_state().await?;
    let router = create_app(state);

    let (status, body) = send(&router, "POST", "/api/clients", Some(json!({"name": "Acme"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let client_id = body["client"]["id"].as_str().unwrap_or_default().to_string();

    let (status, _) = send(&router, "POST", "/api/clients", Some(json!({"name": "acme"}))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &router,
        "POST",
        &format!("/api/clients/{client_id}/custom_fields"),
        Some(json!({"name": "Roof Type", "field_type": "enum", "enum_options": ["Shingle", "Metal"]})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["custom_field"]["name"], "roof_type");
    assert_eq!(body["custom_field"]["enum_options"], json!(["Shingle", "Metal"]));

    let (status, body) = send(
        &router,
        "POST",
        &format!("/api/clients/{client_id}/custom_fields"),
        Some(json!({"name": "floors", "field_type": "enum"})),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"],
        json!(["enum_options must be present for enum type fields"])
    );

    let (status, body) = send(
        &router,
        "GET",
        &format!("/api/clients/{client_id}/custom_fields"),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["custom_fields"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn trace_id_is_echoed_or_generated() -> Result<()> {
    let app = setup_app().await?;

    let request = Request::builder()
        .uri("/api/buildings")
        .header(&TRACE_ID_HEADER, "abc-123")
        .body(Body::empty())?;
    let response = app.router.clone().oneshot(request).await?;
    assert_eq!(
        response
            .headers()
            .get(&TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok()),
        Some("abc-123")
    );

    let request = Request::builder()
        .uri(format!("/api/buildings/{}", uuid::Uuid::new_v4()))
        .body(Body::empty())?;
    let response = app.router.clone().oneshot(request).await?;
    let generated = response
        .headers()
        .get(&TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default();
    assert_eq!(generated.len(), 32);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["trace_id"], generated);
    Ok(())
}
