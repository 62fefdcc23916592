use super::*;
use std::collections::HashMap;

use anyhow::Result;
use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use shared::protocol::{LIST_PATH, LOOKUP_PATH, PROVISION_PATH};
use tokio::net::TcpListener;

const QUOTA_ERROR: &str = "Hub creation failed: quota exceeded for subscription";

async fn handle_provision(Query(query): Query<HashMap<String, String>>) -> Response {
    let reg_id = query.get("regId").cloned().unwrap_or_default();
    if reg_id == "over-quota" {
        return (StatusCode::INTERNAL_SERVER_ERROR, QUOTA_ERROR).into_response();
    }
    Json(json!({
        "deviceResult": {"status": "assigned"},
        "hubResourceName": format!("hub-for-{reg_id}")
    }))
    .into_response()
}

async fn handle_lookup(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let reg_id = query.get("regId").cloned().unwrap_or_default();
    Json(json!({
        "regId": reg_id,
        "foundInDps": true,
        "registration_http_status": 200,
        "enrollment_http_status": 404,
        "registration": {"deviceId": reg_id, "assignedHub": "hub-a.azure-devices.net"},
        "enrollment": null
    }))
}

async fn handle_list() -> Json<Value> {
    Json(json!({
        "individual_enrollments_status": 200,
        "individual_enrollments": [
            {"registrationId": "r1", "registrationState": {"deviceId": "d1", "status": "assigned"}}
        ],
        "enrollment_groups_status": 200,
        "enrollment_groups": []
    }))
}

fn backend() -> Router {
    Router::new()
        .route(PROVISION_PATH, get(handle_provision))
        .route(LOOKUP_PATH, get(handle_lookup))
        .route(LIST_PATH, get(handle_list))
}

async fn spawn_backend(app: Router) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

#[test]
fn base_url_is_trimmed_and_validated() {
    let client = HttpProvisioningClient::new(" http://localhost:7071/ ").expect("client");
    assert_eq!(client.base_url(), "http://localhost:7071");
    assert_eq!(
        client.endpoint_url(ViewKind::Search),
        "http://localhost:7071/api/LookupDpsDevice"
    );

    assert!(matches!(
        HttpProvisioningClient::new("not a url"),
        Err(ClientError::InvalidBaseUrl { .. })
    ));
    assert!(matches!(
        HttpProvisioningClient::new("ftp://example.com"),
        Err(ClientError::InvalidBaseUrl { .. })
    ));
    assert!(matches!(
        HttpProvisioningClient::new("  / "),
        Err(ClientError::InvalidBaseUrl { .. })
    ));
}

#[test]
fn base_url_keeps_path_prefix() {
    let client = HttpProvisioningClient::new("https://example.com/console/").expect("client");
    assert_eq!(
        client.endpoint_url(ViewKind::List),
        "https://example.com/console/api/ListDpsDevices"
    );
}

#[tokio::test]
async fn provision_returns_backend_json() {
    let base = spawn_backend(backend()).await.expect("spawn backend");
    let client = HttpProvisioningClient::new(base).expect("client");

    let response = client.provision_device("ble_dps_sym").await.expect("provision");
    assert_eq!(response["hubResourceName"], "hub-for-ble_dps_sym");
    assert_eq!(response["deviceResult"]["status"], "assigned");
}

#[tokio::test]
async fn non_success_status_carries_exact_body() {
    let base = spawn_backend(backend()).await.expect("spawn backend");
    let client = HttpProvisioningClient::new(base).expect("client");

    let err = client
        .provision_device("over-quota")
        .await
        .expect_err("must fail");
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), QUOTA_ERROR);
}

#[tokio::test]
async fn reg_id_is_url_encoded() {
    let base = spawn_backend(backend()).await.expect("spawn backend");
    let client = HttpProvisioningClient::new(base).expect("client");

    let response = client
        .lookup_device("rack 4/sensor&1")
        .await
        .expect("lookup");
    assert_eq!(response["regId"], "rack 4/sensor&1");
}

#[tokio::test]
async fn list_devices_returns_envelope() {
    let base = spawn_backend(backend()).await.expect("spawn backend");
    let client = HttpProvisioningClient::new(format!("{base}/")).expect("client");

    let response = client.list_devices().await.expect("list");
    assert_eq!(response["individual_enrollments"][0]["registrationId"], "r1");
}

#[tokio::test]
async fn success_with_non_json_body_is_decode_error() {
    let app = Router::new().route(LIST_PATH, get(|| async { "<html>maintenance</html>" }));
    let base = spawn_backend(app).await.expect("spawn backend");
    let client = HttpProvisioningClient::new(base).expect("client");

    let err = client.list_devices().await.expect_err("must fail");
    assert!(matches!(err, ClientError::Decode(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn unknown_endpoint_surfaces_http_error() {
    let base = spawn_backend(Router::new()).await.expect("spawn backend");
    let client = HttpProvisioningClient::new(base).expect("client");

    let err = client.list_devices().await.expect_err("must fail");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let client = HttpProvisioningClient::new(format!("http://{addr}")).expect("client");

    let err = client.lookup_device("sensor-1").await.expect_err("must fail");
    assert!(matches!(err, ClientError::Transport(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn blank_reg_id_is_rejected_before_sending() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let client = HttpProvisioningClient::new(format!("http://{addr}")).expect("client");

    let err = client.provision_device("   ").await.expect_err("must fail");
    assert!(matches!(err, ClientError::Validation(_)), "unexpected error: {err}");
    let err = client.lookup_device("").await.expect_err("must fail");
    assert_eq!(err.to_string(), shared::protocol::MISSING_REG_ID_MESSAGE);
}

#[tokio::test]
async fn reg_id_is_trimmed_before_sending() {
    let base = spawn_backend(backend()).await.expect("spawn backend");
    let client = HttpProvisioningClient::new(base).expect("client");

    let response = client.lookup_device("  sensor-1 ").await.expect("lookup");
    assert_eq!(response["regId"], "sensor-1");
}

#[test]
fn only_list_view_omits_reg_id() {
    assert!(ViewKind::Registration.requires_reg_id());
    assert!(ViewKind::Search.requires_reg_id());
    assert!(!ViewKind::List.requires_reg_id());
}

#[tokio::test]
async fn search_view_end_to_end() {
    let base = spawn_backend(backend()).await.expect("spawn backend");
    let client = HttpProvisioningClient::new(base).expect("client");
    let view = SearchView::new();

    view.search(&client, "  sensor-1 ").await;

    let summary = view.summary().expect("lookup settled with success");
    assert!(summary.found_in_dps);
    assert_eq!(summary.reg_id.as_deref(), Some("sensor-1"));
    assert_eq!(
        summary.registration_fields.assigned_hub.as_deref(),
        Some("hub-a.azure-devices.net")
    );
    assert_eq!(summary.registration_fields.device_id.as_deref(), Some("sensor-1"));
}

#[tokio::test]
async fn list_view_end_to_end() {
    let base = spawn_backend(backend()).await.expect("spawn backend");
    let client = HttpProvisioningClient::new(base).expect("client");
    let view = ListView::new();

    view.load_all(&client).await;

    let listing = view.listing();
    assert_eq!(listing.individual_enrollments.len(), 1);
    assert!(listing.enrollment_groups.is_empty());
    let record = &listing.individual_enrollments[0].record;
    assert_eq!(record.registration_id.as_deref(), Some("r1"));
    assert_eq!(record.device_id.as_deref(), Some("d1"));
    assert_eq!(record.status.as_deref(), Some("assigned"));
}

#[tokio::test]
async fn registration_view_error_state_holds_body_text() {
    let base = spawn_backend(backend()).await.expect("spawn backend");
    let client = HttpProvisioningClient::new(base).expect("client");
    let view = RegistrationView::new();

    view.provision(&client, "over-quota").await;

    assert_eq!(
        view.controller().state(),
        FetchState::Error(QUOTA_ERROR.to_string())
    );
    assert!(view.summary().is_none());
}
