//! End-to-end tests driving the router the way a front end would.

use atelier_core::Store;
use atelier_server::{router, AppState, AuthConfig, FileStore, TokenValidator};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const MAX_BODY: usize = 16 * 1024 * 1024;

fn app(tmp: &TempDir) -> Router {
    let state = AppState::ephemeral(tmp.path().join("uploads")).unwrap();
    router(state, MAX_BODY)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_client(app: &Router, nom: &str) -> i64 {
    let (status, body) = request(
        app,
        "POST",
        "/api/clients",
        Some(json!({
            "nom": nom,
            "prenoms": "Test",
            "telephone": "0102030405"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn client_crud_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);

    let id = create_client(&app, "Kouame").await;

    let (status, body) = request(&app, "GET", &format!("/api/clients/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nom"], "Kouame");
    assert_eq!(body["email"], Value::Null);

    // A partial update leaves the other fields alone.
    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/clients/{id}"),
        Some(json!({ "email": "kouame@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "kouame@example.com");
    assert_eq!(body["nom"], "Kouame");

    let (status, body) = request(&app, "GET", "/api/clients", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = request(&app, "DELETE", &format!("/api/clients/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&app, "GET", &format!("/api/clients/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn create_client_missing_phone_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);

    let (status, body) = request(
        &app,
        "POST",
        "/api/clients",
        Some(json!({ "nom": "Sans", "prenoms": "Telephone" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("telephone"));

    let (_, body) = request(&app, "GET", "/api/clients", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_client_cascades() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);

    let id = create_client(&app, "Aka").await;
    let (status, _) = request(
        &app,
        "POST",
        "/api/orders",
        Some(json!({ "client_id": id, "montant_total": 10000.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    request(&app, "DELETE", &format!("/api/clients/{id}"), None).await;

    let (_, body) = request(&app, "GET", "/api/orders", None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn order_balance_and_completion() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);
    let client_id = create_client(&app, "Niangoran").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/orders",
        Some(json!({
            "client_id": client_id,
            "montant_total": 50000.0,
            "montant_avance": 20000.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["montant_restant"], 30000.0);
    assert_eq!(body["status"], "en_cours");
    assert_eq!(body["completed_at"], Value::Null);
    let order_id = body["id"].as_i64().unwrap();

    // Paying more re-derives the balance even though the payload never
    // carries montant_restant.
    let (_, body) = request(
        &app,
        "PUT",
        &format!("/api/orders/{order_id}"),
        Some(json!({ "montant_avance": 35000.0, "montant_restant": 99999.0 })),
    )
    .await;
    assert_eq!(body["montant_restant"], 15000.0);

    let (_, body) = request(
        &app,
        "PUT",
        &format!("/api/orders/{order_id}"),
        Some(json!({ "status": "termine" })),
    )
    .await;
    assert_eq!(body["status"], "termine");
    assert!(body["completed_at"].is_string());
}

#[tokio::test]
async fn orders_filter_by_status() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);
    let client_id = create_client(&app, "Brou").await;

    for status in ["en_cours", "termine"] {
        request(
            &app,
            "POST",
            "/api/orders",
            Some(json!({
                "client_id": client_id,
                "montant_total": 5000.0,
                "status": status
            })),
        )
        .await;
    }

    let (_, body) = request(&app, "GET", "/api/orders?status=termine", None).await;
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "termine");

    let (_, body) = request(&app, "GET", "/api/orders", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn order_for_unknown_client_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);

    let (status, _) = request(
        &app,
        "POST",
        "/api/orders",
        Some(json!({ "client_id": 404, "montant_total": 100.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_counters() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);
    let client_id = create_client(&app, "Ettien").await;

    request(
        &app,
        "POST",
        "/api/orders",
        Some(json!({ "client_id": client_id, "montant_total": 30000.0, "montant_avance": 10000.0 })),
    )
    .await;
    request(
        &app,
        "POST",
        "/api/orders",
        Some(json!({ "client_id": client_id, "montant_total": 20000.0, "status": "termine" })),
    )
    .await;

    let (status, body) = request(&app, "GET", "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_clients"], 1);
    assert_eq!(body["total_orders"], 2);
    assert_eq!(body["orders_en_cours"], 1);
    assert_eq!(body["orders_termine"], 1);
    assert_eq!(body["total_revenue"], 50000.0);
    assert_eq!(body["total_avance"], 10000.0);
    assert_eq!(body["total_restant"], 40000.0);
}

#[tokio::test]
async fn measurement_multipart_create() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);
    let client_id = create_client(&app, "Assi").await;

    let boundary = "atelier-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"client_id\"\r\n\r\n{client_id}\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"poitrine\"\r\n\r\n92\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"do\"\r\n\r\n44-46\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"image\"; filename=\"tenue.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\nJPEGDATA\r\n\
         --{boundary}--\r\n"
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/measurements")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let sheet: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(sheet["client_id"], client_id);
    assert_eq!(sheet["poitrine"], "92");
    assert_eq!(sheet["do"], "44-46");
    let stored = sheet["image_path"].as_str().unwrap();
    assert!(stored.ends_with("_tenue.jpg"));
    assert!(tmp.path().join("uploads").join(stored).exists());

    let (_, listed) = request_list(&app, client_id).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

async fn request_list(app: &Router, client_id: i64) -> (StatusCode, Value) {
    request(
        app,
        "GET",
        &format!("/api/measurements/client/{client_id}"),
        None,
    )
    .await
}

#[tokio::test]
async fn sync_batch_maps_temporary_ids() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);

    let (status, body) = request(
        &app,
        "POST",
        "/api/sync",
        Some(json!({
            "clients": [{
                "id": "temp_1712000000001",
                "nom": "Gnamien",
                "prenoms": "Akissi",
                "telephone": "0555555555"
            }],
            "measurements": [{
                "id": "temp_1712000000002",
                "client_id": "temp_1712000000001",
                "poitrine": "94"
            }],
            "orders": [{
                "id": "temp_1712000000003",
                "client_id": "temp_1712000000001",
                "montant_total": 60000.0,
                "montant_avance": 15000.0
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let client_id = body["id_mappings"]["clients"]["temp_1712000000001"]
        .as_i64()
        .unwrap();
    let sheet_id = body["id_mappings"]["measurements"]["temp_1712000000002"]
        .as_i64()
        .unwrap();
    assert!(body["id_mappings"]["orders"]["temp_1712000000003"].is_i64());

    let sheets = body["measurements"].as_array().unwrap();
    let sheet = sheets
        .iter()
        .find(|m| m["id"].as_i64() == Some(sheet_id))
        .unwrap();
    assert_eq!(sheet["client_id"].as_i64(), Some(client_id));

    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders[0]["montant_restant"], 45000.0);

    // Everything synced together shares one update timestamp.
    assert_eq!(
        body["clients"][0]["updated_at"],
        orders[0]["updated_at"]
    );
}

#[tokio::test]
async fn resubmitted_temp_ids_create_new_rows() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);

    let batch = json!({
        "clients": [{
            "id": "temp_1",
            "nom": "Double",
            "prenoms": "Sync",
            "telephone": "0100000000"
        }]
    });

    let (_, first) = request(&app, "POST", "/api/sync", Some(batch.clone())).await;
    let (_, second) = request(&app, "POST", "/api/sync", Some(batch)).await;

    assert_ne!(
        first["id_mappings"]["clients"]["temp_1"],
        second["id_mappings"]["clients"]["temp_1"]
    );
    assert_eq!(second["clients"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn sync_updates_only_present_fields() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);
    let id = create_client(&app, "Oble").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/sync",
        Some(json!({
            "clients": [{ "id": id, "telephone": "0999999999" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let client = &body["clients"][0];
    assert_eq!(client["telephone"], "0999999999");
    assert_eq!(client["nom"], "Oble");
}

#[tokio::test]
async fn malformed_sync_batch_rolls_back() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);
    create_client(&app, "Seul").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/sync",
        Some(json!({
            "clients": [{
                "id": "temp_kept",
                "nom": "Jamais",
                "prenoms": "Cree",
                "telephone": "0100000000"
            }],
            "measurements": [{
                "id": "temp_m",
                "client_id": "temp_inconnu",
                "poitrine": "90"
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("temp_inconnu"));

    // The client row from the same batch was rolled back too.
    let (_, clients) = request(&app, "GET", "/api/clients", None).await;
    assert_eq!(clients.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn last_update_defaults_to_now_then_tracks_rows() {
    let tmp = TempDir::new().unwrap();
    let app = app(&tmp);

    let (status, body) = request(&app, "GET", "/api/sync/last-update", None).await;
    assert_eq!(status, StatusCode::OK);
    let reported: DateTime<Utc> = body["last_update"].as_str().unwrap().parse().unwrap();
    assert!((Utc::now() - reported).num_seconds().abs() < 5);

    let id = create_client(&app, "Horloge").await;
    let (_, client) = request(&app, "GET", &format!("/api/clients/{id}"), None).await;
    let (_, body) = request(&app, "GET", "/api/sync/last-update", None).await;
    assert_eq!(body["last_update"], client["updated_at"]);
}

#[tokio::test]
async fn auth_gates_the_api_when_configured() {
    let tmp = TempDir::new().unwrap();
    let secret = b"shop-shared-secret".to_vec();
    let validator = TokenValidator::new(AuthConfig::new(secret));
    let state = AppState {
        store: Arc::new(Store::open_in_memory()),
        files: Arc::new(FileStore::open(tmp.path().join("uploads")).unwrap()),
        auth: Some(validator.clone()),
    };
    let app = router(state, MAX_BODY);

    let (status, _) = request(&app, "GET", "/api/clients", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = validator.create_token([7u8; 16]);
    let req = Request::builder()
        .method("GET")
        .uri("/api/clients")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
