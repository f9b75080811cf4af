//! HTTP API tests exercising the router end to end

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use lendtrack::auth::AuthService;
use lendtrack::state::AppState;

async fn setup_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    lendtrack::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let auth_service = AuthService::new("test-secret".to_string(), 900, 7);

    lendtrack::build_router(AppState::new(pool, auth_service))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Register a user and return their access token
async fn register(app: &Router, name: &str, email: &str, role: Option<&str>) -> String {
    let mut body = json!({
        "name": name,
        "email": email,
        "password": "password123",
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }

    let (status, json) = send(app, Method::POST, "/api/users/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    json["access_token"].as_str().unwrap().to_string()
}

async fn create_device(app: &Router, admin_token: &str) -> String {
    let (status, json) = send(
        app,
        Method::POST,
        "/api/devices",
        Some(admin_token),
        Some(json!({"name": "ThinkPad", "type": "laptop", "location": "Lab 1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    json["device"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let (status, json) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "connected");
}

#[tokio::test]
async fn test_register_and_login() {
    let app = setup_app().await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({"name": "Alice", "email": "alice@example.com", "password": "password123"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["code"], 201);
    assert_eq!(json["message"], "User registered successfully");
    assert!(json["access_token"].is_string());
    assert_eq!(json["user"]["email"], "alice@example.com");
    // The hash must never leak.
    assert!(json["user"].get("password_hash").is_none());

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 200);

    // Wrong password and unknown email look the same.
    let (status, json) = send(
        &app,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let app = setup_app().await;

    register(&app, "Alice", "alice@example.com", None).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({"name": "Other", "email": "alice@example.com", "password": "password123"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 400);
}

#[tokio::test]
async fn test_borrowings_require_auth() {
    let app = setup_app().await;

    let (status, json) = send(&app, Method::GET, "/api/borrowings", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], 401);
}

#[tokio::test]
async fn test_borrow_flow_over_http() {
    let app = setup_app().await;

    let admin = register(&app, "Admin", "admin@example.com", Some("admin")).await;
    let user = register(&app, "Bob", "bob@example.com", None).await;
    let device_id = create_device(&app, &admin).await;

    // Find Bob's id through /me.
    let (_, me) = send(&app, Method::GET, "/api/users/me", Some(&user), None).await;
    let user_id = me["user"]["id"].as_str().unwrap().to_string();

    // Missing identifiers get a 400 with a pointed message.
    let (status, json) = send(
        &app,
        Method::POST,
        "/api/borrowings",
        Some(&user),
        Some(json!({"deviceId": device_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Device ID and User ID are required");

    // Borrow the device.
    let (status, json) = send(
        &app,
        Method::POST,
        "/api/borrowings",
        Some(&user),
        Some(json!({"deviceId": device_id, "userId": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Borrowing created successfully");
    assert_eq!(json["borrowing"]["status"], "pending");
    let borrowing_id = json["borrowing"]["id"].as_str().unwrap().to_string();

    // The device is now claimed.
    let (status, json) = send(
        &app,
        Method::POST,
        "/api/borrowings",
        Some(&user),
        Some(json!({"deviceId": device_id, "userId": user_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Device is already borrowed");

    // Only admins may accept.
    let accept_uri = format!("/api/borrowings/accept/{}", borrowing_id);
    let (status, _) = send(&app, Method::PUT, &accept_uri, Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(&app, Method::PUT, &accept_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["borrowing"]["status"], "accepted");

    // Borrower requests the return, admin approves it.
    let return_uri = format!("/api/borrowings/return/{}", borrowing_id);
    let (status, json) = send(&app, Method::PUT, &return_uri, Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["borrowing"]["status"], "return-pending");

    let (status, json) = send(&app, Method::PUT, &accept_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["borrowing"]["status"], "returned");

    // The device is free again.
    let (status, json) = send(
        &app,
        Method::GET,
        &format!("/api/devices/{}", device_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["device"]["status"], "available");

    // Resolving a terminal borrowing is an invalid transition (reported
    // as 400 per the wire contract).
    let (status, json) = send(&app, Method::PUT, &accept_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Cannot resolve"));
}

#[tokio::test]
async fn test_borrower_cannot_touch_others_borrowing() {
    let app = setup_app().await;

    let admin = register(&app, "Admin", "admin@example.com", Some("admin")).await;
    let owner = register(&app, "Owner", "owner@example.com", None).await;
    let other = register(&app, "Other", "other@example.com", None).await;
    let device_id = create_device(&app, &admin).await;

    let (_, me) = send(&app, Method::GET, "/api/users/me", Some(&owner), None).await;
    let owner_id = me["user"]["id"].as_str().unwrap().to_string();

    let (_, json) = send(
        &app,
        Method::POST,
        "/api/borrowings",
        Some(&owner),
        Some(json!({"deviceId": device_id, "userId": owner_id})),
    )
    .await;
    let borrowing_id = json["borrowing"]["id"].as_str().unwrap().to_string();

    let cancel_uri = format!("/api/borrowings/cancel/{}", borrowing_id);
    let (status, _) = send(&app, Method::PUT, &cancel_uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(&app, Method::PUT, &cancel_uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["borrowing"]["status"], "cancel-pending");
}

#[tokio::test]
async fn test_device_crud_and_search() {
    let app = setup_app().await;

    let admin = register(&app, "Admin", "admin@example.com", Some("admin")).await;

    // Mutations need the admin role.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/devices",
        None,
        Some(json!({"name": "X", "type": "tablet", "location": "Desk"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let device_id = create_device(&app, &admin).await;

    let (status, json) = send(
        &app,
        Method::PUT,
        &format!("/api/devices/{}", device_id),
        Some(&admin),
        Some(json!({"name": "ThinkPad X1", "type": "laptop", "location": "Lab 2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["device"]["name"], "ThinkPad X1");
    assert_eq!(json["device"]["location"], "Lab 2");

    // Reads are public.
    let (status, json) = send(
        &app,
        Method::GET,
        "/api/devices/search?type=laptop&status=available",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["devices"].as_array().unwrap().len(), 1);

    let (status, json) = send(
        &app,
        Method::GET,
        "/api/devices/search?location=Basement",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["devices"].as_array().unwrap().is_empty());

    // Administrative status override.
    let (status, json) = send(
        &app,
        Method::PATCH,
        &format!("/api/devices/status/{}", device_id),
        Some(&admin),
        Some(json!({"status": "borrowed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["device"]["status"], "borrowed");

    let (status, json) = send(
        &app,
        Method::DELETE,
        &format!("/api/devices/{}", device_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Device deleted successfully");

    let (status, json) = send(
        &app,
        Method::GET,
        &format!("/api/devices/{}", device_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Device not found");
}

#[tokio::test]
async fn test_user_admin_endpoints() {
    let app = setup_app().await;

    let admin = register(&app, "Admin", "admin@example.com", Some("admin")).await;
    let user = register(&app, "Carol", "carol@example.com", None).await;

    // Listing users is admin-only.
    let (status, _) = send(&app, Method::GET, "/api/users", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(&app, Method::GET, "/api/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["users"].as_array().unwrap().len(), 2);

    let carol_id = json["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "carol@example.com")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, json) = send(
        &app,
        Method::PUT,
        &format!("/api/users/{}", carol_id),
        Some(&admin),
        Some(json!({"name": "Carol B", "email": "carol@example.com", "role": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user"]["role"], "admin");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{}", carol_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/users/{}", carol_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_refresh_token_flow() {
    let app = setup_app().await;

    let (_, json) = send(
        &app,
        Method::POST,
        "/api/users/register",
        None,
        Some(json!({"name": "Dave", "email": "dave@example.com", "password": "password123"})),
    )
    .await;
    let refresh_token = json["refresh_token"].as_str().unwrap().to_string();
    let access_token = json["access_token"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/users/refresh",
        None,
        Some(json!({"refresh_token": refresh_token})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["access_token"].is_string());

    // An access token is not accepted as a refresh token.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/users/refresh",
        None,
        Some(json!({"refresh_token": access_token})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_inputs_get_json_errors() {
    let app = setup_app().await;

    // Malformed UUID in the path.
    let (status, json) = send(&app, Method::GET, "/api/devices/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 400);
    assert!(json["message"].is_string());

    // Body that is not valid JSON.
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], 400);

    // Wrong type for a known field.
    let (status, json) = send(
        &app,
        Method::POST,
        "/api/users/login",
        None,
        Some(json!({"email": "x@example.com", "password": 42})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 400);
}

#[tokio::test]
async fn test_root_banner() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"LendTrack API Server");
}
