// Shared harness for integration tests
//
// Tests drive the real router against the in-memory storage backend, with
// the media store mocked by wiremock. No network listener, no database.
// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vidhub_api::auth::JwtConfig;
use vidhub_api::{build_router, AppContext};
use vidhub_media::{MediaClient, MediaConfig};
use vidhub_storage::StorageBackend;

pub struct TestApp {
    pub router: Router,
    pub db: StorageBackend,
    /// Kept alive for the duration of the test.
    #[allow(dead_code)]
    pub media_server: MockServer,
}

/// Build an app whose media store accepts everything.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_jwt(test_jwt_config()).await
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "integration-access-secret".to_string(),
        refresh_secret: "integration-refresh-secret".to_string(),
        access_token_lifetime: std::time::Duration::from_secs(900),
        refresh_token_lifetime: std::time::Duration::from_secs(86400),
    }
}

pub async fn spawn_app_with_jwt(jwt_config: JwtConfig) -> TestApp {
    let media_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/testcloud/upload$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": "https://cdn.example/assets/stored.bin",
            "public_id": format!("assets/{}", Uuid::now_v7()),
            "duration": 12.5
        })))
        .mount(&media_server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/testcloud/(image|video)/delete$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"deleted": 1})))
        .mount(&media_server)
        .await;

    let db = StorageBackend::in_memory();
    let media = Arc::new(MediaClient::new(MediaConfig {
        base_url: media_server.uri(),
        cloud_name: "testcloud".to_string(),
        api_key: "test-key".to_string(),
        api_secret: "test-secret".to_string(),
    }));
    let upload_dir = std::env::temp_dir().join(format!("vidhub-test-{}", Uuid::now_v7()));

    let router = build_router(AppContext {
        db: db.clone(),
        media,
        jwt_config,
        upload_dir,
    });

    TestApp {
        router,
        db,
        media_server,
    }
}

/// Send a JSON request; returns status plus parsed body (Null when empty).
pub async fn send_json(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Send a JSON request with an explicit Cookie header.
pub async fn send_json_with_cookie(
    router: &Router,
    method: &str,
    uri: &str,
    cookie: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

const BOUNDARY: &str = "vidhub-test-boundary";

/// Hand-rolled multipart body for upload endpoints.
pub fn multipart_body(
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (name, filename, bytes) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Send a multipart request (with optional bearer token).
pub async fn send_multipart(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> (StatusCode, Value) {
    let (content_type, body) = multipart_body(fields, files);
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body)).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register an identity through the real endpoint.
pub async fn register(app: &TestApp, username: &str, email: &str, password: &str) -> Value {
    let (status, body) = send_multipart(
        &app.router,
        "POST",
        "/v1/auth/register",
        None,
        &[
            ("username", username),
            ("email", email),
            ("password", password),
            ("displayName", "Test User"),
        ],
        &[("avatar", "avatar.png", b"fake avatar bytes")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body
}

/// Log in and return (access_token, refresh_token).
pub async fn login(app: &TestApp, username: &str, password: &str) -> (String, String) {
    let (status, body) = send_json(
        &app.router,
        "POST",
        "/v1/auth/login",
        None,
        Some(serde_json::json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    let access = body["data"]["accessToken"].as_str().unwrap().to_string();
    let refresh = body["data"]["refreshToken"].as_str().unwrap().to_string();
    (access, refresh)
}

/// Register + login in one go; returns the access token.
pub async fn register_and_login(app: &TestApp, username: &str) -> String {
    register(
        app,
        username,
        &format!("{username}@example.com"),
        "password-123",
    )
    .await;
    login(app, username, "password-123").await.0
}
