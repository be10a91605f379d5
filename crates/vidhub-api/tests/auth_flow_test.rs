// Session lifecycle integration tests: registration, login, token
// verification, refresh rotation, logout, password change.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

#[tokio::test]
async fn register_then_duplicate_is_conflict() {
    let app = spawn_app().await;

    let body = register(&app, "alice", "alice@example.com", "secret-pw").await;
    assert_eq!(body["statusCode"], 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    // Credential fields never serialize
    assert!(body["data"].get("passwordHash").is_none());
    assert!(body["data"].get("refreshTokenHash").is_none());

    // Same username, different email
    let (status, body) = send_multipart(
        &app.router,
        "POST",
        "/v1/auth/register",
        None,
        &[
            ("username", "alice"),
            ("email", "other@example.com"),
            ("password", "secret-pw"),
            ("displayName", "Other"),
        ],
        &[("avatar", "avatar.png", b"bytes")],
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);

    // Different username, same email
    let (status, _) = send_multipart(
        &app.router,
        "POST",
        "/v1/auth/register",
        None,
        &[
            ("username", "bob"),
            ("email", "alice@example.com"),
            ("password", "secret-pw"),
            ("displayName", "Bob"),
        ],
        &[("avatar", "avatar.png", b"bytes")],
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_requires_fields_and_avatar() {
    let app = spawn_app().await;

    // Missing avatar file
    let (status, body) = send_multipart(
        &app.router,
        "POST",
        "/v1/auth/register",
        None,
        &[
            ("username", "alice"),
            ("email", "alice@example.com"),
            ("password", "secret-pw"),
            ("displayName", "Alice"),
        ],
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    // Empty username
    let (status, _) = send_multipart(
        &app.router,
        "POST",
        "/v1/auth/register",
        None,
        &[
            ("username", "   "),
            ("email", "alice@example.com"),
            ("password", "secret-pw"),
            ("displayName", "Alice"),
        ],
        &[("avatar", "avatar.png", b"bytes")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_issues_pair_and_sets_cookies() {
    let app = spawn_app().await;
    let body = register(&app, "alice", "alice@example.com", "secret-pw").await;
    let identity_id: uuid::Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    // Wrong password: no pair, no refresh-token mutation
    let (status, _) = send_json(
        &app.router,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({"username": "alice", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let row = app.db.get_identity(identity_id).await.unwrap().unwrap();
    assert!(row.refresh_token_hash.is_none());

    // Unknown identity
    let (status, _) = send_json(
        &app.router,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({"username": "nobody", "password": "whatever"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Correct credentials: pair in the body, cookies on the response
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/v1/auth/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            json!({"email": "alice@example.com", "password": "secret-pw"}).to_string(),
        ))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookies: Vec<String> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=")
        && c.contains("HttpOnly")
        && c.contains("Secure")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=")
        && c.contains("HttpOnly")
        && c.contains("Secure")));

    // Refresh token hash was persisted
    let row = app.db.get_identity(identity_id).await.unwrap().unwrap();
    assert!(row.refresh_token_hash.is_some());
}

#[tokio::test]
async fn token_verification_shapes_are_uniform() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "alice").await;

    // Valid bearer token
    let (status, body) = send_json(&app.router, "GET", "/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");

    // Cookie works too
    let (status, _) = send_json_with_cookie(
        &app.router,
        "GET",
        "/v1/auth/me",
        &format!("accessToken={token}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // No token
    let (status, body) = send_json(&app.router, "GET", "/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert!(body["message"].is_string());

    // Tampered signature: same shape
    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });
    let (status, body) = send_json(&app.router, "GET", "/v1/auth/me", Some(&tampered), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let mut config = test_jwt_config();
    config.access_token_lifetime = std::time::Duration::from_secs(0);
    let app = spawn_app_with_jwt(config).await;

    let token = register_and_login(&app, "alice").await;
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;

    let (status, body) = send_json(&app.router, "GET", "/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn refresh_rotates_and_rejects_superseded_tokens() {
    let app = spawn_app().await;
    register(&app, "alice", "alice@example.com", "secret-pw").await;
    let (_, refresh1) = login(&app, "alice", "secret-pw").await;

    // Refresh with the body channel
    let (status, body) = send_json(
        &app.router,
        "POST",
        "/v1/auth/refresh",
        None,
        Some(json!({"refreshToken": refresh1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "first refresh failed: {body}");
    let refresh2 = body["data"]["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(refresh1, refresh2);

    // The rotated-out token is single-use: a second refresh with it fails
    let (status, _) = send_json(
        &app.router,
        "POST",
        "/v1/auth/refresh",
        None,
        Some(json!({"refreshToken": refresh1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The current token still works, via the cookie channel
    let (status, _) = send_json_with_cookie(
        &app.router,
        "POST",
        "/v1/auth/refresh",
        &format!("refreshToken={refresh2}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_without_token_is_rejected() {
    let app = spawn_app().await;
    let (status, body) = send_json(&app.router, "POST", "/v1/auth/refresh", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn later_login_supersedes_old_refresh_token() {
    let app = spawn_app().await;
    register(&app, "alice", "alice@example.com", "secret-pw").await;

    let (_, refresh1) = login(&app, "alice", "secret-pw").await;
    let (_, refresh2) = login(&app, "alice", "secret-pw").await;

    // The earlier pair's refresh token was overwritten by the later login
    let (status, _) = send_json(
        &app.router,
        "POST",
        "/v1/auth/refresh",
        None,
        Some(json!({"refreshToken": refresh1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(
        &app.router,
        "POST",
        "/v1/auth/refresh",
        None,
        Some(json!({"refreshToken": refresh2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_clears_session() {
    let app = spawn_app().await;
    register(&app, "alice", "alice@example.com", "secret-pw").await;
    let (access, refresh) = login(&app, "alice", "secret-pw").await;

    let (status, _) = send_json(&app.router, "POST", "/v1/auth/logout", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);

    // The refresh token stored on the identity was cleared
    let (status, _) = send_json(
        &app.router,
        "POST",
        "/v1/auth/refresh",
        None,
        Some(json!({"refreshToken": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_flow() {
    let app = spawn_app().await;
    register(&app, "alice", "alice@example.com", "old-password").await;
    let (access, _) = login(&app, "alice", "old-password").await;

    // Wrong old password
    let (status, _) = send_json(
        &app.router,
        "PATCH",
        "/v1/auth/password",
        Some(&access),
        Some(json!({"oldPassword": "nope", "newPassword": "new-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correct old password
    let (status, _) = send_json(
        &app.router,
        "PATCH",
        "/v1/auth/password",
        Some(&access),
        Some(json!({"oldPassword": "old-password", "newPassword": "new-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old credentials no longer log in; new ones do
    let (status, _) = send_json(
        &app.router,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({"username": "alice", "password": "old-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(
        &app.router,
        "POST",
        "/v1/auth/login",
        None,
        Some(json!({"username": "alice", "password": "new-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
