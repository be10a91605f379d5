// Resource integration tests: the ownership gate across tweets, comments,
// videos, playlists, plus watch history and account deletion.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

async fn publish_video(app: &TestApp, token: &str, title: &str) -> serde_json::Value {
    let (status, body) = send_multipart(
        &app.router,
        "POST",
        "/v1/videos",
        Some(token),
        &[("title", title), ("description", "a description")],
        &[
            ("video", "clip.mp4", b"fake video bytes"),
            ("thumbnail", "thumb.png", b"fake thumb bytes"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "publish failed: {body}");
    body["data"].clone()
}

#[tokio::test]
async fn tweet_ownership_gate() {
    let app = spawn_app().await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;

    let (status, body) = send_json(
        &app.router,
        "POST",
        "/v1/tweets",
        Some(&alice),
        Some(json!({"content": "hello world"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tweet_id = body["data"]["id"].as_str().unwrap().to_string();

    // Foreign mutation is forbidden
    let (status, body) = send_json(
        &app.router,
        "PATCH",
        &format!("/v1/tweets/{tweet_id}"),
        Some(&bob),
        Some(json!({"content": "hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);

    let (status, _) = send_json(
        &app.router,
        "DELETE",
        &format!("/v1/tweets/{tweet_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The owner may mutate and delete
    let (status, body) = send_json(
        &app.router,
        "PATCH",
        &format!("/v1/tweets/{tweet_id}"),
        Some(&alice),
        Some(json!({"content": "edited"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "edited");

    let (status, _) = send_json(
        &app.router,
        "DELETE",
        &format!("/v1/tweets/{tweet_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Gone now
    let (status, _) = send_json(
        &app.router,
        "PATCH",
        &format!("/v1/tweets/{tweet_id}"),
        Some(&alice),
        Some(json!({"content": "again"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Empty content is invalid
    let (status, _) = send_json(
        &app.router,
        "POST",
        "/v1/tweets",
        Some(&alice),
        Some(json!({"content": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comment_flow_and_ownership() {
    let app = spawn_app().await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;

    let video = publish_video(&app, &alice, "first video").await;
    let video_id = video["id"].as_str().unwrap().to_string();

    // Comment on an unknown video
    let missing = uuid::Uuid::now_v7();
    let (status, _) = send_json(
        &app.router,
        "POST",
        &format!("/v1/videos/{missing}/comments"),
        Some(&bob),
        Some(json!({"content": "nice"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(
        &app.router,
        "POST",
        &format!("/v1/videos/{video_id}/comments"),
        Some(&bob),
        Some(json!({"content": "nice video"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();

    // Even the video owner cannot edit someone else's comment
    let (status, _) = send_json(
        &app.router,
        "PATCH",
        &format!("/v1/comments/{comment_id}"),
        Some(&alice),
        Some(json!({"content": "rewritten"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_json(
        &app.router,
        "PATCH",
        &format!("/v1/comments/{comment_id}"),
        Some(&bob),
        Some(json!({"content": "nice video indeed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "nice video indeed");

    let (status, body) = send_json(
        &app.router,
        "GET",
        &format!("/v1/videos/{video_id}/comments"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn video_lifecycle_views_and_visibility() {
    let app = spawn_app().await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;

    let video = publish_video(&app, &alice, "watchable").await;
    let video_id = video["id"].as_str().unwrap().to_string();
    assert_eq!(video["views"], 0);
    assert_eq!(video["duration"], 12.5);

    // Fetching bumps views and records watch history
    let (status, body) = send_json(
        &app.router,
        "GET",
        &format!("/v1/videos/{video_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["views"], 1);

    let (status, body) = send_json(
        &app.router,
        "GET",
        "/v1/users/me/watch-history",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let history = body["data"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["video"]["id"], video_id.as_str());

    // Foreign update forbidden; owner can unpublish
    let (status, _) = send_json(
        &app.router,
        "PATCH",
        &format!("/v1/videos/{video_id}"),
        Some(&bob),
        Some(json!({"title": "stolen"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_json(
        &app.router,
        "PATCH",
        &format!("/v1/videos/{video_id}"),
        Some(&alice),
        Some(json!({"published": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["published"], false);

    // Unpublished videos hide from everyone but the owner
    let (status, _) = send_json(
        &app.router,
        "GET",
        &format!("/v1/videos/{video_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(
        &app.router,
        "GET",
        &format!("/v1/videos/{video_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // And they drop out of the public listing
    let (status, body) = send_json(&app.router, "GET", "/v1/videos", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());

    // Owner deletes; media assets are released and the row is gone
    let (status, _) = send_json(
        &app.router,
        "DELETE",
        &format!("/v1/videos/{video_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app.router,
        "GET",
        &format!("/v1/videos/{video_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn playlist_membership_and_ownership() {
    let app = spawn_app().await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;

    let video = publish_video(&app, &alice, "member").await;
    let video_id = video["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        &app.router,
        "POST",
        "/v1/playlists",
        Some(&alice),
        Some(json!({"name": "favorites", "description": "the good ones"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let playlist_id = body["data"]["id"].as_str().unwrap().to_string();

    // Foreign member mutation is forbidden
    let (status, _) = send_json(
        &app.router,
        "POST",
        &format!("/v1/playlists/{playlist_id}/videos/{video_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Adding twice keeps set semantics
    for _ in 0..2 {
        let (status, _) = send_json(
            &app.router,
            "POST",
            &format!("/v1/playlists/{playlist_id}/videos/{video_id}"),
            Some(&alice),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send_json(
        &app.router,
        "GET",
        &format!("/v1/playlists/{playlist_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["videoIds"].as_array().unwrap().len(), 1);

    // Adding an unknown video fails
    let missing = uuid::Uuid::now_v7();
    let (status, _) = send_json(
        &app.router,
        "POST",
        &format!("/v1/playlists/{playlist_id}/videos/{missing}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Remove, rename, delete
    let (status, body) = send_json(
        &app.router,
        "DELETE",
        &format!("/v1/playlists/{playlist_id}/videos/{video_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["videoIds"].as_array().unwrap().is_empty());

    let (status, body) = send_json(
        &app.router,
        "PATCH",
        &format!("/v1/playlists/{playlist_id}"),
        Some(&alice),
        Some(json!({"name": "renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "renamed");

    let (status, _) = send_json(
        &app.router,
        "DELETE",
        &format!("/v1/playlists/{playlist_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app.router,
        "GET",
        &format!("/v1/playlists/{playlist_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_routes_and_account_deletion() {
    let app = spawn_app().await;
    let body = register(&app, "alice", "alice@example.com", "secret-pw").await;
    let identity_id = body["data"]["id"].as_str().unwrap().to_string();
    let (access, _) = login(&app, "alice", "secret-pw").await;

    // Update display name
    let (status, body) = send_json(
        &app.router,
        "PATCH",
        "/v1/users/me",
        Some(&access),
        Some(json!({"displayName": "Alice Prime"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["displayName"], "Alice Prime");

    // Tweets listed per identity
    let (status, _) = send_json(
        &app.router,
        "POST",
        "/v1/tweets",
        Some(&access),
        Some(json!({"content": "first!"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        &app.router,
        "GET",
        &format!("/v1/users/{identity_id}/tweets"),
        Some(&access),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Unknown identity id
    let missing = uuid::Uuid::now_v7();
    let (status, _) = send_json(
        &app.router,
        "GET",
        &format!("/v1/users/{missing}/tweets"),
        Some(&access),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Replace the avatar
    let (status, body) = send_multipart(
        &app.router,
        "PATCH",
        "/v1/users/me/avatar",
        Some(&access),
        &[],
        &[("avatar", "new-avatar.png", b"new avatar bytes")],
    )
    .await;
    assert_eq!(status, StatusCode::OK, "avatar update failed: {body}");

    // Delete the account; the session dies with it
    let (status, _) = send_json(&app.router, "DELETE", "/v1/users/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(&app.router, "GET", "/v1/auth/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
