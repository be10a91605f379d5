// User-facing identity routes: account details, avatar/cover replacement,
// account deletion, watch history, per-identity tweet and playlist listings

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use vidhub_core::{Identity, Playlist, Tweet, WatchEntry};

use crate::auth::middleware::{AuthIdentity, AuthState, FromRef};
use crate::common::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::services::{IdentityService, PlaylistService, TweetService, VideoService};
use crate::upload::StagedForm;

/// App state for user routes
#[derive(Clone)]
pub struct UsersState {
    pub identities: Arc<IdentityService>,
    pub videos: Arc<VideoService>,
    pub tweets: Arc<TweetService>,
    pub playlists: Arc<PlaylistService>,
    pub auth: AuthState,
    pub upload_dir: PathBuf,
}

impl FromRef<UsersState> for AuthState {
    fn from_ref(input: &UsersState) -> Self {
        input.auth.clone()
    }
}

/// Account detail update request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// Create user routes
pub fn routes(state: UsersState) -> Router {
    Router::new()
        .route("/v1/users/me", patch(update_account).delete(delete_account))
        .route("/v1/users/me/avatar", patch(update_avatar))
        .route("/v1/users/me/cover", patch(update_cover))
        .route("/v1/users/me/watch-history", get(watch_history))
        .route("/v1/users/:identity_id/tweets", get(list_identity_tweets))
        .route(
            "/v1/users/:identity_id/playlists",
            get(list_identity_playlists),
        )
        .with_state(state)
}

/// PATCH /v1/users/me - Update display name and/or email
#[utoipa::path(
    patch,
    path = "/v1/users/me",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<Identity>),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email already in use")
    ),
    tag = "users"
)]
pub async fn update_account(
    State(state): State<UsersState>,
    AuthIdentity(identity): AuthIdentity,
    Json(req): Json<UpdateAccountRequest>,
) -> ApiResult<ApiResponse<Identity>> {
    let updated = state
        .identities
        .update_details(identity.id, req.display_name, req.email)
        .await?;
    Ok(ApiResponse::ok(updated, "Account updated successfully"))
}

/// PATCH /v1/users/me/avatar - Replace the avatar (multipart, file field "avatar")
#[utoipa::path(
    patch,
    path = "/v1/users/me/avatar",
    responses(
        (status = 200, description = "Avatar updated", body = ApiResponse<Identity>),
        (status = 400, description = "Missing file"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Media store failure")
    ),
    tag = "users"
)]
pub async fn update_avatar(
    State(state): State<UsersState>,
    AuthIdentity(identity): AuthIdentity,
    mut multipart: Multipart,
) -> ApiResult<ApiResponse<Identity>> {
    let form = StagedForm::from_multipart(&mut multipart, &state.upload_dir).await?;
    let result = match form.require_file("avatar") {
        Ok(staged) => state.identities.change_avatar(identity.id, staged).await,
        Err(e) => Err(e),
    };
    form.discard().await;

    let updated = result?;
    Ok(ApiResponse::ok(updated, "Avatar updated successfully"))
}

/// PATCH /v1/users/me/cover - Replace the cover image (multipart, file field
/// "coverImage")
#[utoipa::path(
    patch,
    path = "/v1/users/me/cover",
    responses(
        (status = 200, description = "Cover image updated", body = ApiResponse<Identity>),
        (status = 400, description = "Missing file"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Media store failure")
    ),
    tag = "users"
)]
pub async fn update_cover(
    State(state): State<UsersState>,
    AuthIdentity(identity): AuthIdentity,
    mut multipart: Multipart,
) -> ApiResult<ApiResponse<Identity>> {
    let form = StagedForm::from_multipart(&mut multipart, &state.upload_dir).await?;
    let result = match form.require_file("coverImage") {
        Ok(staged) => state.identities.change_cover(identity.id, staged).await,
        Err(e) => Err(e),
    };
    form.discard().await;

    let updated = result?;
    Ok(ApiResponse::ok(updated, "Cover image updated successfully"))
}

/// DELETE /v1/users/me - Delete the account and release its stored media
#[utoipa::path(
    delete,
    path = "/v1/users/me",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Media store failure")
    ),
    tag = "users"
)]
pub async fn delete_account(
    State(state): State<UsersState>,
    AuthIdentity(identity): AuthIdentity,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    state.identities.delete_account(identity.id).await?;
    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Account deleted successfully",
    ))
}

/// GET /v1/users/me/watch-history - Videos the caller has watched, newest first
#[utoipa::path(
    get,
    path = "/v1/users/me/watch-history",
    responses(
        (status = 200, description = "Watch history", body = ApiResponse<Vec<WatchEntry>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users"
)]
pub async fn watch_history(
    State(state): State<UsersState>,
    AuthIdentity(identity): AuthIdentity,
) -> ApiResult<ApiResponse<Vec<WatchEntry>>> {
    let entries = state.videos.watch_history(identity.id).await?;
    Ok(ApiResponse::ok(
        entries,
        "Watch history retrieved successfully",
    ))
}

/// GET /v1/users/{identity_id}/tweets - Tweets owned by an identity
#[utoipa::path(
    get,
    path = "/v1/users/{identity_id}/tweets",
    params(("identity_id" = Uuid, Path, description = "Identity ID")),
    responses(
        (status = 200, description = "Tweets", body = ApiResponse<Vec<Tweet>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Identity not found")
    ),
    tag = "users"
)]
pub async fn list_identity_tweets(
    State(state): State<UsersState>,
    AuthIdentity(_identity): AuthIdentity,
    Path(identity_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Vec<Tweet>>> {
    ensure_identity_exists(&state, identity_id).await?;
    let tweets = state.tweets.list_for_owner(identity_id).await?;
    Ok(ApiResponse::ok(tweets, "Tweets retrieved successfully"))
}

/// GET /v1/users/{identity_id}/playlists - Playlists owned by an identity
#[utoipa::path(
    get,
    path = "/v1/users/{identity_id}/playlists",
    params(("identity_id" = Uuid, Path, description = "Identity ID")),
    responses(
        (status = 200, description = "Playlists", body = ApiResponse<Vec<Playlist>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Identity not found")
    ),
    tag = "users"
)]
pub async fn list_identity_playlists(
    State(state): State<UsersState>,
    AuthIdentity(_identity): AuthIdentity,
    Path(identity_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Vec<Playlist>>> {
    ensure_identity_exists(&state, identity_id).await?;
    let playlists = state.playlists.list_for_owner(identity_id).await?;
    Ok(ApiResponse::ok(playlists, "Playlists retrieved successfully"))
}

async fn ensure_identity_exists(state: &UsersState, identity_id: Uuid) -> ApiResult<()> {
    let found = state
        .auth
        .db
        .get_identity(identity_id)
        .await
        .map_err(|e| {
            tracing::error!("Identity lookup failed: {}", e);
            ApiError::upstream("Failed to load identity")
        })?;
    if found.is_none() {
        return Err(ApiError::not_found("Identity not found"));
    }
    Ok(())
}
