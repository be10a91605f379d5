// Playlist HTTP routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use vidhub_core::Playlist;
use vidhub_storage::UpdatePlaylistRow;

use crate::auth::middleware::{AuthIdentity, AuthState, FromRef};
use crate::common::ApiResponse;
use crate::error::ApiResult;
use crate::services::PlaylistService;

/// App state for playlist routes
#[derive(Clone)]
pub struct PlaylistsState {
    pub service: Arc<PlaylistService>,
    pub auth: AuthState,
}

impl FromRef<PlaylistsState> for AuthState {
    fn from_ref(input: &PlaylistsState) -> Self {
        input.auth.clone()
    }
}

/// Create playlist request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Update playlist request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Create playlist routes
pub fn routes(state: PlaylistsState) -> Router {
    Router::new()
        .route("/v1/playlists", post(create_playlist))
        .route(
            "/v1/playlists/:playlist_id",
            get(get_playlist)
                .patch(update_playlist)
                .delete(delete_playlist),
        )
        .route(
            "/v1/playlists/:playlist_id/videos/:video_id",
            post(add_video).delete(remove_video),
        )
        .with_state(state)
}

/// POST /v1/playlists - Create a playlist
#[utoipa::path(
    post,
    path = "/v1/playlists",
    request_body = CreatePlaylistRequest,
    responses(
        (status = 201, description = "Playlist created", body = ApiResponse<Playlist>),
        (status = 400, description = "Missing name"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "playlists"
)]
pub async fn create_playlist(
    State(state): State<PlaylistsState>,
    AuthIdentity(identity): AuthIdentity,
    Json(req): Json<CreatePlaylistRequest>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist = state
        .service
        .create(identity.id, &req.name, req.description)
        .await?;
    Ok(ApiResponse::created(
        playlist,
        "Playlist created successfully",
    ))
}

/// GET /v1/playlists/{playlist_id} - Fetch a playlist with its members
#[utoipa::path(
    get,
    path = "/v1/playlists/{playlist_id}",
    params(("playlist_id" = Uuid, Path, description = "Playlist ID")),
    responses(
        (status = 200, description = "Playlist found", body = ApiResponse<Playlist>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Playlist not found")
    ),
    tag = "playlists"
)]
pub async fn get_playlist(
    State(state): State<PlaylistsState>,
    AuthIdentity(_identity): AuthIdentity,
    Path(playlist_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist = state.service.get(playlist_id).await?;
    Ok(ApiResponse::ok(playlist, "Playlist retrieved successfully"))
}

/// PATCH /v1/playlists/{playlist_id} - Update name/description (owner only)
#[utoipa::path(
    patch,
    path = "/v1/playlists/{playlist_id}",
    params(("playlist_id" = Uuid, Path, description = "Playlist ID")),
    request_body = UpdatePlaylistRequest,
    responses(
        (status = 200, description = "Playlist updated", body = ApiResponse<Playlist>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Playlist not found")
    ),
    tag = "playlists"
)]
pub async fn update_playlist(
    State(state): State<PlaylistsState>,
    AuthIdentity(identity): AuthIdentity,
    Path(playlist_id): Path<Uuid>,
    Json(req): Json<UpdatePlaylistRequest>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist = state
        .service
        .update(
            identity.id,
            playlist_id,
            UpdatePlaylistRow {
                name: req.name,
                description: req.description,
            },
        )
        .await?;
    Ok(ApiResponse::ok(playlist, "Playlist updated successfully"))
}

/// DELETE /v1/playlists/{playlist_id} - Delete a playlist (owner only)
#[utoipa::path(
    delete,
    path = "/v1/playlists/{playlist_id}",
    params(("playlist_id" = Uuid, Path, description = "Playlist ID")),
    responses(
        (status = 200, description = "Playlist deleted", body = ApiResponse<Playlist>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Playlist not found")
    ),
    tag = "playlists"
)]
pub async fn delete_playlist(
    State(state): State<PlaylistsState>,
    AuthIdentity(identity): AuthIdentity,
    Path(playlist_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist = state.service.delete(identity.id, playlist_id).await?;
    Ok(ApiResponse::ok(playlist, "Playlist deleted successfully"))
}

/// POST /v1/playlists/{playlist_id}/videos/{video_id} - Add a video (owner
/// only; adding an existing member is a no-op)
#[utoipa::path(
    post,
    path = "/v1/playlists/{playlist_id}/videos/{video_id}",
    params(
        ("playlist_id" = Uuid, Path, description = "Playlist ID"),
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video added", body = ApiResponse<Playlist>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Playlist or video not found")
    ),
    tag = "playlists"
)]
pub async fn add_video(
    State(state): State<PlaylistsState>,
    AuthIdentity(identity): AuthIdentity,
    Path((playlist_id, video_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist = state
        .service
        .add_video(identity.id, playlist_id, video_id)
        .await?;
    Ok(ApiResponse::ok(playlist, "Video added to playlist"))
}

/// DELETE /v1/playlists/{playlist_id}/videos/{video_id} - Remove a video
/// (owner only)
#[utoipa::path(
    delete,
    path = "/v1/playlists/{playlist_id}/videos/{video_id}",
    params(
        ("playlist_id" = Uuid, Path, description = "Playlist ID"),
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video removed", body = ApiResponse<Playlist>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Playlist not found")
    ),
    tag = "playlists"
)]
pub async fn remove_video(
    State(state): State<PlaylistsState>,
    AuthIdentity(identity): AuthIdentity,
    Path((playlist_id, video_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<ApiResponse<Playlist>> {
    let playlist = state
        .service
        .remove_video(identity.id, playlist_id, video_id)
        .await?;
    Ok(ApiResponse::ok(playlist, "Video removed from playlist"))
}
