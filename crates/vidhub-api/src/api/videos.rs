// Video HTTP routes

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use vidhub_core::Video;
use vidhub_storage::UpdateVideoRow;

use crate::auth::middleware::{AuthIdentity, AuthState, FromRef};
use crate::common::{ApiResponse, PageQuery};
use crate::error::ApiResult;
use crate::services::VideoService;
use crate::upload::StagedForm;

/// App state for video routes
#[derive(Clone)]
pub struct VideosState {
    pub service: Arc<VideoService>,
    pub auth: AuthState,
    pub upload_dir: PathBuf,
}

impl FromRef<VideosState> for AuthState {
    fn from_ref(input: &VideosState) -> Self {
        input.auth.clone()
    }
}

/// Update video request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published: Option<bool>,
}

/// Create video routes
pub fn routes(state: VideosState) -> Router {
    Router::new()
        .route("/v1/videos", post(publish_video).get(list_videos))
        .route(
            "/v1/videos/:video_id",
            get(get_video).patch(update_video).delete(delete_video),
        )
        .with_state(state)
}

/// POST /v1/videos - Publish a video (multipart: video + thumbnail files,
/// title, description)
#[utoipa::path(
    post,
    path = "/v1/videos",
    responses(
        (status = 201, description = "Video published", body = ApiResponse<Video>),
        (status = 400, description = "Missing field or file"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Media store failure")
    ),
    tag = "videos"
)]
pub async fn publish_video(
    State(state): State<VideosState>,
    AuthIdentity(identity): AuthIdentity,
    mut multipart: Multipart,
) -> ApiResult<ApiResponse<Video>> {
    let form = StagedForm::from_multipart(&mut multipart, &state.upload_dir).await?;
    let result = publish_with_form(&state, identity.id, &form).await;
    form.discard().await;
    result
}

async fn publish_with_form(
    state: &VideosState,
    owner: Uuid,
    form: &StagedForm,
) -> ApiResult<ApiResponse<Video>> {
    let title = form.require_field("title")?;
    let description = form.require_field("description")?;
    let video_file = form.require_file("video")?;
    let thumbnail_file = form.require_file("thumbnail")?;

    let video = state
        .service
        .publish(owner, title, description, video_file, thumbnail_file)
        .await?;

    Ok(ApiResponse::created(video, "Video published successfully"))
}

/// GET /v1/videos - List published videos (paginated)
#[utoipa::path(
    get,
    path = "/v1/videos",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size, capped at 100")
    ),
    responses(
        (status = 200, description = "Page of videos", body = ApiResponse<Vec<Video>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "videos"
)]
pub async fn list_videos(
    State(state): State<VideosState>,
    AuthIdentity(_identity): AuthIdentity,
    Query(page): Query<PageQuery>,
) -> ApiResult<ApiResponse<Vec<Video>>> {
    let videos = state.service.list(&page).await?;
    Ok(ApiResponse::ok(videos, "Videos retrieved successfully"))
}

/// GET /v1/videos/{video_id} - Fetch one video, recording the view
#[utoipa::path(
    get,
    path = "/v1/videos/{video_id}",
    params(("video_id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video found", body = ApiResponse<Video>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Video not found")
    ),
    tag = "videos"
)]
pub async fn get_video(
    State(state): State<VideosState>,
    AuthIdentity(identity): AuthIdentity,
    Path(video_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Video>> {
    let video = state.service.get_for_viewer(video_id, identity.id).await?;
    Ok(ApiResponse::ok(video, "Video retrieved successfully"))
}

/// PATCH /v1/videos/{video_id} - Update title/description/published (owner only)
#[utoipa::path(
    patch,
    path = "/v1/videos/{video_id}",
    params(("video_id" = Uuid, Path, description = "Video ID")),
    request_body = UpdateVideoRequest,
    responses(
        (status = 200, description = "Video updated", body = ApiResponse<Video>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found")
    ),
    tag = "videos"
)]
pub async fn update_video(
    State(state): State<VideosState>,
    AuthIdentity(identity): AuthIdentity,
    Path(video_id): Path<Uuid>,
    Json(req): Json<UpdateVideoRequest>,
) -> ApiResult<ApiResponse<Video>> {
    let video = state
        .service
        .update(
            identity.id,
            video_id,
            UpdateVideoRow {
                title: req.title,
                description: req.description,
                published: req.published,
            },
        )
        .await?;
    Ok(ApiResponse::ok(video, "Video updated successfully"))
}

/// DELETE /v1/videos/{video_id} - Delete the video and its media assets (owner only)
#[utoipa::path(
    delete,
    path = "/v1/videos/{video_id}",
    params(("video_id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video deleted", body = ApiResponse<Video>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found"),
        (status = 502, description = "Media store failure")
    ),
    tag = "videos"
)]
pub async fn delete_video(
    State(state): State<VideosState>,
    AuthIdentity(identity): AuthIdentity,
    Path(video_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Video>> {
    let video = state.service.delete(identity.id, video_id).await?;
    Ok(ApiResponse::ok(video, "Video deleted successfully"))
}
