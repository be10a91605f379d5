// Comment HTTP routes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{patch, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use vidhub_core::Comment;

use crate::auth::middleware::{AuthIdentity, AuthState, FromRef};
use crate::common::{ApiResponse, PageQuery};
use crate::error::ApiResult;
use crate::services::CommentService;

/// App state for comment routes
#[derive(Clone)]
pub struct CommentsState {
    pub service: Arc<CommentService>,
    pub auth: AuthState,
}

impl FromRef<CommentsState> for AuthState {
    fn from_ref(input: &CommentsState) -> Self {
        input.auth.clone()
    }
}

/// Comment payload (create and update share the shape)
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub content: String,
}

/// Create comment routes
pub fn routes(state: CommentsState) -> Router {
    Router::new()
        .route(
            "/v1/videos/:video_id/comments",
            post(post_comment).get(list_comments),
        )
        .route(
            "/v1/comments/:comment_id",
            patch(update_comment).delete(delete_comment),
        )
        .with_state(state)
}

/// POST /v1/videos/{video_id}/comments - Comment on a video
#[utoipa::path(
    post,
    path = "/v1/videos/{video_id}/comments",
    params(("video_id" = Uuid, Path, description = "Video ID")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment posted", body = ApiResponse<Comment>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Video not found")
    ),
    tag = "comments"
)]
pub async fn post_comment(
    State(state): State<CommentsState>,
    AuthIdentity(identity): AuthIdentity,
    Path(video_id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<ApiResponse<Comment>> {
    let comment = state
        .service
        .post(identity.id, video_id, &req.content)
        .await?;
    Ok(ApiResponse::created(comment, "Comment posted successfully"))
}

/// GET /v1/videos/{video_id}/comments - List a video's comments (paginated)
#[utoipa::path(
    get,
    path = "/v1/videos/{video_id}/comments",
    params(
        ("video_id" = Uuid, Path, description = "Video ID"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size, capped at 100")
    ),
    responses(
        (status = 200, description = "Page of comments", body = ApiResponse<Vec<Comment>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Video not found")
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(state): State<CommentsState>,
    AuthIdentity(_identity): AuthIdentity,
    Path(video_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> ApiResult<ApiResponse<Vec<Comment>>> {
    let comments = state.service.list_for_video(video_id, &page).await?;
    Ok(ApiResponse::ok(comments, "Comments retrieved successfully"))
}

/// PATCH /v1/comments/{comment_id} - Edit a comment (owner only)
#[utoipa::path(
    patch,
    path = "/v1/comments/{comment_id}",
    params(("comment_id" = Uuid, Path, description = "Comment ID")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<Comment>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments"
)]
pub async fn update_comment(
    State(state): State<CommentsState>,
    AuthIdentity(identity): AuthIdentity,
    Path(comment_id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<ApiResponse<Comment>> {
    let comment = state
        .service
        .update(identity.id, comment_id, &req.content)
        .await?;
    Ok(ApiResponse::ok(comment, "Comment updated successfully"))
}

/// DELETE /v1/comments/{comment_id} - Delete a comment (owner only)
#[utoipa::path(
    delete,
    path = "/v1/comments/{comment_id}",
    params(("comment_id" = Uuid, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = ApiResponse<Comment>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    State(state): State<CommentsState>,
    AuthIdentity(identity): AuthIdentity,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Comment>> {
    let comment = state.service.delete(identity.id, comment_id).await?;
    Ok(ApiResponse::ok(comment, "Comment deleted successfully"))
}
