// Comment service

use uuid::Uuid;

use vidhub_core::Comment;
use vidhub_storage::{CommentRow, CreateCommentRow, StorageBackend};

use crate::common::PageQuery;
use crate::error::{ApiError, ApiResult};
use crate::services::ensure_owner;

fn to_comment(row: CommentRow) -> Comment {
    Comment {
        id: row.id,
        owner_id: row.owner_id,
        video_id: row.video_id,
        content: row.content,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub struct CommentService {
    db: StorageBackend,
}

impl CommentService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    pub async fn post(&self, owner: Uuid, video_id: Uuid, content: &str) -> ApiResult<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::validation("Comment content is required"));
        }

        let video = self.db.get_video(video_id).await.map_err(|e| {
            tracing::error!("Failed to load video: {}", e);
            ApiError::upstream("Failed to post comment")
        })?;
        if video.is_none() {
            return Err(ApiError::not_found("Video not found"));
        }

        let row = self
            .db
            .create_comment(CreateCommentRow {
                owner_id: owner,
                video_id,
                content: content.to_string(),
            })
            .await
            .map_err(|e| {
                tracing::error!("Failed to create comment: {}", e);
                ApiError::upstream("Failed to post comment")
            })?;

        Ok(to_comment(row))
    }

    pub async fn list_for_video(
        &self,
        video_id: Uuid,
        page: &PageQuery,
    ) -> ApiResult<Vec<Comment>> {
        let video = self.db.get_video(video_id).await.map_err(|e| {
            tracing::error!("Failed to load video: {}", e);
            ApiError::upstream("Failed to list comments")
        })?;
        if video.is_none() {
            return Err(ApiError::not_found("Video not found"));
        }

        let (limit, offset) = page.limit_offset();
        let rows = self
            .db
            .list_comments_for_video(video_id, limit, offset)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list comments: {}", e);
                ApiError::upstream("Failed to list comments")
            })?;

        Ok(rows.into_iter().map(to_comment).collect())
    }

    pub async fn update(&self, caller: Uuid, id: Uuid, content: &str) -> ApiResult<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::validation("Comment content is required"));
        }

        let found = self.db.get_comment(id).await.map_err(|e| {
            tracing::error!("Failed to load comment: {}", e);
            ApiError::upstream("Failed to update comment")
        })?;
        ensure_owner(found, caller, "Comment")?;

        let row = self
            .db
            .update_comment(id, content)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update comment: {}", e);
                ApiError::upstream("Failed to update comment")
            })?
            .ok_or_else(|| ApiError::not_found("Comment not found"))?;

        Ok(to_comment(row))
    }

    pub async fn delete(&self, caller: Uuid, id: Uuid) -> ApiResult<Comment> {
        let found = self.db.get_comment(id).await.map_err(|e| {
            tracing::error!("Failed to load comment: {}", e);
            ApiError::upstream("Failed to delete comment")
        })?;
        let row = ensure_owner(found, caller, "Comment")?;

        let deleted = self.db.delete_comment(id).await.map_err(|e| {
            tracing::error!("Failed to delete comment: {}", e);
            ApiError::upstream("Failed to delete comment")
        })?;
        if !deleted {
            return Err(ApiError::not_found("Comment not found"));
        }

        Ok(to_comment(row))
    }
}
