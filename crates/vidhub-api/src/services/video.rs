// Video service: publishing through the media store, viewing, ownership-gated
// mutation, watch history

use std::sync::Arc;
use uuid::Uuid;

use vidhub_core::{Video, WatchEntry};
use vidhub_media::{MediaClient, MediaKind};
use vidhub_storage::{CreateVideoRow, StorageBackend, UpdateVideoRow, VideoRow};

use crate::common::PageQuery;
use crate::error::{ApiError, ApiResult};
use crate::services::ensure_owner;
use crate::upload::StagedFile;

pub fn to_video(row: VideoRow) -> Video {
    Video {
        id: row.id,
        owner_id: row.owner_id,
        title: row.title,
        description: row.description,
        video_url: row.video_url,
        thumbnail_url: row.thumbnail_url,
        duration: row.duration,
        views: row.views,
        published: row.published,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub struct VideoService {
    db: StorageBackend,
    media: Arc<MediaClient>,
}

impl VideoService {
    pub fn new(db: StorageBackend, media: Arc<MediaClient>) -> Self {
        Self { db, media }
    }

    /// Upload both assets and create the video record. If the thumbnail
    /// upload fails after the video succeeded, the orphaned video asset is
    /// released before the failure surfaces.
    pub async fn publish(
        &self,
        owner: Uuid,
        title: &str,
        description: &str,
        video_file: &StagedFile,
        thumbnail_file: &StagedFile,
    ) -> ApiResult<Video> {
        let video_asset = self.media.upload_staged(&video_file.path).await?;

        let thumbnail_asset = match self.media.upload_staged(&thumbnail_file.path).await {
            Ok(asset) => asset,
            Err(e) => {
                if let Err(cleanup) = self
                    .media
                    .delete(&[video_asset.public_id.clone()], MediaKind::Video)
                    .await
                {
                    tracing::warn!("Failed to release orphaned video asset: {}", cleanup);
                }
                return Err(e.into());
            }
        };

        let row = self
            .db
            .create_video(CreateVideoRow {
                owner_id: owner,
                title: title.to_string(),
                description: description.to_string(),
                video_url: video_asset.url,
                video_public_id: video_asset.public_id,
                thumbnail_url: thumbnail_asset.url,
                thumbnail_public_id: thumbnail_asset.public_id,
                duration: video_asset.duration.unwrap_or(0.0),
            })
            .await
            .map_err(|e| {
                tracing::error!("Failed to create video: {}", e);
                ApiError::upstream("Failed to create video")
            })?;

        Ok(to_video(row))
    }

    /// Fetch a video for a viewer, bumping the view counter and the viewer's
    /// watch history. Unpublished videos are visible to their owner only.
    pub async fn get_for_viewer(&self, id: Uuid, viewer: Uuid) -> ApiResult<Video> {
        let row = self
            .db
            .get_video(id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load video: {}", e);
                ApiError::upstream("Failed to load video")
            })?
            .ok_or_else(|| ApiError::not_found("Video not found"))?;

        if !row.published && row.owner_id != viewer {
            return Err(ApiError::not_found("Video not found"));
        }

        self.db.record_view(viewer, id).await.map_err(|e| {
            tracing::error!("Failed to record view: {}", e);
            ApiError::upstream("Failed to load video")
        })?;

        let mut video = to_video(row);
        video.views += 1;
        Ok(video)
    }

    pub async fn list(&self, page: &PageQuery) -> ApiResult<Vec<Video>> {
        let (limit, offset) = page.limit_offset();
        let rows = self.db.list_videos(limit, offset).await.map_err(|e| {
            tracing::error!("Failed to list videos: {}", e);
            ApiError::upstream("Failed to list videos")
        })?;

        Ok(rows.into_iter().map(to_video).collect())
    }

    pub async fn update(
        &self,
        caller: Uuid,
        id: Uuid,
        input: UpdateVideoRow,
    ) -> ApiResult<Video> {
        let found = self.db.get_video(id).await.map_err(|e| {
            tracing::error!("Failed to load video: {}", e);
            ApiError::upstream("Failed to update video")
        })?;
        ensure_owner(found, caller, "Video")?;

        let row = self
            .db
            .update_video(id, input)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update video: {}", e);
                ApiError::upstream("Failed to update video")
            })?
            .ok_or_else(|| ApiError::not_found("Video not found"))?;

        Ok(to_video(row))
    }

    /// Delete a video: release both remote assets, then drop the row.
    pub async fn delete(&self, caller: Uuid, id: Uuid) -> ApiResult<Video> {
        let found = self.db.get_video(id).await.map_err(|e| {
            tracing::error!("Failed to load video: {}", e);
            ApiError::upstream("Failed to delete video")
        })?;
        let row = ensure_owner(found, caller, "Video")?;

        self.media
            .delete(&[row.thumbnail_public_id.clone()], MediaKind::Image)
            .await?;
        self.media
            .delete(&[row.video_public_id.clone()], MediaKind::Video)
            .await?;

        let deleted = self.db.delete_video(id).await.map_err(|e| {
            tracing::error!("Failed to delete video: {}", e);
            ApiError::upstream("Failed to delete video")
        })?;
        if !deleted {
            return Err(ApiError::not_found("Video not found"));
        }

        Ok(to_video(row))
    }

    pub async fn watch_history(&self, identity_id: Uuid) -> ApiResult<Vec<WatchEntry>> {
        let rows = self.db.watch_history(identity_id).await.map_err(|e| {
            tracing::error!("Failed to load watch history: {}", e);
            ApiError::upstream("Failed to load watch history")
        })?;

        Ok(rows
            .into_iter()
            .map(|(video, watched_at)| WatchEntry {
                video: to_video(video),
                watched_at,
            })
            .collect())
    }
}
