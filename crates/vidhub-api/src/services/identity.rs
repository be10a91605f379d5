// Identity service: account detail and media updates, account deletion

use std::sync::Arc;
use uuid::Uuid;

use vidhub_core::Identity;
use vidhub_media::{MediaClient, MediaKind};
use vidhub_storage::{IdentityRow, StorageBackend, UpdateIdentityDetails};

use crate::error::{ApiError, ApiResult};
use crate::upload::StagedFile;

/// Project a row to the client-facing identity, dropping credential fields.
pub fn to_identity(row: IdentityRow) -> Identity {
    Identity {
        id: row.id,
        username: row.username,
        email: row.email,
        display_name: row.display_name,
        avatar_url: row.avatar_url,
        cover_url: row.cover_url,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub struct IdentityService {
    db: StorageBackend,
    media: Arc<MediaClient>,
}

impl IdentityService {
    pub fn new(db: StorageBackend, media: Arc<MediaClient>) -> Self {
        Self { db, media }
    }

    /// Update display name and/or email.
    pub async fn update_details(
        &self,
        id: Uuid,
        display_name: Option<String>,
        email: Option<String>,
    ) -> ApiResult<Identity> {
        let display_name = match display_name.map(|d| d.trim().to_string()) {
            Some(d) if d.is_empty() => {
                return Err(ApiError::validation("Display name must not be empty"))
            }
            other => other,
        };
        let email = match email.map(|e| e.trim().to_lowercase()) {
            Some(e) if e.is_empty() => return Err(ApiError::validation("Email must not be empty")),
            other => other,
        };

        // A new email must not collide with another account.
        if let Some(email) = &email {
            let existing = self
                .db
                .find_identity_by_login(None, Some(email))
                .await
                .map_err(|e| {
                    tracing::error!("Identity lookup failed: {}", e);
                    ApiError::upstream("Failed to update account")
                })?;
            if existing.is_some_and(|other| other.id != id) {
                return Err(ApiError::conflict("Email already in use"));
            }
        }

        let row = self
            .db
            .update_identity_details(
                id,
                UpdateIdentityDetails {
                    display_name,
                    email,
                },
            )
            .await
            .map_err(|e| {
                tracing::error!("Failed to update identity details: {}", e);
                ApiError::upstream("Failed to update account")
            })?
            .ok_or_else(|| ApiError::not_found("Identity not found"))?;

        Ok(to_identity(row))
    }

    /// Replace the avatar: upload the staged file, persist, then release the
    /// previous asset. The staged file is removed whatever happens.
    pub async fn change_avatar(&self, id: Uuid, staged: &StagedFile) -> ApiResult<Identity> {
        let old = self
            .db
            .get_identity(id)
            .await
            .map_err(|e| {
                tracing::error!("Identity lookup failed: {}", e);
                ApiError::upstream("Failed to update avatar")
            })?
            .ok_or_else(|| ApiError::not_found("Identity not found"))?;

        let asset = self.media.upload_staged(&staged.path).await?;

        let row = self
            .db
            .update_identity_avatar(id, &asset.url, &asset.public_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to persist avatar: {}", e);
                ApiError::upstream("Failed to update avatar")
            })?
            .ok_or_else(|| ApiError::not_found("Identity not found"))?;

        // The new avatar is live; a failed release only leaks the old asset.
        if let Err(e) = self
            .media
            .delete(&[old.avatar_public_id], MediaKind::Image)
            .await
        {
            tracing::warn!("Failed to release replaced avatar asset: {}", e);
        }

        Ok(to_identity(row))
    }

    /// Replace the cover image, releasing the previous asset if there was one.
    pub async fn change_cover(&self, id: Uuid, staged: &StagedFile) -> ApiResult<Identity> {
        let old = self
            .db
            .get_identity(id)
            .await
            .map_err(|e| {
                tracing::error!("Identity lookup failed: {}", e);
                ApiError::upstream("Failed to update cover image")
            })?
            .ok_or_else(|| ApiError::not_found("Identity not found"))?;

        let asset = self.media.upload_staged(&staged.path).await?;

        let row = self
            .db
            .update_identity_cover(id, &asset.url, &asset.public_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to persist cover image: {}", e);
                ApiError::upstream("Failed to update cover image")
            })?
            .ok_or_else(|| ApiError::not_found("Identity not found"))?;

        if let Some(old_cover) = old.cover_public_id {
            if let Err(e) = self.media.delete(&[old_cover], MediaKind::Image).await {
                tracing::warn!("Failed to release replaced cover asset: {}", e);
            }
        }

        Ok(to_identity(row))
    }

    /// Delete the account. All externally stored media (avatar, cover, every
    /// owned video and thumbnail) is released first; if the media store
    /// refuses, the account stays and the request fails as retryable.
    pub async fn delete_account(&self, id: Uuid) -> ApiResult<()> {
        let row = self
            .db
            .get_identity(id)
            .await
            .map_err(|e| {
                tracing::error!("Identity lookup failed: {}", e);
                ApiError::upstream("Failed to delete account")
            })?
            .ok_or_else(|| ApiError::not_found("Identity not found"))?;

        let videos = self.db.list_videos_for_owner(id).await.map_err(|e| {
            tracing::error!("Failed to list owned videos: {}", e);
            ApiError::upstream("Failed to delete account")
        })?;

        let mut image_ids = vec![row.avatar_public_id];
        if let Some(cover) = row.cover_public_id {
            image_ids.push(cover);
        }
        let mut video_ids = Vec::new();
        for video in videos {
            image_ids.push(video.thumbnail_public_id);
            video_ids.push(video.video_public_id);
        }

        self.media.delete(&image_ids, MediaKind::Image).await?;
        self.media.delete(&video_ids, MediaKind::Video).await?;

        self.db
            .delete_identity(id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete identity: {}", e);
                ApiError::upstream("Failed to delete account")
            })?
            .ok_or_else(|| ApiError::not_found("Identity not found"))?;

        Ok(())
    }
}
