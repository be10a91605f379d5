// Playlist service
//
// Membership has set semantics: adding an existing member is a no-op, as is
// removing an absent one.

use uuid::Uuid;

use vidhub_core::Playlist;
use vidhub_storage::{CreatePlaylistRow, PlaylistRow, StorageBackend, UpdatePlaylistRow};

use crate::error::{ApiError, ApiResult};
use crate::services::ensure_owner;

pub struct PlaylistService {
    db: StorageBackend,
}

impl PlaylistService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    async fn with_members(&self, row: PlaylistRow) -> ApiResult<Playlist> {
        let video_ids = self.db.playlist_video_ids(row.id).await.map_err(|e| {
            tracing::error!("Failed to load playlist members: {}", e);
            ApiError::upstream("Failed to load playlist")
        })?;

        Ok(Playlist {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            video_ids,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    pub async fn create(
        &self,
        owner: Uuid,
        name: &str,
        description: Option<String>,
    ) -> ApiResult<Playlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("Playlist name is required"));
        }

        let row = self
            .db
            .create_playlist(CreatePlaylistRow {
                owner_id: owner,
                name: name.to_string(),
                description,
            })
            .await
            .map_err(|e| {
                tracing::error!("Failed to create playlist: {}", e);
                ApiError::upstream("Failed to create playlist")
            })?;

        self.with_members(row).await
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<Playlist> {
        let row = self
            .db
            .get_playlist(id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load playlist: {}", e);
                ApiError::upstream("Failed to load playlist")
            })?
            .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

        self.with_members(row).await
    }

    pub async fn list_for_owner(&self, owner: Uuid) -> ApiResult<Vec<Playlist>> {
        let rows = self.db.list_playlists_for_owner(owner).await.map_err(|e| {
            tracing::error!("Failed to list playlists: {}", e);
            ApiError::upstream("Failed to list playlists")
        })?;

        let mut playlists = Vec::with_capacity(rows.len());
        for row in rows {
            playlists.push(self.with_members(row).await?);
        }
        Ok(playlists)
    }

    pub async fn update(
        &self,
        caller: Uuid,
        id: Uuid,
        input: UpdatePlaylistRow,
    ) -> ApiResult<Playlist> {
        if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ApiError::validation("Playlist name must not be empty"));
        }

        let found = self.db.get_playlist(id).await.map_err(|e| {
            tracing::error!("Failed to load playlist: {}", e);
            ApiError::upstream("Failed to update playlist")
        })?;
        ensure_owner(found, caller, "Playlist")?;

        let row = self
            .db
            .update_playlist(id, input)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update playlist: {}", e);
                ApiError::upstream("Failed to update playlist")
            })?
            .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

        self.with_members(row).await
    }

    pub async fn delete(&self, caller: Uuid, id: Uuid) -> ApiResult<Playlist> {
        let found = self.db.get_playlist(id).await.map_err(|e| {
            tracing::error!("Failed to load playlist: {}", e);
            ApiError::upstream("Failed to delete playlist")
        })?;
        let row = ensure_owner(found, caller, "Playlist")?;
        let playlist = self.with_members(row).await?;

        let deleted = self.db.delete_playlist(id).await.map_err(|e| {
            tracing::error!("Failed to delete playlist: {}", e);
            ApiError::upstream("Failed to delete playlist")
        })?;
        if !deleted {
            return Err(ApiError::not_found("Playlist not found"));
        }

        Ok(playlist)
    }

    pub async fn add_video(
        &self,
        caller: Uuid,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> ApiResult<Playlist> {
        let found = self.db.get_playlist(playlist_id).await.map_err(|e| {
            tracing::error!("Failed to load playlist: {}", e);
            ApiError::upstream("Failed to update playlist")
        })?;
        let row = ensure_owner(found, caller, "Playlist")?;

        let video = self.db.get_video(video_id).await.map_err(|e| {
            tracing::error!("Failed to load video: {}", e);
            ApiError::upstream("Failed to update playlist")
        })?;
        if video.is_none() {
            return Err(ApiError::not_found("Video not found"));
        }

        let added = self
            .db
            .add_playlist_video(playlist_id, video_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to add playlist member: {}", e);
                ApiError::upstream("Failed to update playlist")
            })?;
        if !added {
            tracing::debug!(playlist = %playlist_id, video = %video_id, "Video already in playlist");
        }

        self.with_members(row).await
    }

    pub async fn remove_video(
        &self,
        caller: Uuid,
        playlist_id: Uuid,
        video_id: Uuid,
    ) -> ApiResult<Playlist> {
        let found = self.db.get_playlist(playlist_id).await.map_err(|e| {
            tracing::error!("Failed to load playlist: {}", e);
            ApiError::upstream("Failed to update playlist")
        })?;
        let row = ensure_owner(found, caller, "Playlist")?;

        self.db
            .remove_playlist_video(playlist_id, video_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to remove playlist member: {}", e);
                ApiError::upstream("Failed to update playlist")
            })?;

        self.with_members(row).await
    }
}
