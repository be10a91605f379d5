// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::memory::InMemoryDatabase;
use crate::models::*;
use crate::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory.
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL.
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend.
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Check if this is dev mode (in-memory).
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    /// Get the PostgreSQL pool if using the PostgreSQL backend.
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(db) => Some(db.pool()),
            Self::InMemory(_) => None,
        }
    }

    // ============================================
    // Identities
    // ============================================

    pub async fn create_identity(&self, input: CreateIdentityRow) -> Result<IdentityRow> {
        match self {
            Self::Postgres(db) => db.create_identity(input).await,
            Self::InMemory(db) => db.create_identity(input).await,
        }
    }

    pub async fn get_identity(&self, id: Uuid) -> Result<Option<IdentityRow>> {
        match self {
            Self::Postgres(db) => db.get_identity(id).await,
            Self::InMemory(db) => db.get_identity(id).await,
        }
    }

    pub async fn find_identity_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<IdentityRow>> {
        match self {
            Self::Postgres(db) => db.find_identity_by_login(username, email).await,
            Self::InMemory(db) => db.find_identity_by_login(username, email).await,
        }
    }

    pub async fn update_identity_details(
        &self,
        id: Uuid,
        input: UpdateIdentityDetails,
    ) -> Result<Option<IdentityRow>> {
        match self {
            Self::Postgres(db) => db.update_identity_details(id, input).await,
            Self::InMemory(db) => db.update_identity_details(id, input).await,
        }
    }

    pub async fn update_identity_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.update_identity_password(id, password_hash).await,
            Self::InMemory(db) => db.update_identity_password(id, password_hash).await,
        }
    }

    pub async fn update_identity_avatar(
        &self,
        id: Uuid,
        url: &str,
        public_id: &str,
    ) -> Result<Option<IdentityRow>> {
        match self {
            Self::Postgres(db) => db.update_identity_avatar(id, url, public_id).await,
            Self::InMemory(db) => db.update_identity_avatar(id, url, public_id).await,
        }
    }

    pub async fn update_identity_cover(
        &self,
        id: Uuid,
        url: &str,
        public_id: &str,
    ) -> Result<Option<IdentityRow>> {
        match self {
            Self::Postgres(db) => db.update_identity_cover(id, url, public_id).await,
            Self::InMemory(db) => db.update_identity_cover(id, url, public_id).await,
        }
    }

    pub async fn set_refresh_token(&self, id: Uuid, token_hash: Option<&str>) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.set_refresh_token(id, token_hash).await,
            Self::InMemory(db) => db.set_refresh_token(id, token_hash).await,
        }
    }

    pub async fn rotate_refresh_token(
        &self,
        id: Uuid,
        old_hash: &str,
        new_hash: &str,
    ) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.rotate_refresh_token(id, old_hash, new_hash).await,
            Self::InMemory(db) => db.rotate_refresh_token(id, old_hash, new_hash).await,
        }
    }

    pub async fn delete_identity(&self, id: Uuid) -> Result<Option<IdentityRow>> {
        match self {
            Self::Postgres(db) => db.delete_identity(id).await,
            Self::InMemory(db) => db.delete_identity(id).await,
        }
    }

    // ============================================
    // Videos
    // ============================================

    pub async fn create_video(&self, input: CreateVideoRow) -> Result<VideoRow> {
        match self {
            Self::Postgres(db) => db.create_video(input).await,
            Self::InMemory(db) => db.create_video(input).await,
        }
    }

    pub async fn get_video(&self, id: Uuid) -> Result<Option<VideoRow>> {
        match self {
            Self::Postgres(db) => db.get_video(id).await,
            Self::InMemory(db) => db.get_video(id).await,
        }
    }

    pub async fn list_videos(&self, limit: i64, offset: i64) -> Result<Vec<VideoRow>> {
        match self {
            Self::Postgres(db) => db.list_videos(limit, offset).await,
            Self::InMemory(db) => db.list_videos(limit, offset).await,
        }
    }

    pub async fn list_videos_for_owner(&self, owner_id: Uuid) -> Result<Vec<VideoRow>> {
        match self {
            Self::Postgres(db) => db.list_videos_for_owner(owner_id).await,
            Self::InMemory(db) => db.list_videos_for_owner(owner_id).await,
        }
    }

    pub async fn update_video(&self, id: Uuid, input: UpdateVideoRow) -> Result<Option<VideoRow>> {
        match self {
            Self::Postgres(db) => db.update_video(id, input).await,
            Self::InMemory(db) => db.update_video(id, input).await,
        }
    }

    pub async fn delete_video(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_video(id).await,
            Self::InMemory(db) => db.delete_video(id).await,
        }
    }

    pub async fn record_view(&self, identity_id: Uuid, video_id: Uuid) -> Result<()> {
        match self {
            Self::Postgres(db) => db.record_view(identity_id, video_id).await,
            Self::InMemory(db) => db.record_view(identity_id, video_id).await,
        }
    }

    pub async fn watch_history(
        &self,
        identity_id: Uuid,
    ) -> Result<Vec<(VideoRow, DateTime<Utc>)>> {
        match self {
            Self::Postgres(db) => db.watch_history(identity_id).await,
            Self::InMemory(db) => db.watch_history(identity_id).await,
        }
    }

    // ============================================
    // Comments
    // ============================================

    pub async fn create_comment(&self, input: CreateCommentRow) -> Result<CommentRow> {
        match self {
            Self::Postgres(db) => db.create_comment(input).await,
            Self::InMemory(db) => db.create_comment(input).await,
        }
    }

    pub async fn get_comment(&self, id: Uuid) -> Result<Option<CommentRow>> {
        match self {
            Self::Postgres(db) => db.get_comment(id).await,
            Self::InMemory(db) => db.get_comment(id).await,
        }
    }

    pub async fn list_comments_for_video(
        &self,
        video_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentRow>> {
        match self {
            Self::Postgres(db) => db.list_comments_for_video(video_id, limit, offset).await,
            Self::InMemory(db) => db.list_comments_for_video(video_id, limit, offset).await,
        }
    }

    pub async fn update_comment(&self, id: Uuid, content: &str) -> Result<Option<CommentRow>> {
        match self {
            Self::Postgres(db) => db.update_comment(id, content).await,
            Self::InMemory(db) => db.update_comment(id, content).await,
        }
    }

    pub async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_comment(id).await,
            Self::InMemory(db) => db.delete_comment(id).await,
        }
    }

    // ============================================
    // Tweets
    // ============================================

    pub async fn create_tweet(&self, input: CreateTweetRow) -> Result<TweetRow> {
        match self {
            Self::Postgres(db) => db.create_tweet(input).await,
            Self::InMemory(db) => db.create_tweet(input).await,
        }
    }

    pub async fn get_tweet(&self, id: Uuid) -> Result<Option<TweetRow>> {
        match self {
            Self::Postgres(db) => db.get_tweet(id).await,
            Self::InMemory(db) => db.get_tweet(id).await,
        }
    }

    pub async fn list_tweets_for_owner(&self, owner_id: Uuid) -> Result<Vec<TweetRow>> {
        match self {
            Self::Postgres(db) => db.list_tweets_for_owner(owner_id).await,
            Self::InMemory(db) => db.list_tweets_for_owner(owner_id).await,
        }
    }

    pub async fn update_tweet(&self, id: Uuid, content: &str) -> Result<Option<TweetRow>> {
        match self {
            Self::Postgres(db) => db.update_tweet(id, content).await,
            Self::InMemory(db) => db.update_tweet(id, content).await,
        }
    }

    pub async fn delete_tweet(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_tweet(id).await,
            Self::InMemory(db) => db.delete_tweet(id).await,
        }
    }

    // ============================================
    // Playlists
    // ============================================

    pub async fn create_playlist(&self, input: CreatePlaylistRow) -> Result<PlaylistRow> {
        match self {
            Self::Postgres(db) => db.create_playlist(input).await,
            Self::InMemory(db) => db.create_playlist(input).await,
        }
    }

    pub async fn get_playlist(&self, id: Uuid) -> Result<Option<PlaylistRow>> {
        match self {
            Self::Postgres(db) => db.get_playlist(id).await,
            Self::InMemory(db) => db.get_playlist(id).await,
        }
    }

    pub async fn list_playlists_for_owner(&self, owner_id: Uuid) -> Result<Vec<PlaylistRow>> {
        match self {
            Self::Postgres(db) => db.list_playlists_for_owner(owner_id).await,
            Self::InMemory(db) => db.list_playlists_for_owner(owner_id).await,
        }
    }

    pub async fn update_playlist(
        &self,
        id: Uuid,
        input: UpdatePlaylistRow,
    ) -> Result<Option<PlaylistRow>> {
        match self {
            Self::Postgres(db) => db.update_playlist(id, input).await,
            Self::InMemory(db) => db.update_playlist(id, input).await,
        }
    }

    pub async fn delete_playlist(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_playlist(id).await,
            Self::InMemory(db) => db.delete_playlist(id).await,
        }
    }

    pub async fn playlist_video_ids(&self, playlist_id: Uuid) -> Result<Vec<Uuid>> {
        match self {
            Self::Postgres(db) => db.playlist_video_ids(playlist_id).await,
            Self::InMemory(db) => db.playlist_video_ids(playlist_id).await,
        }
    }

    pub async fn add_playlist_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.add_playlist_video(playlist_id, video_id).await,
            Self::InMemory(db) => db.add_playlist_video(playlist_id, video_id).await,
        }
    }

    pub async fn remove_playlist_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.remove_playlist_video(playlist_id, video_id).await,
            Self::InMemory(db) => db.remove_playlist_video(playlist_id, video_id).await,
        }
    }
}
