// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: UUIDs generated via uuid v7 (time-ordered)
//
// Provides a PostgreSQL-compatible API backed by in-memory maps, allowing the
// server to run without a database for development, and the test suite to run
// hermetic. Cascading deletes mirror the FK constraints in the migrations.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::*;

/// In-memory database for dev mode.
/// All data is stored in memory and lost on restart.
#[derive(Default)]
pub struct InMemoryDatabase {
    identities: RwLock<HashMap<Uuid, IdentityRow>>,
    videos: RwLock<HashMap<Uuid, VideoRow>>,
    comments: RwLock<HashMap<Uuid, CommentRow>>,
    tweets: RwLock<HashMap<Uuid, TweetRow>>,
    playlists: RwLock<HashMap<Uuid, PlaylistRow>>,
    // (playlist_id, video_id) -> added_at
    playlist_videos: RwLock<HashMap<(Uuid, Uuid), DateTime<Utc>>>,
    // (identity_id, video_id) -> watched_at
    watch_history: RwLock<HashMap<(Uuid, Uuid), DateTime<Utc>>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    // ============================================
    // Identities
    // ============================================

    pub async fn create_identity(&self, input: CreateIdentityRow) -> Result<IdentityRow> {
        let mut identities = self.identities.write();

        // Mirror the unique indexes on username and email.
        if identities
            .values()
            .any(|i| i.username == input.username || i.email == input.email)
        {
            return Err(anyhow!("identity username or email already exists"));
        }

        let now = Self::now();
        let id = Uuid::now_v7();
        let row = IdentityRow {
            id,
            username: input.username,
            email: input.email,
            display_name: input.display_name,
            password_hash: input.password_hash,
            avatar_url: input.avatar_url,
            avatar_public_id: input.avatar_public_id,
            cover_url: input.cover_url,
            cover_public_id: input.cover_public_id,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        };
        identities.insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_identity(&self, id: Uuid) -> Result<Option<IdentityRow>> {
        Ok(self.identities.read().get(&id).cloned())
    }

    pub async fn find_identity_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<IdentityRow>> {
        Ok(self
            .identities
            .read()
            .values()
            .find(|i| {
                username.is_some_and(|u| i.username == u) || email.is_some_and(|e| i.email == e)
            })
            .cloned())
    }

    pub async fn update_identity_details(
        &self,
        id: Uuid,
        input: UpdateIdentityDetails,
    ) -> Result<Option<IdentityRow>> {
        let mut identities = self.identities.write();
        let Some(row) = identities.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(display_name) = input.display_name {
            row.display_name = display_name;
        }
        if let Some(email) = input.email {
            row.email = email;
        }
        row.updated_at = Self::now();
        Ok(Some(row.clone()))
    }

    pub async fn update_identity_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let mut identities = self.identities.write();
        let Some(row) = identities.get_mut(&id) else {
            return Ok(false);
        };
        row.password_hash = password_hash.to_string();
        row.updated_at = Self::now();
        Ok(true)
    }

    pub async fn update_identity_avatar(
        &self,
        id: Uuid,
        url: &str,
        public_id: &str,
    ) -> Result<Option<IdentityRow>> {
        let mut identities = self.identities.write();
        let Some(row) = identities.get_mut(&id) else {
            return Ok(None);
        };
        row.avatar_url = url.to_string();
        row.avatar_public_id = public_id.to_string();
        row.updated_at = Self::now();
        Ok(Some(row.clone()))
    }

    pub async fn update_identity_cover(
        &self,
        id: Uuid,
        url: &str,
        public_id: &str,
    ) -> Result<Option<IdentityRow>> {
        let mut identities = self.identities.write();
        let Some(row) = identities.get_mut(&id) else {
            return Ok(None);
        };
        row.cover_url = Some(url.to_string());
        row.cover_public_id = Some(public_id.to_string());
        row.updated_at = Self::now();
        Ok(Some(row.clone()))
    }

    pub async fn set_refresh_token(&self, id: Uuid, token_hash: Option<&str>) -> Result<bool> {
        let mut identities = self.identities.write();
        let Some(row) = identities.get_mut(&id) else {
            return Ok(false);
        };
        row.refresh_token_hash = token_hash.map(str::to_string);
        row.updated_at = Self::now();
        Ok(true)
    }

    pub async fn rotate_refresh_token(
        &self,
        id: Uuid,
        old_hash: &str,
        new_hash: &str,
    ) -> Result<bool> {
        let mut identities = self.identities.write();
        let Some(row) = identities.get_mut(&id) else {
            return Ok(false);
        };
        if row.refresh_token_hash.as_deref() != Some(old_hash) {
            return Ok(false);
        }
        row.refresh_token_hash = Some(new_hash.to_string());
        row.updated_at = Self::now();
        Ok(true)
    }

    pub async fn delete_identity(&self, id: Uuid) -> Result<Option<IdentityRow>> {
        let Some(row) = self.identities.write().remove(&id) else {
            return Ok(None);
        };

        // Cascade as the FK constraints would.
        let video_ids: Vec<Uuid> = {
            let mut videos = self.videos.write();
            let ids: Vec<Uuid> = videos
                .values()
                .filter(|v| v.owner_id == id)
                .map(|v| v.id)
                .collect();
            for vid in &ids {
                videos.remove(vid);
            }
            ids
        };
        self.comments
            .write()
            .retain(|_, c| c.owner_id != id && !video_ids.contains(&c.video_id));
        self.tweets.write().retain(|_, t| t.owner_id != id);
        let playlist_ids: Vec<Uuid> = {
            let mut playlists = self.playlists.write();
            let ids: Vec<Uuid> = playlists
                .values()
                .filter(|p| p.owner_id == id)
                .map(|p| p.id)
                .collect();
            for pid in &ids {
                playlists.remove(pid);
            }
            ids
        };
        self.playlist_videos
            .write()
            .retain(|(pid, vid), _| !playlist_ids.contains(pid) && !video_ids.contains(vid));
        self.watch_history
            .write()
            .retain(|(iid, vid), _| *iid != id && !video_ids.contains(vid));

        Ok(Some(row))
    }

    // ============================================
    // Videos
    // ============================================

    pub async fn create_video(&self, input: CreateVideoRow) -> Result<VideoRow> {
        let now = Self::now();
        let id = Uuid::now_v7();
        let row = VideoRow {
            id,
            owner_id: input.owner_id,
            title: input.title,
            description: input.description,
            video_url: input.video_url,
            video_public_id: input.video_public_id,
            thumbnail_url: input.thumbnail_url,
            thumbnail_public_id: input.thumbnail_public_id,
            duration: input.duration,
            views: 0,
            published: true,
            created_at: now,
            updated_at: now,
        };
        self.videos.write().insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_video(&self, id: Uuid) -> Result<Option<VideoRow>> {
        Ok(self.videos.read().get(&id).cloned())
    }

    pub async fn list_videos(&self, limit: i64, offset: i64) -> Result<Vec<VideoRow>> {
        let mut rows: Vec<VideoRow> = self
            .videos
            .read()
            .values()
            .filter(|v| v.published)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    pub async fn list_videos_for_owner(&self, owner_id: Uuid) -> Result<Vec<VideoRow>> {
        let mut rows: Vec<VideoRow> = self
            .videos
            .read()
            .values()
            .filter(|v| v.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub async fn update_video(&self, id: Uuid, input: UpdateVideoRow) -> Result<Option<VideoRow>> {
        let mut videos = self.videos.write();
        let Some(row) = videos.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = input.title {
            row.title = title;
        }
        if let Some(description) = input.description {
            row.description = description;
        }
        if let Some(published) = input.published {
            row.published = published;
        }
        row.updated_at = Self::now();
        Ok(Some(row.clone()))
    }

    pub async fn delete_video(&self, id: Uuid) -> Result<bool> {
        let removed = self.videos.write().remove(&id).is_some();
        if removed {
            self.comments.write().retain(|_, c| c.video_id != id);
            self.playlist_videos.write().retain(|(_, vid), _| *vid != id);
            self.watch_history.write().retain(|(_, vid), _| *vid != id);
        }
        Ok(removed)
    }

    pub async fn record_view(&self, identity_id: Uuid, video_id: Uuid) -> Result<()> {
        if let Some(row) = self.videos.write().get_mut(&video_id) {
            row.views += 1;
        }
        self.watch_history
            .write()
            .insert((identity_id, video_id), Self::now());
        Ok(())
    }

    pub async fn watch_history(
        &self,
        identity_id: Uuid,
    ) -> Result<Vec<(VideoRow, DateTime<Utc>)>> {
        let videos = self.videos.read();
        let mut rows: Vec<(VideoRow, DateTime<Utc>)> = self
            .watch_history
            .read()
            .iter()
            .filter(|((iid, _), _)| *iid == identity_id)
            .filter_map(|((_, vid), at)| videos.get(vid).cloned().map(|v| (v, *at)))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(rows)
    }

    // ============================================
    // Comments
    // ============================================

    pub async fn create_comment(&self, input: CreateCommentRow) -> Result<CommentRow> {
        let now = Self::now();
        let id = Uuid::now_v7();
        let row = CommentRow {
            id,
            owner_id: input.owner_id,
            video_id: input.video_id,
            content: input.content,
            created_at: now,
            updated_at: now,
        };
        self.comments.write().insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_comment(&self, id: Uuid) -> Result<Option<CommentRow>> {
        Ok(self.comments.read().get(&id).cloned())
    }

    pub async fn list_comments_for_video(
        &self,
        video_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentRow>> {
        let mut rows: Vec<CommentRow> = self
            .comments
            .read()
            .values()
            .filter(|c| c.video_id == video_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    pub async fn update_comment(&self, id: Uuid, content: &str) -> Result<Option<CommentRow>> {
        let mut comments = self.comments.write();
        let Some(row) = comments.get_mut(&id) else {
            return Ok(None);
        };
        row.content = content.to_string();
        row.updated_at = Self::now();
        Ok(Some(row.clone()))
    }

    pub async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        Ok(self.comments.write().remove(&id).is_some())
    }

    // ============================================
    // Tweets
    // ============================================

    pub async fn create_tweet(&self, input: CreateTweetRow) -> Result<TweetRow> {
        let now = Self::now();
        let id = Uuid::now_v7();
        let row = TweetRow {
            id,
            owner_id: input.owner_id,
            content: input.content,
            created_at: now,
            updated_at: now,
        };
        self.tweets.write().insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_tweet(&self, id: Uuid) -> Result<Option<TweetRow>> {
        Ok(self.tweets.read().get(&id).cloned())
    }

    pub async fn list_tweets_for_owner(&self, owner_id: Uuid) -> Result<Vec<TweetRow>> {
        let mut rows: Vec<TweetRow> = self
            .tweets
            .read()
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub async fn update_tweet(&self, id: Uuid, content: &str) -> Result<Option<TweetRow>> {
        let mut tweets = self.tweets.write();
        let Some(row) = tweets.get_mut(&id) else {
            return Ok(None);
        };
        row.content = content.to_string();
        row.updated_at = Self::now();
        Ok(Some(row.clone()))
    }

    pub async fn delete_tweet(&self, id: Uuid) -> Result<bool> {
        Ok(self.tweets.write().remove(&id).is_some())
    }

    // ============================================
    // Playlists
    // ============================================

    pub async fn create_playlist(&self, input: CreatePlaylistRow) -> Result<PlaylistRow> {
        let now = Self::now();
        let id = Uuid::now_v7();
        let row = PlaylistRow {
            id,
            owner_id: input.owner_id,
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        self.playlists.write().insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_playlist(&self, id: Uuid) -> Result<Option<PlaylistRow>> {
        Ok(self.playlists.read().get(&id).cloned())
    }

    pub async fn list_playlists_for_owner(&self, owner_id: Uuid) -> Result<Vec<PlaylistRow>> {
        let mut rows: Vec<PlaylistRow> = self
            .playlists
            .read()
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub async fn update_playlist(
        &self,
        id: Uuid,
        input: UpdatePlaylistRow,
    ) -> Result<Option<PlaylistRow>> {
        let mut playlists = self.playlists.write();
        let Some(row) = playlists.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = input.name {
            row.name = name;
        }
        if let Some(description) = input.description {
            row.description = Some(description);
        }
        row.updated_at = Self::now();
        Ok(Some(row.clone()))
    }

    pub async fn delete_playlist(&self, id: Uuid) -> Result<bool> {
        let removed = self.playlists.write().remove(&id).is_some();
        if removed {
            self.playlist_videos.write().retain(|(pid, _), _| *pid != id);
        }
        Ok(removed)
    }

    pub async fn playlist_video_ids(&self, playlist_id: Uuid) -> Result<Vec<Uuid>> {
        let mut members: Vec<(Uuid, DateTime<Utc>)> = self
            .playlist_videos
            .read()
            .iter()
            .filter(|((pid, _), _)| *pid == playlist_id)
            .map(|((_, vid), at)| (*vid, *at))
            .collect();
        members.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(members.into_iter().map(|(vid, _)| vid).collect())
    }

    pub async fn add_playlist_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let mut members = self.playlist_videos.write();
        if members.contains_key(&(playlist_id, video_id)) {
            return Ok(false);
        }
        members.insert((playlist_id, video_id), Self::now());
        Ok(true)
    }

    pub async fn remove_playlist_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        Ok(self
            .playlist_videos
            .write()
            .remove(&(playlist_id, video_id))
            .is_some())
    }
}
