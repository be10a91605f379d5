// Database row models (internal, differ from public DTOs)
//
// Rows carry credential material (password_hash, refresh_token_hash) and
// media provider public ids; none of that crosses into vidhub-core types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Identities
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct IdentityRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub avatar_public_id: String,
    pub cover_url: Option<String>,
    pub cover_public_id: Option<String>,
    /// SHA-256 hex of the single active refresh token, if any.
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateIdentityRow {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub avatar_public_id: String,
    pub cover_url: Option<String>,
    pub cover_public_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateIdentityDetails {
    pub display_name: Option<String>,
    pub email: Option<String>,
}

// ============================================
// Videos
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct VideoRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_public_id: String,
    pub thumbnail_url: String,
    pub thumbnail_public_id: String,
    pub duration: f64,
    pub views: i64,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateVideoRow {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_public_id: String,
    pub thumbnail_url: String,
    pub thumbnail_public_id: String,
    pub duration: f64,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateVideoRow {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published: Option<bool>,
}

// ============================================
// Comments
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub video_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCommentRow {
    pub owner_id: Uuid,
    pub video_id: Uuid,
    pub content: String,
}

// ============================================
// Tweets
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct TweetRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTweetRow {
    pub owner_id: Uuid,
    pub content: String,
}

// ============================================
// Playlists
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct PlaylistRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreatePlaylistRow {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePlaylistRow {
    pub name: Option<String>,
    pub description: Option<String>,
}

// ============================================
// Watch history
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct WatchRow {
    pub identity_id: Uuid,
    pub video_id: Uuid,
    pub watched_at: DateTime<Utc>,
}
