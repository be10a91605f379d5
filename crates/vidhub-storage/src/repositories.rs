// Repository layer for PostgreSQL
//
// Ids are generated app-side as UUID v7 so rows sort by creation time.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::*;

const IDENTITY_COLUMNS: &str = "id, username, email, display_name, password_hash, avatar_url, \
     avatar_public_id, cover_url, cover_public_id, refresh_token_hash, created_at, updated_at";

const VIDEO_COLUMNS: &str = "id, owner_id, title, description, video_url, video_public_id, \
     thumbnail_url, thumbnail_public_id, duration, views, published, created_at, updated_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // ============================================
    // Identities
    // ============================================

    pub async fn create_identity(&self, input: CreateIdentityRow) -> Result<IdentityRow> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            INSERT INTO identities
                (id, username, email, display_name, password_hash,
                 avatar_url, avatar_public_id, cover_url, cover_public_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {IDENTITY_COLUMNS}
            "#,
        ))
        .bind(Uuid::now_v7())
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.display_name)
        .bind(&input.password_hash)
        .bind(&input.avatar_url)
        .bind(&input.avatar_public_id)
        .bind(&input.cover_url)
        .bind(&input.cover_public_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_identity(&self, id: Uuid) -> Result<Option<IdentityRow>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            SELECT {IDENTITY_COLUMNS}
            FROM identities
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find by username or email; either may be absent.
    pub async fn find_identity_by_login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<IdentityRow>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            SELECT {IDENTITY_COLUMNS}
            FROM identities
            WHERE ($1::text IS NOT NULL AND username = $1)
               OR ($2::text IS NOT NULL AND email = $2)
            LIMIT 1
            "#,
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_identity_details(
        &self,
        id: Uuid,
        input: UpdateIdentityDetails,
    ) -> Result<Option<IdentityRow>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            UPDATE identities
            SET
                display_name = COALESCE($2, display_name),
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {IDENTITY_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&input.display_name)
        .bind(&input.email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_identity_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE identities
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_identity_avatar(
        &self,
        id: Uuid,
        url: &str,
        public_id: &str,
    ) -> Result<Option<IdentityRow>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            UPDATE identities
            SET avatar_url = $2, avatar_public_id = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {IDENTITY_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(url)
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_identity_cover(
        &self,
        id: Uuid,
        url: &str,
        public_id: &str,
    ) -> Result<Option<IdentityRow>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            UPDATE identities
            SET cover_url = $2, cover_public_id = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {IDENTITY_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(url)
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Overwrite the stored refresh token hash (login issues, logout clears).
    pub async fn set_refresh_token(&self, id: Uuid, token_hash: Option<&str>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE identities
            SET refresh_token_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Rotate the refresh token, keyed on the previous hash so concurrent
    /// refresh calls for the same identity cannot both win.
    pub async fn rotate_refresh_token(
        &self,
        id: Uuid,
        old_hash: &str,
        new_hash: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE identities
            SET refresh_token_hash = $3, updated_at = NOW()
            WHERE id = $1 AND refresh_token_hash = $2
            "#,
        )
        .bind(id)
        .bind(old_hash)
        .bind(new_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the identity, returning the row so the caller can release
    /// externally stored media.
    pub async fn delete_identity(&self, id: Uuid) -> Result<Option<IdentityRow>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r#"
            DELETE FROM identities
            WHERE id = $1
            RETURNING {IDENTITY_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Videos
    // ============================================

    pub async fn create_video(&self, input: CreateVideoRow) -> Result<VideoRow> {
        let row = sqlx::query_as::<_, VideoRow>(&format!(
            r#"
            INSERT INTO videos
                (id, owner_id, title, description, video_url, video_public_id,
                 thumbnail_url, thumbnail_public_id, duration)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {VIDEO_COLUMNS}
            "#,
        ))
        .bind(Uuid::now_v7())
        .bind(input.owner_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.video_url)
        .bind(&input.video_public_id)
        .bind(&input.thumbnail_url)
        .bind(&input.thumbnail_public_id)
        .bind(input.duration)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_video(&self, id: Uuid) -> Result<Option<VideoRow>> {
        let row = sqlx::query_as::<_, VideoRow>(&format!(
            r#"
            SELECT {VIDEO_COLUMNS}
            FROM videos
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_videos(&self, limit: i64, offset: i64) -> Result<Vec<VideoRow>> {
        let rows = sqlx::query_as::<_, VideoRow>(&format!(
            r#"
            SELECT {VIDEO_COLUMNS}
            FROM videos
            WHERE published
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_videos_for_owner(&self, owner_id: Uuid) -> Result<Vec<VideoRow>> {
        let rows = sqlx::query_as::<_, VideoRow>(&format!(
            r#"
            SELECT {VIDEO_COLUMNS}
            FROM videos
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_video(&self, id: Uuid, input: UpdateVideoRow) -> Result<Option<VideoRow>> {
        let row = sqlx::query_as::<_, VideoRow>(&format!(
            r#"
            UPDATE videos
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                published = COALESCE($4, published),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {VIDEO_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.published)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_video(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Bump the view counter and upsert the caller's watch-history entry.
    pub async fn record_view(&self, identity_id: Uuid, video_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE videos SET views = views + 1 WHERE id = $1")
            .bind(video_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO watch_history (identity_id, video_id, watched_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (identity_id, video_id)
            DO UPDATE SET watched_at = NOW()
            "#,
        )
        .bind(identity_id)
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn watch_history(
        &self,
        identity_id: Uuid,
    ) -> Result<Vec<(VideoRow, DateTime<Utc>)>> {
        #[derive(sqlx::FromRow)]
        struct HistoryRow {
            #[sqlx(flatten)]
            video: VideoRow,
            watched_at: DateTime<Utc>,
        }

        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT v.id, v.owner_id, v.title, v.description, v.video_url,
                   v.video_public_id, v.thumbnail_url, v.thumbnail_public_id,
                   v.duration, v.views, v.published, v.created_at, v.updated_at,
                   w.watched_at
            FROM watch_history w
            JOIN videos v ON v.id = w.video_id
            WHERE w.identity_id = $1
            ORDER BY w.watched_at DESC
            "#,
        )
        .bind(identity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| (r.video, r.watched_at)).collect())
    }

    // ============================================
    // Comments
    // ============================================

    pub async fn create_comment(&self, input: CreateCommentRow) -> Result<CommentRow> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (id, owner_id, video_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, video_id, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.owner_id)
        .bind(input.video_id)
        .bind(&input.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_comment(&self, id: Uuid) -> Result<Option<CommentRow>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, owner_id, video_id, content, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_comments_for_video(
        &self,
        video_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentRow>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, owner_id, video_id, content, created_at, updated_at
            FROM comments
            WHERE video_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(video_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_comment(&self, id: Uuid, content: &str) -> Result<Option<CommentRow>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            UPDATE comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, video_id, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Tweets
    // ============================================

    pub async fn create_tweet(&self, input: CreateTweetRow) -> Result<TweetRow> {
        let row = sqlx::query_as::<_, TweetRow>(
            r#"
            INSERT INTO tweets (id, owner_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.owner_id)
        .bind(&input.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_tweet(&self, id: Uuid) -> Result<Option<TweetRow>> {
        let row = sqlx::query_as::<_, TweetRow>(
            r#"
            SELECT id, owner_id, content, created_at, updated_at
            FROM tweets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_tweets_for_owner(&self, owner_id: Uuid) -> Result<Vec<TweetRow>> {
        let rows = sqlx::query_as::<_, TweetRow>(
            r#"
            SELECT id, owner_id, content, created_at, updated_at
            FROM tweets
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_tweet(&self, id: Uuid, content: &str) -> Result<Option<TweetRow>> {
        let row = sqlx::query_as::<_, TweetRow>(
            r#"
            UPDATE tweets
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_tweet(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Playlists
    // ============================================

    pub async fn create_playlist(&self, input: CreatePlaylistRow) -> Result<PlaylistRow> {
        let row = sqlx::query_as::<_, PlaylistRow>(
            r#"
            INSERT INTO playlists (id, owner_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, description, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.owner_id)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_playlist(&self, id: Uuid) -> Result<Option<PlaylistRow>> {
        let row = sqlx::query_as::<_, PlaylistRow>(
            r#"
            SELECT id, owner_id, name, description, created_at, updated_at
            FROM playlists
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_playlists_for_owner(&self, owner_id: Uuid) -> Result<Vec<PlaylistRow>> {
        let rows = sqlx::query_as::<_, PlaylistRow>(
            r#"
            SELECT id, owner_id, name, description, created_at, updated_at
            FROM playlists
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_playlist(
        &self,
        id: Uuid,
        input: UpdatePlaylistRow,
    ) -> Result<Option<PlaylistRow>> {
        let row = sqlx::query_as::<_, PlaylistRow>(
            r#"
            UPDATE playlists
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, name, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_playlist(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn playlist_video_ids(&self, playlist_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT video_id
            FROM playlist_videos
            WHERE playlist_id = $1
            ORDER BY added_at
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Add a video to a playlist. Returns false if it was already a member.
    pub async fn add_playlist_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO playlist_videos (playlist_id, video_id)
            VALUES ($1, $2)
            ON CONFLICT (playlist_id, video_id) DO NOTHING
            "#,
        )
        .bind(playlist_id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_playlist_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM playlist_videos
            WHERE playlist_id = $1 AND video_id = $2
            "#,
        )
        .bind(playlist_id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
