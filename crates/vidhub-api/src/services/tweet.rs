// Tweet service

use uuid::Uuid;

use vidhub_core::Tweet;
use vidhub_storage::{CreateTweetRow, StorageBackend, TweetRow};

use crate::error::{ApiError, ApiResult};
use crate::services::ensure_owner;

fn to_tweet(row: TweetRow) -> Tweet {
    Tweet {
        id: row.id,
        owner_id: row.owner_id,
        content: row.content,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub struct TweetService {
    db: StorageBackend,
}

impl TweetService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner: Uuid, content: &str) -> ApiResult<Tweet> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::validation("Tweet content is required"));
        }

        let row = self
            .db
            .create_tweet(CreateTweetRow {
                owner_id: owner,
                content: content.to_string(),
            })
            .await
            .map_err(|e| {
                tracing::error!("Failed to create tweet: {}", e);
                ApiError::upstream("Failed to create tweet")
            })?;

        Ok(to_tweet(row))
    }

    pub async fn list_for_owner(&self, owner: Uuid) -> ApiResult<Vec<Tweet>> {
        let rows = self.db.list_tweets_for_owner(owner).await.map_err(|e| {
            tracing::error!("Failed to list tweets: {}", e);
            ApiError::upstream("Failed to list tweets")
        })?;

        Ok(rows.into_iter().map(to_tweet).collect())
    }

    pub async fn update(&self, caller: Uuid, id: Uuid, content: &str) -> ApiResult<Tweet> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::validation("Tweet content is required"));
        }

        let found = self.db.get_tweet(id).await.map_err(|e| {
            tracing::error!("Failed to load tweet: {}", e);
            ApiError::upstream("Failed to update tweet")
        })?;
        ensure_owner(found, caller, "Tweet")?;

        let row = self
            .db
            .update_tweet(id, content)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update tweet: {}", e);
                ApiError::upstream("Failed to update tweet")
            })?
            .ok_or_else(|| ApiError::not_found("Tweet not found"))?;

        Ok(to_tweet(row))
    }

    pub async fn delete(&self, caller: Uuid, id: Uuid) -> ApiResult<Tweet> {
        let found = self.db.get_tweet(id).await.map_err(|e| {
            tracing::error!("Failed to load tweet: {}", e);
            ApiError::upstream("Failed to delete tweet")
        })?;
        let row = ensure_owner(found, caller, "Tweet")?;

        let deleted = self.db.delete_tweet(id).await.map_err(|e| {
            tracing::error!("Failed to delete tweet: {}", e);
            ApiError::upstream("Failed to delete tweet")
        })?;
        if !deleted {
            return Err(ApiError::not_found("Tweet not found"));
        }

        Ok(to_tweet(row))
    }
}
