// Tweet HTTP routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{patch, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use vidhub_core::Tweet;

use crate::auth::middleware::{AuthIdentity, AuthState, FromRef};
use crate::common::ApiResponse;
use crate::error::ApiResult;
use crate::services::TweetService;

/// App state for tweet routes
#[derive(Clone)]
pub struct TweetsState {
    pub service: Arc<TweetService>,
    pub auth: AuthState,
}

impl FromRef<TweetsState> for AuthState {
    fn from_ref(input: &TweetsState) -> Self {
        input.auth.clone()
    }
}

/// Tweet payload (create and update share the shape)
#[derive(Debug, Deserialize, ToSchema)]
pub struct TweetRequest {
    pub content: String,
}

/// Create tweet routes
pub fn routes(state: TweetsState) -> Router {
    Router::new()
        .route("/v1/tweets", post(create_tweet))
        .route(
            "/v1/tweets/:tweet_id",
            patch(update_tweet).delete(delete_tweet),
        )
        .with_state(state)
}

/// POST /v1/tweets - Create a tweet
#[utoipa::path(
    post,
    path = "/v1/tweets",
    request_body = TweetRequest,
    responses(
        (status = 201, description = "Tweet created", body = ApiResponse<Tweet>),
        (status = 400, description = "Empty content"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tweets"
)]
pub async fn create_tweet(
    State(state): State<TweetsState>,
    AuthIdentity(identity): AuthIdentity,
    Json(req): Json<TweetRequest>,
) -> ApiResult<ApiResponse<Tweet>> {
    let tweet = state.service.create(identity.id, &req.content).await?;
    Ok(ApiResponse::created(tweet, "Tweet created successfully"))
}

/// PATCH /v1/tweets/{tweet_id} - Edit a tweet (owner only)
#[utoipa::path(
    patch,
    path = "/v1/tweets/{tweet_id}",
    params(("tweet_id" = Uuid, Path, description = "Tweet ID")),
    request_body = TweetRequest,
    responses(
        (status = 200, description = "Tweet updated", body = ApiResponse<Tweet>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tweet not found")
    ),
    tag = "tweets"
)]
pub async fn update_tweet(
    State(state): State<TweetsState>,
    AuthIdentity(identity): AuthIdentity,
    Path(tweet_id): Path<Uuid>,
    Json(req): Json<TweetRequest>,
) -> ApiResult<ApiResponse<Tweet>> {
    let tweet = state
        .service
        .update(identity.id, tweet_id, &req.content)
        .await?;
    Ok(ApiResponse::ok(tweet, "Tweet updated successfully"))
}

/// DELETE /v1/tweets/{tweet_id} - Delete a tweet (owner only)
#[utoipa::path(
    delete,
    path = "/v1/tweets/{tweet_id}",
    params(("tweet_id" = Uuid, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Tweet deleted", body = ApiResponse<Tweet>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tweet not found")
    ),
    tag = "tweets"
)]
pub async fn delete_tweet(
    State(state): State<TweetsState>,
    AuthIdentity(identity): AuthIdentity,
    Path(tweet_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Tweet>> {
    let tweet = state.service.delete(identity.id, tweet_id).await?;
    Ok(ApiResponse::ok(tweet, "Tweet deleted successfully"))
}
