// Router assembly
//
// Shared by the server binary and the integration tests, which drive the
// router directly against the in-memory storage backend.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use vidhub_media::MediaClient;
use vidhub_storage::StorageBackend;

use crate::api;
use crate::auth::{self, AuthRoutesState, AuthState, JwtConfig};
use crate::services::{
    CommentService, IdentityService, PlaylistService, TweetService, VideoService,
};

/// Uploads are staged locally before hitting the media store; raw video
/// uploads dominate, so the body limit is sized for them.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Everything the router needs, built once at startup.
pub struct AppContext {
    pub db: StorageBackend,
    pub media: Arc<MediaClient>,
    pub jwt_config: JwtConfig,
    pub upload_dir: PathBuf,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage_mode: &'static str,
}

/// State for the health endpoint
#[derive(Clone)]
struct HealthState {
    storage_mode: &'static str,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage_mode: state.storage_mode,
    })
}

/// Build the full application router.
pub fn build_router(ctx: AppContext) -> Router {
    let auth_state = AuthState::new(ctx.jwt_config, ctx.db.clone());

    let identities = Arc::new(IdentityService::new(ctx.db.clone(), ctx.media.clone()));
    let videos = Arc::new(VideoService::new(ctx.db.clone(), ctx.media.clone()));
    let comments = Arc::new(CommentService::new(ctx.db.clone()));
    let tweets = Arc::new(TweetService::new(ctx.db.clone()));
    let playlists = Arc::new(PlaylistService::new(ctx.db.clone()));

    let auth_routes_state = AuthRoutesState {
        auth: auth_state.clone(),
        media: ctx.media.clone(),
        upload_dir: ctx.upload_dir.clone(),
    };
    let videos_state = api::videos::VideosState {
        service: videos.clone(),
        auth: auth_state.clone(),
        upload_dir: ctx.upload_dir.clone(),
    };
    let comments_state = api::comments::CommentsState {
        service: comments,
        auth: auth_state.clone(),
    };
    let tweets_state = api::tweets::TweetsState {
        service: tweets.clone(),
        auth: auth_state.clone(),
    };
    let playlists_state = api::playlists::PlaylistsState {
        service: playlists.clone(),
        auth: auth_state.clone(),
    };
    let users_state = api::users::UsersState {
        identities,
        videos,
        tweets,
        playlists,
        auth: auth_state.clone(),
        upload_dir: ctx.upload_dir,
    };

    let health_state = HealthState {
        storage_mode: if ctx.db.is_dev_mode() {
            "memory"
        } else {
            "postgres"
        },
    };

    Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(auth::routes::routes(auth_routes_state))
        .merge(api::videos::routes(videos_state))
        .merge(api::comments::routes(comments_state))
        .merge(api::tweets::routes(tweets_state))
        .merge(api::playlists::routes(playlists_state))
        .merge(api::users::routes(users_state))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
