// OpenAPI specification generation
//
// Used by the main server to mount Swagger UI. Auth endpoints carry mixed
// multipart/cookie semantics and are documented out of band; the resource
// API surface is fully described here.

use utoipa::OpenApi;

use crate::api;
use crate::common::ApiResponse;
use crate::error::ErrorBody;
use vidhub_core::{Comment, Identity, Playlist, Tweet, Video, WatchEntry};

/// OpenAPI documentation for the Vidhub API
#[derive(OpenApi)]
#[openapi(
    paths(
        api::videos::publish_video,
        api::videos::list_videos,
        api::videos::get_video,
        api::videos::update_video,
        api::videos::delete_video,
        api::comments::post_comment,
        api::comments::list_comments,
        api::comments::update_comment,
        api::comments::delete_comment,
        api::tweets::create_tweet,
        api::tweets::update_tweet,
        api::tweets::delete_tweet,
        api::playlists::create_playlist,
        api::playlists::get_playlist,
        api::playlists::update_playlist,
        api::playlists::delete_playlist,
        api::playlists::add_video,
        api::playlists::remove_video,
        api::users::update_account,
        api::users::update_avatar,
        api::users::update_cover,
        api::users::delete_account,
        api::users::watch_history,
        api::users::list_identity_tweets,
        api::users::list_identity_playlists,
    ),
    components(
        schemas(
            Identity, Video, Comment, Tweet, Playlist, WatchEntry,
            ErrorBody,
            ApiResponse<Identity>,
            ApiResponse<Video>,
            ApiResponse<Vec<Video>>,
            ApiResponse<Comment>,
            ApiResponse<Vec<Comment>>,
            ApiResponse<Tweet>,
            ApiResponse<Vec<Tweet>>,
            ApiResponse<Playlist>,
            ApiResponse<Vec<Playlist>>,
            ApiResponse<Vec<WatchEntry>>,
            api::videos::UpdateVideoRequest,
            api::comments::CommentRequest,
            api::tweets::TweetRequest,
            api::playlists::CreatePlaylistRequest,
            api::playlists::UpdatePlaylistRequest,
            api::users::UpdateAccountRequest,
        )
    ),
    tags(
        (name = "videos", description = "Video publishing and management"),
        (name = "comments", description = "Comments on videos"),
        (name = "tweets", description = "Short posts"),
        (name = "playlists", description = "Playlists and membership"),
        (name = "users", description = "Account management")
    ),
    info(
        title = "Vidhub API",
        description = "Video-sharing platform backend: identities, sessions, videos, comments, tweets, playlists",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;
