// Vidhub API server
// Decision: STORAGE_MODE=memory boots without a database for local development

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use vidhub_api::auth::JwtConfig;
use vidhub_api::openapi::ApiDoc;
use vidhub_api::{build_router, AppContext};
use vidhub_media::MediaClient;
use vidhub_storage::{Database, StorageBackend};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidhub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    tracing::info!("vidhub-api starting...");

    // Initialize storage
    let storage_mode = std::env::var("STORAGE_MODE").unwrap_or_default();
    let db = if storage_mode.eq_ignore_ascii_case("memory") {
        tracing::warn!("Using in-memory storage; all data is lost on restart");
        StorageBackend::in_memory()
    } else {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;
        let database = Database::from_url(&database_url)
            .await
            .context("Failed to connect to database")?;
        database.migrate().await.context("Migrations failed")?;
        tracing::info!("Connected to database");
        StorageBackend::Postgres(database)
    };

    // Media store client
    let media = Arc::new(MediaClient::from_env().context("Media store configuration invalid")?);
    tracing::info!("Media store client configured");

    // Token configuration
    let jwt_config = JwtConfig::from_env();

    // Upload staging directory
    let upload_dir =
        PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./tmp/uploads".to_string()));
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .context("Failed to create upload directory")?;

    let app = build_router(AppContext {
        db,
        media,
        jwt_config,
        upload_dir,
    });

    // Add Swagger UI
    let app =
        app.merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Load CORS allowed origins from environment (optional)
    // Only needed when the UI is served from a different origin than the API
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| s.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();

    let app = if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
        app
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::ORIGIN,
                ])
                .allow_credentials(true),
        )
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
