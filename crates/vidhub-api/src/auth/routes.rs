// Authentication HTTP routes
// Decision: /v1/auth/* prefix, consistent with the resource API routes
// Decision: Session pair travels as httpOnly+secure cookies AND in the JSON
// body, so both browser and API clients work
//
// Refresh failures are deliberately uniform: missing token, bad signature,
// unknown identity, and a superseded token all answer the same 401. The
// distinguishing detail goes to the server log only.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    routing::{get, patch, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use vidhub_core::Identity;
use vidhub_media::{MediaClient, MediaKind};
use vidhub_storage::{password::{hash_password, verify_password}, CreateIdentityRow, IdentityRow};

use super::jwt::{hash_token, TokenError, TokenPair};
use super::middleware::{
    AuthIdentity, AuthState, FromRef, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
use crate::common::ApiResponse;
use crate::error::{ApiError, ApiResult};
use crate::services::identity::to_identity;
use crate::upload::StagedForm;

/// App state for auth routes
#[derive(Clone)]
pub struct AuthRoutesState {
    pub auth: AuthState,
    pub media: Arc<MediaClient>,
    pub upload_dir: PathBuf,
}

impl FromRef<AuthRoutesState> for AuthState {
    fn from_ref(input: &AuthRoutesState) -> Self {
        input.auth.clone()
    }
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Refresh request; the token may instead arrive as a cookie
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

/// Password change request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Login response payload
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub identity: Identity,
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh response payload
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,
}

/// Create auth routes
pub fn routes(state: AuthRoutesState) -> Router {
    Router::new()
        // Public routes
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/refresh", post(refresh_token))
        // Protected routes
        .route("/v1/auth/logout", post(logout))
        .route("/v1/auth/me", get(me))
        .route("/v1/auth/password", patch(change_password))
        .with_state(state)
}

/// POST /v1/auth/register - Create an identity (multipart: details + avatar,
/// optional cover image)
pub async fn register(
    State(state): State<AuthRoutesState>,
    mut multipart: Multipart,
) -> ApiResult<ApiResponse<Identity>> {
    let form = StagedForm::from_multipart(&mut multipart, &state.upload_dir).await?;
    let result = register_with_form(&state, &form).await;
    // Staged files already consumed by the media client are gone; this
    // removes whatever is left, success or failure.
    form.discard().await;
    result
}

async fn register_with_form(
    state: &AuthRoutesState,
    form: &StagedForm,
) -> ApiResult<ApiResponse<Identity>> {
    let username = form.require_field("username")?.to_lowercase();
    let email = form.require_field("email")?.to_lowercase();
    let display_name = form.require_field("displayName")?.to_string();

    // Validated trimmed, stored as given.
    let password = form.field("password").unwrap_or_default();
    if password.trim().is_empty() {
        return Err(ApiError::validation("Field 'password' is required"));
    }

    let existing = state
        .auth
        .db
        .find_identity_by_login(Some(&username), Some(&email))
        .await
        .map_err(|e| {
            tracing::error!("Identity lookup failed during registration: {}", e);
            ApiError::upstream("Registration failed")
        })?;
    if existing.is_some() {
        return Err(ApiError::conflict(
            "Identity with this username or email already exists",
        ));
    }

    let avatar_file = form.require_file("avatar")?;
    let avatar = state.media.upload_staged(&avatar_file.path).await?;

    let cover = match form.file("coverImage") {
        Some(staged) => match state.media.upload_staged(&staged.path).await {
            Ok(asset) => Some(asset),
            Err(e) => {
                // Don't leak the avatar we just stored.
                if let Err(cleanup) = state
                    .media
                    .delete(&[avatar.public_id.clone()], MediaKind::Image)
                    .await
                {
                    tracing::warn!("Failed to release avatar after cover failure: {}", cleanup);
                }
                return Err(e.into());
            }
        },
        None => None,
    };

    let password_hash = hash_password(password)?;

    let (cover_url, cover_public_id) = match cover {
        Some(asset) => (Some(asset.url), Some(asset.public_id)),
        None => (None, None),
    };

    let row = state
        .auth
        .db
        .create_identity(CreateIdentityRow {
            username,
            email,
            display_name,
            password_hash,
            avatar_url: avatar.url,
            avatar_public_id: avatar.public_id,
            cover_url,
            cover_public_id,
        })
        .await
        .map_err(|e| {
            tracing::error!("Identity creation failed: {}", e);
            ApiError::upstream("Registration failed")
        })?;

    Ok(ApiResponse::created(
        to_identity(row),
        "Identity registered successfully",
    ))
}

/// POST /v1/auth/login - Log in with username or email plus password
pub async fn login(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(CookieJar, ApiResponse<SessionData>)> {
    if req.username.is_none() && req.email.is_none() {
        return Err(ApiError::validation("Username or email is required"));
    }

    let username = req.username.map(|u| u.trim().to_lowercase());
    let email = req.email.map(|e| e.trim().to_lowercase());

    let row = state
        .auth
        .db
        .find_identity_by_login(username.as_deref(), email.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Identity lookup failed during login: {}", e);
            ApiError::upstream("Login failed")
        })?
        .ok_or_else(|| ApiError::not_found("Identity not found"))?;

    // No token is issued and no refresh token is rotated on a bad password.
    if !verify_password(&req.password, &row.password_hash) {
        return Err(ApiError::authentication("Incorrect password"));
    }

    let (jar, pair) = issue_session(&state.auth, jar, &row).await?;

    Ok((
        jar,
        ApiResponse::ok(
            SessionData {
                identity: to_identity(row),
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
            "Logged in successfully",
        ),
    ))
}

/// POST /v1/auth/refresh - Rotate the session pair
///
/// The refresh token comes from the refreshToken cookie or the request body;
/// a request without one is rejected.
pub async fn refresh_token(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    body: Option<Json<RefreshTokenRequest>>,
) -> ApiResult<(CookieJar, ApiResponse<TokenData>)> {
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| body.and_then(|Json(req)| req.refresh_token));

    let Some(presented) = presented else {
        tracing::debug!("Refresh attempt without a token");
        return Err(refresh_rejected());
    };

    let claims = state
        .auth
        .jwt
        .validate_refresh_token(&presented)
        .map_err(|e| {
            match e {
                TokenError::Expired => tracing::debug!(reason = "expired", "Refresh rejected"),
                TokenError::Invalid(source) => tracing::debug!(
                    reason = "malformed-or-bad-signature",
                    "Refresh rejected: {}", source
                ),
            }
            refresh_rejected()
        })?;

    let identity_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        tracing::debug!("Refresh token subject is not a UUID");
        refresh_rejected()
    })?;

    let row = state
        .auth
        .db
        .get_identity(identity_id)
        .await
        .map_err(|e| {
            tracing::error!("Identity lookup failed during refresh: {}", e);
            ApiError::upstream("Refresh failed")
        })?
        .ok_or_else(|| {
            tracing::debug!(identity = %identity_id, "Refresh token for unknown identity");
            refresh_rejected()
        })?;

    // Reuse of a rotated-out (or logged-out) token fails here.
    let presented_hash = hash_token(&presented);
    if row.refresh_token_hash.as_deref() != Some(presented_hash.as_str()) {
        tracing::debug!(identity = %identity_id, "Superseded refresh token presented");
        return Err(refresh_rejected());
    }

    let pair = state.auth.jwt.generate_token_pair(
        row.id,
        &row.email,
        &row.username,
        &row.display_name,
    )?;

    // Conditional rotation keyed on the presented hash: of two concurrent
    // refresh calls, exactly one wins.
    let rotated = state
        .auth
        .db
        .rotate_refresh_token(row.id, &presented_hash, &hash_token(&pair.refresh_token))
        .await
        .map_err(|e| {
            tracing::error!("Refresh token rotation failed: {}", e);
            ApiError::upstream("Refresh failed")
        })?;
    if !rotated {
        tracing::debug!(identity = %identity_id, "Lost refresh rotation race");
        return Err(refresh_rejected());
    }

    let jar = add_session_cookies(&state.auth, jar, &pair);

    Ok((
        jar,
        ApiResponse::ok(
            TokenData {
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
            "Access token refreshed",
        ),
    ))
}

/// POST /v1/auth/logout - Clear the stored refresh token and both cookies
pub async fn logout(
    State(state): State<AuthRoutesState>,
    AuthIdentity(identity): AuthIdentity,
    jar: CookieJar,
) -> ApiResult<(CookieJar, ApiResponse<serde_json::Value>)> {
    state
        .auth
        .db
        .set_refresh_token(identity.id, None)
        .await
        .map_err(|e| {
            tracing::error!("Failed to clear refresh token: {}", e);
            ApiError::upstream("Logout failed")
        })?;

    let jar = jar
        .remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/v1/auth"));

    Ok((
        jar,
        ApiResponse::ok(serde_json::json!({}), "Logged out successfully"),
    ))
}

/// GET /v1/auth/me - Current identity
pub async fn me(AuthIdentity(identity): AuthIdentity) -> ApiResponse<Identity> {
    ApiResponse::ok(identity, "Identity retrieved successfully")
}

/// PATCH /v1/auth/password - Change password
pub async fn change_password(
    State(state): State<AuthRoutesState>,
    AuthIdentity(identity): AuthIdentity,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<ApiResponse<serde_json::Value>> {
    if req.new_password.trim().is_empty() {
        return Err(ApiError::validation("New password is required"));
    }

    let row = state
        .auth
        .db
        .get_identity(identity.id)
        .await
        .map_err(|e| {
            tracing::error!("Identity lookup failed: {}", e);
            ApiError::upstream("Password change failed")
        })?
        .ok_or_else(|| ApiError::not_found("Identity not found"))?;

    if !verify_password(&req.old_password, &row.password_hash) {
        return Err(ApiError::authentication("Incorrect password"));
    }

    let password_hash = hash_password(&req.new_password)?;
    let updated = state
        .auth
        .db
        .update_identity_password(identity.id, &password_hash)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store new password: {}", e);
            ApiError::upstream("Password change failed")
        })?;
    if !updated {
        return Err(ApiError::not_found("Identity not found"));
    }

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Password changed successfully",
    ))
}

/// The one message every refresh failure maps to.
fn refresh_rejected() -> ApiError {
    ApiError::authentication("Invalid refresh token")
}

/// Issue a new pair for the identity, persisting the refresh token hash
/// (overwriting any prior value) before the pair leaves the server.
pub(crate) async fn issue_session(
    auth: &AuthState,
    jar: CookieJar,
    row: &IdentityRow,
) -> ApiResult<(CookieJar, TokenPair)> {
    let pair = auth
        .jwt
        .generate_token_pair(row.id, &row.email, &row.username, &row.display_name)?;

    let stored = auth
        .db
        .set_refresh_token(row.id, Some(&hash_token(&pair.refresh_token)))
        .await
        .map_err(|e| {
            tracing::error!("Failed to store refresh token: {}", e);
            ApiError::upstream("Login failed")
        })?;
    if !stored {
        return Err(ApiError::not_found("Identity not found"));
    }

    let jar = add_session_cookies(auth, jar, &pair);
    Ok((jar, pair))
}

fn add_session_cookies(auth: &AuthState, jar: CookieJar, pair: &TokenPair) -> CookieJar {
    let access_cookie = Cookie::build((ACCESS_TOKEN_COOKIE, pair.access_token.clone()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(pair.expires_in))
        .build();

    let refresh_cookie = Cookie::build((REFRESH_TOKEN_COOKIE, pair.refresh_token.clone()))
        .path("/v1/auth")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(
            auth.jwt.refresh_token_lifetime_secs(),
        ))
        .build();

    jar.add(access_cookie).add(refresh_cookie)
}
