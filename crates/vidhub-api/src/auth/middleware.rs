// Authentication extractor
// Decision: Token is read from the accessToken cookie first, falling back to
// the Authorization: Bearer header
//
// Verification never mutates stored state: validate claims, look the
// identity up, attach it (minus credential fields) to the request. Expired,
// malformed, and unknown-identity failures are logged distinguishably but
// answered with an identically shaped 401.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use uuid::Uuid;

use vidhub_core::Identity;
use vidhub_storage::StorageBackend;

use super::config::JwtConfig;
use super::jwt::{JwtService, TokenError};
use crate::error::ApiError;
use crate::services::identity::to_identity;

/// Cookie names used for the session pair.
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<JwtService>,
    pub db: StorageBackend,
}

impl AuthState {
    pub fn new(config: JwtConfig, db: StorageBackend) -> Self {
        Self {
            jwt: Arc::new(JwtService::new(config)),
            db,
        }
    }
}

/// Helper trait for extracting AuthState from module-specific app states
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AuthState> for AuthState {
    fn from_ref(input: &AuthState) -> Self {
        input.clone()
    }
}

/// The authenticated caller, resolved from storage.
/// Credential fields (password hash, refresh token hash) are not carried.
#[derive(Debug, Clone)]
pub struct AuthIdentity(pub Identity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        extract_auth_identity(parts, &auth_state).await
    }
}

async fn extract_auth_identity(
    parts: &mut Parts,
    auth_state: &AuthState,
) -> Result<AuthIdentity, ApiError> {
    let Some(token) = token_from_parts(parts) else {
        tracing::debug!("Request without access token");
        return Err(ApiError::authentication("Authentication required"));
    };

    let claims = auth_state
        .jwt
        .validate_access_token(&token)
        .map_err(|e| match e {
            TokenError::Expired => {
                tracing::debug!(reason = "expired", "Access token rejected");
                ApiError::authentication("Invalid or expired token")
            }
            TokenError::Invalid(source) => {
                tracing::debug!(
                    reason = "malformed-or-bad-signature",
                    "Access token rejected: {}", source
                );
                ApiError::authentication("Invalid or expired token")
            }
        })?;

    let identity_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        tracing::debug!("Access token subject is not a UUID");
        ApiError::authentication("Invalid or expired token")
    })?;

    let row = auth_state
        .db
        .get_identity(identity_id)
        .await
        .map_err(|e| {
            tracing::error!("Identity lookup failed during authentication: {}", e);
            ApiError::upstream("Authentication failed")
        })?
        .ok_or_else(|| {
            // Token verified but the account is gone; callers cannot tell
            // this apart from a bad token.
            tracing::debug!(identity = %identity_id, "Access token for unknown identity");
            ApiError::authentication("Invalid or expired token")
        })?;

    Ok(AuthIdentity(to_identity(row)))
}

/// Cookie first, Authorization: Bearer second.
fn token_from_parts(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_token_prefers_cookie() {
        let parts = parts_with_headers(&[
            ("cookie", "accessToken=from-cookie"),
            ("authorization", "Bearer from-header"),
        ]);
        assert_eq!(token_from_parts(&parts).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_token_falls_back_to_bearer() {
        let parts = parts_with_headers(&[("authorization", "Bearer from-header")]);
        assert_eq!(token_from_parts(&parts).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_no_token() {
        let parts = parts_with_headers(&[]);
        assert_eq!(token_from_parts(&parts), None);

        // Non-bearer authorization schemes are not accepted
        let parts = parts_with_headers(&[("authorization", "Basic abc")]);
        assert_eq!(token_from_parts(&parts), None);
    }
}
