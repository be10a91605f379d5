// JWT token service for authentication
// Decision: HS256 with a distinct symmetric key per token kind
// Decision: Access tokens carry identity claims; refresh tokens carry only
// the identity id, and the active one is stored hashed on the identity row

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::config::JwtConfig;

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessTokenClaims {
    /// Subject (identity ID)
    pub sub: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    /// Token type discriminator
    pub token_type: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT claims for refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshTokenClaims {
    /// Subject (identity ID)
    pub sub: String,
    /// Token type discriminator
    pub token_type: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Token pair returned whenever a session begins or is renewed
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Why a presented token was rejected. The client always sees the same 401;
/// this split exists so the reject reason can be logged distinguishably.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("malformed or bad-signature token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e),
        }
    }
}

/// JWT service for token generation and validation
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    access_encoding_key: EncodingKey,
    access_decoding_key: DecodingKey,
    refresh_encoding_key: EncodingKey,
    refresh_decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let access_encoding_key = EncodingKey::from_secret(config.access_secret.as_bytes());
        let access_decoding_key = DecodingKey::from_secret(config.access_secret.as_bytes());
        let refresh_encoding_key = EncodingKey::from_secret(config.refresh_secret.as_bytes());
        let refresh_decoding_key = DecodingKey::from_secret(config.refresh_secret.as_bytes());

        Self {
            config,
            access_encoding_key,
            access_decoding_key,
            refresh_encoding_key,
            refresh_decoding_key,
        }
    }

    /// Generate an access token carrying the identity's claims
    pub fn generate_access_token(
        &self,
        identity_id: Uuid,
        email: &str,
        username: &str,
        display_name: &str,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::from_std(self.config.access_token_lifetime)?;

        let claims = AccessTokenClaims {
            sub: identity_id.to_string(),
            email: email.to_string(),
            username: username.to_string(),
            display_name: display_name.to_string(),
            token_type: "access".to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.access_encoding_key)
            .context("Failed to encode access token")
    }

    /// Generate a refresh token carrying only the identity id
    pub fn generate_refresh_token(&self, identity_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::from_std(self.config.refresh_token_lifetime)?;

        let claims = RefreshTokenClaims {
            sub: identity_id.to_string(),
            token_type: "refresh".to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.refresh_encoding_key)
            .context("Failed to encode refresh token")
    }

    /// Generate both tokens. The caller persists the refresh token's hash on
    /// the identity row before handing the pair out.
    pub fn generate_token_pair(
        &self,
        identity_id: Uuid,
        email: &str,
        username: &str,
        display_name: &str,
    ) -> Result<TokenPair> {
        let access_token =
            self.generate_access_token(identity_id, email, username, display_name)?;
        let refresh_token = self.generate_refresh_token(identity_id)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_lifetime.as_secs() as i64,
        })
    }

    /// Validate and decode an access token
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data =
            decode::<AccessTokenClaims>(token, &self.access_decoding_key, &validation)?;

        if token_data.claims.token_type != "access" {
            return Err(TokenError::Invalid(
                jsonwebtoken::errors::ErrorKind::InvalidToken.into(),
            ));
        }

        Ok(token_data.claims)
    }

    /// Validate and decode a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, TokenError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data =
            decode::<RefreshTokenClaims>(token, &self.refresh_decoding_key, &validation)?;

        if token_data.claims.token_type != "refresh" {
            return Err(TokenError::Invalid(
                jsonwebtoken::errors::ErrorKind::InvalidToken.into(),
            ));
        }

        Ok(token_data.claims)
    }

    /// Access token lifetime in seconds
    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.config.access_token_lifetime.as_secs() as i64
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_token_lifetime_secs(&self) -> i64 {
        self.config.refresh_token_lifetime.as_secs() as i64
    }
}

/// Hash a token for at-rest storage (SHA-256 hex)
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(token.as_bytes());
    hex::encode(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn test_config() -> JwtConfig {
        JwtConfig {
            access_secret: "access-secret-for-testing".to_string(),
            refresh_secret: "refresh-secret-for-testing".to_string(),
            access_token_lifetime: StdDuration::from_secs(900),
            refresh_token_lifetime: StdDuration::from_secs(86400),
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = JwtService::new(test_config());
        let identity_id = Uuid::now_v7();
        let token = service
            .generate_access_token(identity_id, "alice@example.com", "alice", "Alice")
            .unwrap();

        assert!(!token.is_empty());

        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, identity_id.to_string());
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.display_name, "Alice");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let service = JwtService::new(test_config());
        let identity_id = Uuid::now_v7();
        let token = service.generate_refresh_token(identity_id).unwrap();

        let claims = service.validate_refresh_token(&token).unwrap();
        assert_eq!(claims.sub, identity_id.to_string());
        assert_eq!(claims.token_type, "refresh");
    }

    #[test]
    fn test_token_pair_verifies_to_original_identity() {
        let service = JwtService::new(test_config());
        let identity_id = Uuid::now_v7();
        let pair = service
            .generate_token_pair(identity_id, "a@example.com", "alice", "Alice")
            .unwrap();

        assert_eq!(pair.token_type, "Bearer");
        let access = service.validate_access_token(&pair.access_token).unwrap();
        let refresh = service.validate_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(access.sub, identity_id.to_string());
        assert_eq!(refresh.sub, identity_id.to_string());
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let service = JwtService::new(test_config());
        match service.validate_access_token("not-a-token") {
            Err(TokenError::Invalid(_)) => {}
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let service = JwtService::new(test_config());
        let token = service
            .generate_access_token(Uuid::now_v7(), "a@example.com", "alice", "Alice")
            .unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

        assert!(matches!(
            service.validate_access_token(&tampered),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token_is_distinguished() {
        let mut config = test_config();
        config.access_token_lifetime = StdDuration::from_secs(0);
        let service = JwtService::new(config);

        let token = service
            .generate_access_token(Uuid::now_v7(), "a@example.com", "alice", "Alice")
            .unwrap();

        // exp == iat and leeway is zero, so the token is already expired
        std::thread::sleep(StdDuration::from_secs(1));
        assert!(matches!(
            service.validate_access_token(&token),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_wrong_token_kind_rejected() {
        let service = JwtService::new(test_config());
        let identity_id = Uuid::now_v7();

        // A refresh token cannot pass access validation: different secret.
        let refresh = service.generate_refresh_token(identity_id).unwrap();
        assert!(service.validate_access_token(&refresh).is_err());

        // And vice versa.
        let access = service
            .generate_access_token(identity_id, "a@example.com", "alice", "Alice")
            .unwrap();
        assert!(service.validate_refresh_token(&access).is_err());
    }

    #[test]
    fn test_hash_token() {
        let token = "test-token-123";
        let hash1 = hash_token(token);
        let hash2 = hash_token(token);

        assert_eq!(hash1, hash2);
        assert!(hash1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash_token("other-token"), hash1);
    }
}
