// Token configuration loaded from environment variables
// Decision: Distinct secrets per token kind so a leaked refresh secret
// cannot mint access tokens (and vice versa)

use std::time::Duration;

/// JWT configuration: one secret and lifetime per token kind.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret for signing access tokens
    pub access_secret: String,
    /// Secret for signing refresh tokens
    pub refresh_secret: String,
    /// Access token lifetime
    pub access_token_lifetime: Duration,
    /// Refresh token lifetime
    pub refresh_token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_token_lifetime: Duration::from_secs(60 * 60), // 1 hour
            refresh_token_lifetime: Duration::from_secs(10 * 24 * 60 * 60), // 10 days
        }
    }
}

impl JwtConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing secrets fall back to process-local random values so a dev
    /// server still boots; every restart then invalidates outstanding tokens.
    pub fn from_env() -> Self {
        let access_secret = std::env::var("ACCESS_TOKEN_SECRET").unwrap_or_else(|_| {
            tracing::warn!("ACCESS_TOKEN_SECRET not set, generating an ephemeral secret");
            random_secret()
        });

        let refresh_secret = std::env::var("REFRESH_TOKEN_SECRET").unwrap_or_else(|_| {
            tracing::warn!("REFRESH_TOKEN_SECRET not set, generating an ephemeral secret");
            random_secret()
        });

        let access_token_lifetime = std::env::var("ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60 * 60));

        let refresh_token_lifetime = std::env::var("REFRESH_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(10 * 24 * 60 * 60));

        Self {
            access_secret,
            refresh_secret,
            access_token_lifetime,
            refresh_token_lifetime,
        }
    }
}

fn random_secret() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetimes() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_lifetime, Duration::from_secs(3600));
        assert_eq!(
            config.refresh_token_lifetime,
            Duration::from_secs(10 * 24 * 60 * 60)
        );
    }

    #[test]
    fn test_random_secret_is_fresh() {
        assert_ne!(random_secret(), random_secret());
        assert_eq!(random_secret().len(), 64);
    }
}
