//! Authentication Configuration
//!
//! All configuration values are loaded from environment variables.
//! No hardcoded secrets or sensitive data.

use crate::error::AuthError;
use std::env;
use std::str::FromStr;

/// Authentication configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret used to sign access tokens (from ACCESS_TOKEN_SECRET env var)
    pub access_token_secret: String,

    /// Secret used to sign refresh tokens (from REFRESH_TOKEN_SECRET env var)
    pub refresh_token_secret: String,

    /// Access token expiration in seconds (from ACCESS_TOKEN_EXPIRATION env var)
    pub access_token_expiration: i64,

    /// Refresh token expiration in seconds (from REFRESH_TOKEN_EXPIRATION env var)
    pub refresh_token_expiration: i64,

    /// JWT issuer (from JWT_ISSUER env var)
    pub jwt_issuer: String,

    /// JWT audience (from JWT_AUDIENCE env var)
    pub jwt_audience: String,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Minimum password length (from MIN_PASSWORD_LENGTH env var)
    pub min_password_length: usize,

    /// Set the Secure flag on the refresh cookie (from COOKIE_SECURE env var)
    pub secure_cookies: bool,
}

impl AuthConfig {
    /// Load configuration from environment variables
    ///
    /// Both token secrets are required; everything else falls back to a default.
    pub fn from_env() -> Result<Self, AuthError> {
        Ok(Self {
            access_token_secret: required("ACCESS_TOKEN_SECRET")?,
            refresh_token_secret: required("REFRESH_TOKEN_SECRET")?,
            access_token_expiration: parsed("ACCESS_TOKEN_EXPIRATION", 900), // 15 minutes
            refresh_token_expiration: parsed("REFRESH_TOKEN_EXPIRATION", 604800), // 7 days
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "eventhub".to_string()),
            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "eventhub-api".to_string()),
            argon2_memory_cost: parsed("ARGON2_MEMORY_COST", 65536), // 64 MiB
            argon2_time_cost: parsed("ARGON2_TIME_COST", 3),
            argon2_parallelism: parsed("ARGON2_PARALLELISM", 4),
            min_password_length: parsed("MIN_PASSWORD_LENGTH", 8),
            secure_cookies: env::var("COOKIE_SECURE")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.access_token_secret.len() < 32 || self.refresh_token_secret.len() < 32 {
            return Err(AuthError::Config(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must be at least 32 characters"
                    .to_string(),
            ));
        }

        if self.access_token_secret == self.refresh_token_secret {
            return Err(AuthError::Config(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ".to_string(),
            ));
        }

        if self.access_token_expiration <= 0 {
            return Err(AuthError::Config(
                "ACCESS_TOKEN_EXPIRATION must be positive".to_string(),
            ));
        }

        if self.refresh_token_expiration <= self.access_token_expiration {
            return Err(AuthError::Config(
                "REFRESH_TOKEN_EXPIRATION must be greater than ACCESS_TOKEN_EXPIRATION"
                    .to_string(),
            ));
        }

        if self.min_password_length < 8 {
            return Err(AuthError::Config(
                "MIN_PASSWORD_LENGTH must be at least 8".to_string(),
            ));
        }

        Ok(())
    }
}

fn required(key: &str) -> Result<String, AuthError> {
    env::var(key).map_err(|_| AuthError::Config(format!("{key} environment variable must be set")))
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {key} value {raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AuthConfig {
    AuthConfig {
        access_token_secret: "a".repeat(32),
        refresh_token_secret: "r".repeat(32),
        access_token_expiration: 900,
        refresh_token_expiration: 604800,
        jwt_issuer: "test".to_string(),
        jwt_audience: "test".to_string(),
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        min_password_length: 8,
        secure_cookies: true,
    }
}
