//! Token Issuer/Verifier
//!
//! Access and refresh tokens are both HS256 JWTs carrying the user id and
//! role list. They are signed with different secrets, so one can never be
//! presented in place of the other.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::{TokenClaims, User};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl SigningKeys {
    fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }
}

pub struct TokenIssuer {
    access: SigningKeys,
    refresh: SigningKeys,
    issuer: String,
    audience: String,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access: SigningKeys::new(&config.access_token_secret, config.access_token_expiration),
            refresh: SigningKeys::new(
                &config.refresh_token_secret,
                config.refresh_token_expiration,
            ),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
        }
    }

    /// Generate an access token for a user
    pub fn issue_access(&self, user: &User) -> Result<String, AuthError> {
        self.issue(user, &self.access)
    }

    /// Generate a refresh token for a user
    pub fn issue_refresh(&self, user: &User) -> Result<String, AuthError> {
        self.issue(user, &self.refresh)
    }

    /// Validate an access token
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify(token, &self.access)
    }

    /// Validate a refresh token's signature and expiry
    pub fn verify_refresh(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify(token, &self.refresh)
    }

    pub fn access_ttl(&self) -> i64 {
        self.access.ttl_seconds
    }

    pub fn refresh_ttl(&self) -> i64 {
        self.refresh.ttl_seconds
    }

    fn issue(&self, user: &User, keys: &SigningKeys) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(keys.ttl_seconds);

        let claims = TokenClaims {
            sub: user.id,
            roles: user.roles.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
        };

        Ok(encode(&Header::default(), &claims, &keys.encoding)?)
    }

    fn verify(&self, token: &str, keys: &SigningKeys) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<TokenClaims>(token, &keys.decoding, &validation)?;
        Ok(token_data.claims)
    }
}
