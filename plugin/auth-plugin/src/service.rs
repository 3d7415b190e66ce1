//! Authentication Service
//!
//! Registration, login, refresh and logout on top of the credential store,
//! the token issuer and a `UserStore`.

use crate::config::AuthConfig;
use crate::credentials::CredentialStore;
use crate::error::AuthError;
use crate::models::*;
use crate::store::UserStore;
use crate::token::TokenIssuer;

use std::sync::Arc;
use uuid::Uuid;

/// Tokens handed out by a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service
pub struct AuthService {
    users: Arc<dyn UserStore>,
    credentials: CredentialStore,
    tokens: TokenIssuer,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, config: AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;

        Ok(Self {
            users,
            credentials: CredentialStore::new(&config)?,
            tokens: TokenIssuer::new(&config),
            config,
        })
    }

    /// The user repository backing this service
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    // ============================================
    // Registration
    // ============================================

    /// Register a new user with the default role set
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AuthError> {
        self.credentials.validate_password(&req.password)?;

        let email = normalize_email(&req.email);

        // Concurrent duplicates are still caught by the unique index
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailExists);
        }

        let password_hash = self.credentials.hash(&req.password)?;

        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                name: req.name.trim().to_string(),
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(user)
    }

    // ============================================
    // Login / Refresh / Logout
    // ============================================

    /// Authenticate with email and password and issue both tokens
    pub async fn login(&self, req: LoginRequest) -> Result<LoginOutcome, AuthError> {
        let email = normalize_email(&req.email);

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                tracing::warn!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.credentials.verify(&req.password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.tokens.issue_access(&user)?;
        let refresh_token = self.tokens.issue_refresh(&user)?;

        let refresh_hash = self.credentials.hash(&refresh_token)?;
        self.users
            .set_refresh_token_hash(user.id, Some(refresh_hash))
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The refresh token must carry a valid signature and match the hash
    /// stored at login. It is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.tokens.verify_refresh(refresh_token)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let stored = user.refresh_token_hash.as_deref().ok_or(AuthError::InvalidToken)?;
        if !self.credentials.verify(refresh_token, stored)? {
            tracing::warn!(user_id = %user.id, "Refresh token does not match stored hash");
            return Err(AuthError::InvalidToken);
        }

        self.tokens.issue_access(&user)
    }

    /// Revoke the stored refresh token
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.users.set_refresh_token_hash(user_id, None).await?;
        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    // ============================================
    // Request Authentication
    // ============================================

    /// Resolve a bearer token to the current user record
    ///
    /// Roles come from the fresh row, not from the token, and a deleted
    /// user is rejected even while their token is still valid.
    pub async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify_access(access_token).map_err(|_| AuthError::Unauthorized)?;

        self.users.find_by_id(claims.sub).await?.ok_or_else(|| {
            tracing::debug!(user_id = %claims.sub, "Token subject no longer exists");
            AuthError::Unauthorized
        })
    }
}
