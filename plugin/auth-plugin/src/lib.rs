//! EventHub Authentication
//!
//! Authentication and authorization for the EventHub API:
//! - User registration and login
//! - Separate JWT access and refresh tokens (HS256)
//! - Argon2id password and refresh token hashing
//! - Refresh token delivered in an HttpOnly cookie
//! - Role and ownership guards
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables, see [`AuthConfig`]:
//! - `ACCESS_TOKEN_SECRET` / `REFRESH_TOKEN_SECRET` - signing keys (required, min 32 chars, distinct)
//! - `ACCESS_TOKEN_EXPIRATION` - access token lifetime in seconds (default: 900)
//! - `REFRESH_TOKEN_EXPIRATION` - refresh token lifetime in seconds (default: 604800)
//! - `JWT_ISSUER` / `JWT_AUDIENCE` - claims (default: "eventhub" / "eventhub-api")
//! - `COOKIE_SECURE` - Secure flag on the refresh cookie (default: true)
//!
//! # Usage
//!
//! ```rust,ignore
//! use eventhub_auth::{run_migrations, AuthConfig, AuthService, PgUserStore};
//!
//! run_migrations(&db_pool).await?;
//! let users = Arc::new(PgUserStore::new(db_pool.clone()));
//! let auth = Arc::new(AuthService::new(users, AuthConfig::from_env()?)?);
//!
//! let app = Router::new().nest("/api/auth", eventhub_auth::create_routes(auth.clone()));
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod extractors;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod service;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::AuthUser;
pub use guard::{require_owner_or_roles, require_role};
pub use handlers::{create_routes, AuthState};
pub use models::*;
pub use service::AuthService;
pub use store::{run_migrations, PgUserStore, UserStore};
