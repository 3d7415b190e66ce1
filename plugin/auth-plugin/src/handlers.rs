//! Authentication HTTP Handlers
//!
//! `/register`, `/login`, `/refresh` and `/logout`, meant to be nested under
//! `/api/auth`. The refresh token travels in the `refreshToken` cookie.

use crate::error::AuthError;
use crate::extractors::AuthUser;
use crate::middleware;
use crate::models::*;
use crate::service::AuthService;

use axum::{
    extract::{FromRequest, State},
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use validator::Validate;

/// Shared auth service state
pub type AuthState = Arc<AuthService>;

pub const REFRESH_COOKIE: &str = "refreshToken";
const REFRESH_COOKIE_PATH: &str = "/api/auth";

/// JSON body whose rejection renders the error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AuthError))]
pub struct JsonBody<T>(pub T);

// ============================================
// Route Builder
// ============================================

/// Create authentication routes
pub fn create_routes<S>(auth_service: AuthState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh));

    let protected = Router::new()
        .route("/logout", post(logout))
        .layer(axum_middleware::from_fn_with_state(
            auth_service.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(auth_service)
}

fn refresh_cookie(token: String, auth: &AuthService) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(auth.config().secure_cookies)
        .same_site(SameSite::Strict)
        .path(REFRESH_COOKIE_PATH)
        .max_age(time::Duration::seconds(auth.tokens().refresh_ttl()))
        .build()
}

// ============================================
// Registration
// ============================================

/// POST /auth/register
pub async fn register(
    State(auth): State<AuthState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()?;

    let user = auth.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            UserResponse::from(user),
            "User registered successfully",
        )),
    ))
}

// ============================================
// Login / Refresh / Logout
// ============================================

/// POST /auth/login
///
/// Returns both tokens in the body and sets the refresh cookie
pub async fn login(
    State(auth): State<AuthState>,
    jar: CookieJar,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()?;

    let outcome = auth.login(req).await?;
    let jar = jar.add(refresh_cookie(outcome.refresh_token.clone(), &auth));

    let body = AuthResponse {
        user: UserResponse::from(outcome.user),
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: auth.tokens().access_ttl(),
    };

    Ok((jar, Json(ApiResponse::ok(body, "Login successful"))))
}

/// POST /auth/refresh
pub async fn refresh(
    State(auth): State<AuthState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(AuthError::Unauthorized)?;

    let access_token = auth.refresh(&token).await?;

    Ok(Json(ApiResponse::ok(
        TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: auth.tokens().access_ttl(),
        },
        "Token refreshed",
    )))
}

/// POST /auth/logout
pub async fn logout(
    State(auth): State<AuthState>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    auth.logout(user.id).await?;

    let jar = jar.remove(Cookie::build(REFRESH_COOKIE).path(REFRESH_COOKIE_PATH));

    Ok((jar, Json(ApiResponse::message("Logged out successfully"))))
}
