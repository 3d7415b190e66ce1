//! Authentication Middleware

use crate::error::AuthError;
use crate::extractors::bearer_token;
use crate::service::AuthService;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Require an authenticated user
///
/// Resolves the bearer token and stores the `User` in request extensions,
/// where the `AuthUser` extractor picks it up without a second lookup.
pub async fn require_auth(
    State(auth): State<Arc<AuthService>>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let (mut parts, body) = req.into_parts();

    let token = bearer_token(&parts)?;
    let user = auth.authenticate(token).await?;

    parts.extensions.insert(user);

    Ok(next.run(Request::from_parts(parts, body)).await)
}
