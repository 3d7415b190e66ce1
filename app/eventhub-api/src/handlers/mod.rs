//! EventHub API Handlers

pub mod comments;
pub mod events;
pub mod health;
pub mod notifications;
pub mod rsvps;
pub mod users;

use crate::error::ApiError;

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Invalid route".to_string())
}
