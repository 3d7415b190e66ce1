//! RSVP Handlers

use crate::error::ApiResult;
use crate::extractors::{AppJson, AppPath};
use crate::models::*;
use crate::AppState;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use eventhub_auth::{ApiResponse, AuthUser};
use uuid::Uuid;

/// POST /events/:id/rsvp - Create or update the caller's RSVP
pub async fn respond(
    State(services): State<AppState>,
    user: AuthUser,
    AppPath(event_id): AppPath<Uuid>,
    AppJson(req): AppJson<RsvpRequest>,
) -> ApiResult<impl IntoResponse> {
    let (rsvp, created) = services.rsvps.respond(&user, event_id, req).await?;

    let (status, message) = if created {
        (StatusCode::CREATED, "RSVP created successfully")
    } else {
        (StatusCode::OK, "RSVP updated successfully")
    };

    Ok((status, Json(ApiResponse::ok(rsvp, message))))
}

/// DELETE /events/:id/rsvp - Withdraw the caller's RSVP
pub async fn withdraw(
    State(services): State<AppState>,
    user: AuthUser,
    AppPath(event_id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    services.rsvps.withdraw(&user, event_id).await?;
    Ok(Json(ApiResponse::message("RSVP deleted successfully")))
}

/// GET /events/:id/rsvps - All RSVPs of an event (organizer or admin)
pub async fn list_rsvps(
    State(services): State<AppState>,
    user: AuthUser,
    AppPath(event_id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let list = services.rsvps.list(&user, event_id).await?;
    Ok(Json(ApiResponse::ok(list, "RSVPs retrieved successfully")))
}

/// DELETE /events/:id/rsvps/:rsvp_id - Delete an RSVP (its owner or admin)
pub async fn delete_rsvp(
    State(services): State<AppState>,
    user: AuthUser,
    AppPath((event_id, rsvp_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    services.rsvps.remove(&user, event_id, rsvp_id).await?;
    Ok(Json(ApiResponse::message("RSVP deleted successfully")))
}
