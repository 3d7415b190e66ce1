//! Event Handlers

use crate::error::ApiResult;
use crate::extractors::{AppJson, AppPath, AppQuery};
use crate::models::*;
use crate::AppState;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use eventhub_auth::{ApiResponse, AuthUser};
use uuid::Uuid;
use validator::Validate;

/// GET /events - List visible events
pub async fn list_events(
    State(services): State<AppState>,
    viewer: Option<AuthUser>,
    AppQuery(query): AppQuery<EventQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = services.events.list(viewer.as_deref(), query).await?;
    Ok(Json(ApiResponse::ok(page, "Events retrieved successfully")))
}

/// GET /events/:id - Get one event
pub async fn get_event(
    State(services): State<AppState>,
    viewer: Option<AuthUser>,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let event = services.events.get(viewer.as_deref(), id).await?;
    Ok(Json(ApiResponse::ok(event, "Event retrieved successfully")))
}

/// POST /events - Create an event (organizers and admins)
pub async fn create_event(
    State(services): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<CreateEventRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let event = services.events.create(&user, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(event, "Event created successfully")),
    ))
}

/// PUT /events/:id - Update an event (organizer or admin)
pub async fn update_event(
    State(services): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateEventRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let event = services.events.update(&user, id, req).await?;
    Ok(Json(ApiResponse::ok(event, "Event updated successfully")))
}

/// DELETE /events/:id - Delete an event (organizer or admin)
pub async fn delete_event(
    State(services): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    services.events.delete(&user, id).await?;
    Ok(Json(ApiResponse::message("Event deleted successfully")))
}
