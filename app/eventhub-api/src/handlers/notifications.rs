//! Notification Handlers
//!
//! Mounted behind `require_auth`, so `AuthUser` comes from request extensions.

use crate::error::ApiResult;
use crate::extractors::{AppJson, AppPath, AppQuery};
use crate::models::*;
use crate::AppState;

use axum::{extract::State, response::IntoResponse, Json};
use eventhub_auth::{ApiResponse, AuthUser};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// GET /notifications - The caller's notifications, newest first
pub async fn list_notifications(
    State(services): State<AppState>,
    user: AuthUser,
    AppQuery(params): AppQuery<PageParams>,
) -> ApiResult<impl IntoResponse> {
    let page = services.notifications.list(&user, params).await?;
    Ok(Json(ApiResponse::ok(page, "Notifications retrieved successfully")))
}

/// POST /notifications/read - Mark notifications read
pub async fn mark_read(
    State(services): State<AppState>,
    user: AuthUser,
    AppJson(req): AppJson<MarkReadRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let updated = services.notifications.mark_read(&user, &req.ids).await?;
    Ok(Json(ApiResponse::ok(
        json!({ "updated": updated }),
        "Notifications marked as read",
    )))
}

/// DELETE /notifications/:id - Delete a notification (recipient or admin)
pub async fn delete_notification(
    State(services): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    services.notifications.delete(&user, id).await?;
    Ok(Json(ApiResponse::message("Notification deleted successfully")))
}
