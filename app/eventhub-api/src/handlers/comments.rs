//! Comment Handlers

use crate::error::ApiResult;
use crate::extractors::{AppJson, AppPath, AppQuery};
use crate::models::*;
use crate::AppState;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use eventhub_auth::{ApiResponse, AuthUser};
use uuid::Uuid;
use validator::Validate;

/// GET /events/:id/comments - Paginated comment threads
pub async fn list_comments(
    State(services): State<AppState>,
    viewer: Option<AuthUser>,
    AppPath(event_id): AppPath<Uuid>,
    AppQuery(params): AppQuery<PageParams>,
) -> ApiResult<impl IntoResponse> {
    let page = services
        .comments
        .list(viewer.as_deref(), event_id, params)
        .await?;
    Ok(Json(ApiResponse::ok(page, "Comments retrieved successfully")))
}

/// POST /events/:id/comments - Comment on an event or reply to a comment
pub async fn create_comment(
    State(services): State<AppState>,
    user: AuthUser,
    AppPath(event_id): AppPath<Uuid>,
    AppJson(req): AppJson<CreateCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let comment = services.comments.create(&user, event_id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(comment, "Comment added successfully")),
    ))
}

/// POST /events/:id/comments/:comment_id/like - Like or unlike
pub async fn toggle_like(
    State(services): State<AppState>,
    user: AuthUser,
    AppPath((event_id, comment_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    let (comment, liked) = services
        .comments
        .toggle_like(&user, event_id, comment_id)
        .await?;

    let message = if liked { "Comment liked" } else { "Comment unliked" };
    Ok(Json(ApiResponse::ok(comment, message)))
}

/// DELETE /events/:id/comments/:comment_id - Delete a comment and its replies
pub async fn delete_comment(
    State(services): State<AppState>,
    user: AuthUser,
    AppPath((event_id, comment_id)): AppPath<(Uuid, Uuid)>,
) -> ApiResult<impl IntoResponse> {
    services.comments.delete(&user, event_id, comment_id).await?;
    Ok(Json(ApiResponse::message("Comment deleted successfully")))
}
