//! User Handlers

use crate::error::ApiResult;
use crate::extractors::{AppJson, AppPath, AppQuery};
use crate::models::*;
use crate::AppState;

use axum::{extract::State, response::IntoResponse, Json};
use eventhub_auth::{ApiResponse, AuthUser, UserQuery};
use uuid::Uuid;
use validator::Validate;

/// GET /users - List users (admin)
pub async fn list_users(
    State(services): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<UserQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = services.users.list(&user, query).await?;
    Ok(Json(ApiResponse::ok(page, "Users retrieved successfully")))
}

/// GET /users/:id - Public profile
pub async fn get_user(
    State(services): State<AppState>,
    viewer: Option<AuthUser>,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let profile = services.users.get(viewer.as_deref(), id).await?;
    Ok(Json(ApiResponse::ok(profile, "User retrieved successfully")))
}

/// PUT /users/:id - Update a profile (the user or admin)
pub async fn update_user(
    State(services): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let updated = services.users.update(&user, id, req).await?;
    Ok(Json(ApiResponse::ok(updated, "User updated successfully")))
}

/// DELETE /users/:id - Delete an account (the user or admin)
pub async fn delete_user(
    State(services): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    services.users.delete(&user, id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}
