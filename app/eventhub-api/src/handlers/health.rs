use axum::{response::IntoResponse, Json};
use eventhub_auth::ApiResponse;
use serde_json::json;

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok(json!({ "message": "OK" }), "Success"))
}
