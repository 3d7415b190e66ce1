//! User Management Models

use super::Pagination;

use eventhub_auth::{not_blank, Role, UserResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// `PUT /users/:id` body; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "not_blank", message = "Name is required")
    )]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(url(message = "Invalid avatar URL"), length(max = 500))]
    pub avatar_url: Option<String>,

    #[validate(length(max = 280, message = "Bio must be at most 280 characters"))]
    pub bio: Option<String>,

    /// Only honoured for admins
    pub roles: Option<Vec<Role>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<UserResponse>,
    pub pagination: Pagination,
}
