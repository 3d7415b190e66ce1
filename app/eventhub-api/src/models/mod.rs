//! EventHub Data Models

pub mod comment;
pub mod event;
pub mod notification;
pub mod rsvp;
pub mod user;

pub use comment::*;
pub use event::*;
pub use notification::*;
pub use rsvp::*;
pub use user::*;

use eventhub_auth::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Page and limit query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub limit: i64,
}

impl Paging {
    pub const MAX_LIMIT: i64 = 100;
    /// Keeps `page * limit` well inside `i64`
    pub const MAX_PAGE: i64 = 1_000_000;

    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, Self::MAX_PAGE),
            limit: limit.unwrap_or(default_limit).clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }

    pub fn has_more(&self, total: i64) -> bool {
        self.page * self.limit < total
    }
}

/// Pagination metadata for list responses
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(total: i64, paging: Paging) -> Self {
        Self {
            total,
            page: paging.page,
            pages: paging.total_pages(total),
            limit: paging.limit,
        }
    }
}

/// Public author information attached to RSVPs and comments
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}
