//! Notification Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    EventUpdated,
    EventCancelled,
    NewComment,
    CommentReply,
    RsvpUpdate,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub related_event_id: Option<Uuid>,
    pub related_comment_id: Option<Uuid>,
    pub related_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_event_id: Option<Uuid>,
    pub related_comment_id: Option<Uuid>,
    pub related_user_id: Option<Uuid>,
}

impl NewNotification {
    pub fn new(user_id: Uuid, kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            related_event_id: None,
            related_comment_id: None,
            related_user_id: None,
        }
    }

    pub fn event(mut self, id: Uuid) -> Self {
        self.related_event_id = Some(id);
        self
    }

    pub fn comment(mut self, id: Uuid) -> Self {
        self.related_comment_id = Some(id);
        self
    }

    pub fn from_user(mut self, id: Uuid) -> Self {
        self.related_user_id = Some(id);
        self
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MarkReadRequest {
    #[validate(length(min = 1, message = "At least one notification id is required"))]
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub total: i64,
    pub unread_count: i64,
    pub page: i64,
    pub total_pages: i64,
    pub has_more: bool,
}
