//! Event Models

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use eventhub_auth::not_blank;
use uuid::Uuid;
use validator::Validate;

/// Event lifecycle status, derived from the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl EventStatus {
    /// Status of an event scheduled from `start_at` to `end_at`, as seen at `now`
    pub fn derive(start_at: DateTime<Utc>, end_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if end_at < now {
            EventStatus::Completed
        } else if start_at <= now {
            EventStatus::Ongoing
        } else {
            EventStatus::Upcoming
        }
    }
}

/// Event row
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub location: String,
    pub is_online: bool,
    pub online_url: Option<String>,
    pub organizer_id: Uuid,
    pub capacity: i32,
    pub is_private: bool,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub status: EventStatus,
    pub attendees_count: i32,
    pub maybes_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.attendees_count >= self.capacity
    }

    /// Editable fields of this event, as a starting point for an update
    pub fn draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            start_at: self.start_at,
            end_at: self.end_at,
            location: self.location.clone(),
            is_online: self.is_online,
            online_url: self.online_url.clone(),
            capacity: self.capacity,
            is_private: self.is_private,
            tags: self.tags.clone(),
            cover_image: self.cover_image.clone(),
            status: self.status,
        }
    }
}

/// Event as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub is_full: bool,
}

impl EventView {
    /// Wrap an event, recomputing its status for `now`
    pub fn at(mut event: Event, now: DateTime<Utc>) -> Self {
        event.status = EventStatus::derive(event.start_at, event.end_at, now);
        let is_full = event.is_full();
        Self { event, is_full }
    }
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self::at(event, Utc::now())
    }
}

/// Everything written on insert or update
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub location: String,
    pub is_online: bool,
    pub online_url: Option<String>,
    pub capacity: i32,
    pub is_private: bool,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub status: EventStatus,
}

/// Trim tags, drop empty ones and duplicates, keeping first-seen order
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

// ============================================
// Request DTOs
// ============================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(
        length(max = 200, message = "Title must be at most 200 characters"),
        custom(function = "not_blank", message = "Title is required")
    )]
    pub title: String,

    #[validate(
        length(max = 5000, message = "Description must be at most 5000 characters"),
        custom(function = "not_blank", message = "Description is required")
    )]
    pub description: String,

    pub start_at: DateTime<Utc>,

    pub end_at: DateTime<Utc>,

    #[validate(
        length(max = 300, message = "Location must be at most 300 characters"),
        custom(function = "not_blank", message = "Location is required")
    )]
    pub location: String,

    #[serde(default)]
    pub is_online: bool,

    #[validate(url(message = "Invalid online URL"))]
    pub online_url: Option<String>,

    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: i32,

    #[serde(default)]
    pub is_private: bool,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 tags"))]
    pub tags: Vec<String>,

    #[validate(url(message = "Invalid cover image URL"))]
    pub cover_image: Option<String>,
}

/// Partial update; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[validate(
        length(max = 200, message = "Title must be at most 200 characters"),
        custom(function = "not_blank", message = "Title is required")
    )]
    pub title: Option<String>,

    #[validate(
        length(max = 5000, message = "Description must be at most 5000 characters"),
        custom(function = "not_blank", message = "Description is required")
    )]
    pub description: Option<String>,

    pub start_at: Option<DateTime<Utc>>,

    pub end_at: Option<DateTime<Utc>>,

    #[validate(
        length(max = 300, message = "Location must be at most 300 characters"),
        custom(function = "not_blank", message = "Location is required")
    )]
    pub location: Option<String>,

    pub is_online: Option<bool>,

    #[validate(url(message = "Invalid online URL"))]
    pub online_url: Option<String>,

    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,

    pub is_private: Option<bool>,

    #[validate(length(max = 20, message = "At most 20 tags"))]
    pub tags: Option<Vec<String>>,

    #[validate(url(message = "Invalid cover image URL"))]
    pub cover_image: Option<String>,
}

impl UpdateEventRequest {
    /// Overlay the provided fields onto `draft`
    pub fn apply(self, mut draft: EventDraft) -> EventDraft {
        if let Some(title) = self.title {
            draft.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(start_at) = self.start_at {
            draft.start_at = start_at;
        }
        if let Some(end_at) = self.end_at {
            draft.end_at = end_at;
        }
        if let Some(location) = self.location {
            draft.location = location.trim().to_string();
        }
        if let Some(is_online) = self.is_online {
            draft.is_online = is_online;
        }
        if self.online_url.is_some() {
            draft.online_url = self.online_url;
        }
        if let Some(capacity) = self.capacity {
            draft.capacity = capacity;
        }
        if let Some(is_private) = self.is_private {
            draft.is_private = is_private;
        }
        if let Some(tags) = self.tags {
            draft.tags = normalize_tags(tags);
        }
        if self.cover_image.is_some() {
            draft.cover_image = self.cover_image;
        }
        draft
    }
}

// ============================================
// Listing
// ============================================

/// `GET /events` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    pub q: Option<String>,
    pub tags: Option<String>, // comma-separated
    #[serde(default, deserialize_with = "date_bound")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "date_bound")]
    pub to: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` meaning midnight UTC
pub fn parse_date_bound(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    let midnight = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

fn date_bound<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_date_bound(raw.trim())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date `{raw}`"))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventSort {
    #[default]
    StartAt,
    EndAt,
    CreatedAt,
    Title,
}

impl EventSort {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("endAt") => EventSort::EndAt,
            Some("createdAt") => EventSort::CreatedAt,
            Some("title") => EventSort::Title,
            _ => EventSort::StartAt,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            EventSort::StartAt => "start_at",
            EventSort::EndAt => "end_at",
            EventSort::CreatedAt => "created_at",
            EventSort::Title => "title",
        }
    }
}

/// Which private events a listing may include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    PublicOnly,
    PublicOrOrganizedBy(Uuid),
    Everything,
}

/// Resolved search criteria handed to the repository
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub text: Option<String>,
    pub tags: Vec<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub visibility: Visibility,
    pub sort: EventSort,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventPage {
    pub events: Vec<EventView>,
    pub pagination: super::Pagination,
}
