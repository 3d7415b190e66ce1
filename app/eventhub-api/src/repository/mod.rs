//! Resource Repositories
//!
//! One trait per aggregate, shared behind `Arc<dyn _>`. `postgres` holds the
//! sqlx implementations; `memory` backs the HTTP tests.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use crate::error::ApiResult;
use crate::models::*;

use async_trait::async_trait;
use eventhub_auth::{PgUserStore, UserStore};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, organizer_id: Uuid, draft: &EventDraft) -> ApiResult<Event>;

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Event>>;

    async fn update(&self, id: Uuid, draft: &EventDraft) -> ApiResult<Option<Event>>;

    /// Delete an event; its RSVPs and comments go with it
    async fn delete(&self, id: Uuid) -> ApiResult<bool>;

    /// One page of matching events plus the total matching count
    async fn search(&self, filter: &EventFilter) -> ApiResult<(Vec<Event>, i64)>;

    async fn set_counts(&self, id: Uuid, attending: i64, maybe: i64) -> ApiResult<()>;
}

#[async_trait]
pub trait RsvpRepository: Send + Sync {
    /// Create or update the caller's RSVP; the flag is true when a row was created
    async fn upsert(&self, event_id: Uuid, user_id: Uuid, status: RsvpStatus) -> ApiResult<(Rsvp, bool)>;

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Rsvp>>;

    async fn find_for_user(&self, event_id: Uuid, user_id: Uuid) -> ApiResult<Option<Rsvp>>;

    async fn list_for_event(&self, event_id: Uuid) -> ApiResult<Vec<Rsvp>>;

    async fn delete(&self, id: Uuid) -> ApiResult<bool>;

    /// Delete every RSVP of a user, returning the events they belonged to
    async fn delete_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Uuid>>;

    async fn counts(&self, event_id: Uuid) -> ApiResult<RsvpCounts>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> ApiResult<Comment>;

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Comment>>;

    /// Top-level comments of an event, newest first, plus their total
    async fn list_top_level(&self, event_id: Uuid, limit: i64, offset: i64) -> ApiResult<(Vec<Comment>, i64)>;

    /// Direct replies to any of `parent_ids`, oldest first
    async fn list_replies(&self, parent_ids: &[Uuid]) -> ApiResult<Vec<Comment>>;

    /// Record a like; `Conflict` if the user already liked the comment
    async fn add_like(&self, id: Uuid, user_id: Uuid) -> ApiResult<Comment>;

    /// Withdraw a like; `BadRequest` if the user has not liked the comment
    async fn remove_like(&self, id: Uuid, user_id: Uuid) -> ApiResult<Comment>;

    /// Delete a comment together with its replies
    async fn delete(&self, id: Uuid) -> ApiResult<bool>;

    async fn delete_for_user(&self, user_id: Uuid) -> ApiResult<u64>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: NewNotification) -> ApiResult<Notification>;

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Notification>>;

    /// A user's notifications, newest first, plus their total
    async fn list_for_user(&self, user_id: Uuid, limit: i64, offset: i64) -> ApiResult<(Vec<Notification>, i64)>;

    async fn unread_count(&self, user_id: Uuid) -> ApiResult<i64>;

    /// Mark the given notifications read, ignoring ids the user does not own
    async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> ApiResult<u64>;

    async fn delete(&self, id: Uuid) -> ApiResult<bool>;

    async fn delete_for_user(&self, user_id: Uuid) -> ApiResult<u64>;
}

/// Recompute an event's attending/maybe counters from its RSVPs
///
/// Runs after every RSVP write. The aggregate is rebuilt from scratch, so a
/// missed or concurrent run is corrected by the next one.
pub async fn sync_event_counts(
    events: &dyn EventRepository,
    rsvps: &dyn RsvpRepository,
    event_id: Uuid,
) -> ApiResult<RsvpCounts> {
    let counts = rsvps.counts(event_id).await?;
    events.set_counts(event_id, counts.attending, counts.maybe).await?;

    tracing::debug!(
        event_id = %event_id,
        attending = counts.attending,
        maybe = counts.maybe,
        "Event counts recomputed"
    );

    Ok(counts)
}

/// All repositories used by the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserStore>,
    pub events: Arc<dyn EventRepository>,
    pub rsvps: Arc<dyn RsvpRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            events: Arc::new(postgres::PgEventRepository::new(pool.clone())),
            rsvps: Arc::new(postgres::PgRsvpRepository::new(pool.clone())),
            comments: Arc::new(postgres::PgCommentRepository::new(pool.clone())),
            notifications: Arc::new(postgres::PgNotificationRepository::new(pool)),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            users: store.clone(),
            events: store.clone(),
            rsvps: store.clone(),
            comments: store.clone(),
            notifications: store,
        }
    }
}
