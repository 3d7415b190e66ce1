//! PostgreSQL Repositories

use super::{CommentRepository, EventRepository, NotificationRepository, RsvpRepository};
use crate::error::{ApiError, ApiResult};
use crate::models::*;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

// ============================================
// Events
// ============================================

pub struct PgEventRepository {
    db: PgPool,
}

impl PgEventRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const SEARCH_DOCUMENT: &str = "to_tsvector('english', title || ' ' || description || ' ' || location)";

fn push_event_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &EventFilter) {
    if let Some(text) = &filter.text {
        qb.push(" AND ")
            .push(SEARCH_DOCUMENT)
            .push(" @@ plainto_tsquery('english', ")
            .push_bind(text.clone())
            .push(")");
    }
    if !filter.tags.is_empty() {
        qb.push(" AND tags && ").push_bind(filter.tags.clone());
    }
    if let Some(from) = filter.from {
        qb.push(" AND start_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND start_at <= ").push_bind(to);
    }
    match filter.visibility {
        Visibility::Everything => {}
        Visibility::PublicOnly => {
            qb.push(" AND is_private = FALSE");
        }
        Visibility::PublicOrOrganizedBy(user_id) => {
            qb.push(" AND (is_private = FALSE OR organizer_id = ")
                .push_bind(user_id)
                .push(")");
        }
    }
}

fn clamp_count(count: i64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create(&self, organizer_id: Uuid, draft: &EventDraft) -> ApiResult<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events
                (organizer_id, title, description, start_at, end_at, location, is_online,
                 online_url, capacity, is_private, tags, cover_image, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(organizer_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.start_at)
        .bind(draft.end_at)
        .bind(&draft.location)
        .bind(draft.is_online)
        .bind(&draft.online_url)
        .bind(draft.capacity)
        .bind(draft.is_private)
        .bind(&draft.tags)
        .bind(&draft.cover_image)
        .bind(draft.status)
        .fetch_one(&self.db)
        .await?;

        Ok(event)
    }

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Event>> {
        let event = sqlx::query_as("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(event)
    }

    async fn update(&self, id: Uuid, draft: &EventDraft) -> ApiResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events SET
                title = $2, description = $3, start_at = $4, end_at = $5, location = $6,
                is_online = $7, online_url = $8, capacity = $9, is_private = $10,
                tags = $11, cover_image = $12, status = $13, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.start_at)
        .bind(draft.end_at)
        .bind(&draft.location)
        .bind(draft.is_online)
        .bind(&draft.online_url)
        .bind(draft.capacity)
        .bind(draft.is_private)
        .bind(&draft.tags)
        .bind(&draft.cover_image)
        .bind(draft.status)
        .fetch_optional(&self.db)
        .await?;

        Ok(event)
    }

    async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, filter: &EventFilter) -> ApiResult<(Vec<Event>, i64)> {
        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM events WHERE TRUE");
        push_event_filters(&mut select, filter);
        select
            .push(" ORDER BY ")
            .push(filter.sort.column())
            .push(" ASC, id ASC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let events = select.build_query_as::<Event>().fetch_all(&self.db).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM events WHERE TRUE");
        push_event_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.db).await?;

        Ok((events, total))
    }

    async fn set_counts(&self, id: Uuid, attending: i64, maybe: i64) -> ApiResult<()> {
        sqlx::query("UPDATE events SET attendees_count = $2, maybes_count = $3 WHERE id = $1")
            .bind(id)
            .bind(clamp_count(attending))
            .bind(clamp_count(maybe))
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

// ============================================
// RSVPs
// ============================================

pub struct PgRsvpRepository {
    db: PgPool,
}

impl PgRsvpRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(FromRow)]
struct UpsertedRsvp {
    #[sqlx(flatten)]
    rsvp: Rsvp,
    inserted: bool,
}

#[async_trait]
impl RsvpRepository for PgRsvpRepository {
    async fn upsert(&self, event_id: Uuid, user_id: Uuid, status: RsvpStatus) -> ApiResult<(Rsvp, bool)> {
        // xmax is zero only for a freshly inserted tuple
        let row = sqlx::query_as::<_, UpsertedRsvp>(
            r#"
            INSERT INTO rsvps (event_id, user_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id, user_id)
            DO UPDATE SET status = EXCLUDED.status, updated_at = NOW()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        Ok((row.rsvp, row.inserted))
    }

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Rsvp>> {
        let rsvp = sqlx::query_as("SELECT * FROM rsvps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(rsvp)
    }

    async fn find_for_user(&self, event_id: Uuid, user_id: Uuid) -> ApiResult<Option<Rsvp>> {
        let rsvp = sqlx::query_as("SELECT * FROM rsvps WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(rsvp)
    }

    async fn list_for_event(&self, event_id: Uuid) -> ApiResult<Vec<Rsvp>> {
        let rsvps = sqlx::query_as("SELECT * FROM rsvps WHERE event_id = $1 ORDER BY created_at ASC")
            .bind(event_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rsvps)
    }

    async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM rsvps WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Uuid>> {
        let event_ids = sqlx::query_scalar("DELETE FROM rsvps WHERE user_id = $1 RETURNING event_id")
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;
        Ok(event_ids)
    }

    async fn counts(&self, event_id: Uuid) -> ApiResult<RsvpCounts> {
        let groups: Vec<(RsvpStatus, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM rsvps WHERE event_id = $1 GROUP BY status",
        )
        .bind(event_id)
        .fetch_all(&self.db)
        .await?;

        Ok(RsvpCounts::fold(groups))
    }
}

// ============================================
// Comments
// ============================================

pub struct PgCommentRepository {
    db: PgPool,
}

impl PgCommentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn exists(&self, id: Uuid) -> ApiResult<bool> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, comment: NewComment) -> ApiResult<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (event_id, user_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(comment.event_id)
        .bind(comment.user_id)
        .bind(comment.parent_id)
        .bind(&comment.content)
        .fetch_one(&self.db)
        .await?;

        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Comment>> {
        let comment = sqlx::query_as("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(comment)
    }

    async fn list_top_level(&self, event_id: Uuid, limit: i64, offset: i64) -> ApiResult<(Vec<Comment>, i64)> {
        let comments = sqlx::query_as(
            r#"
            SELECT * FROM comments
            WHERE event_id = $1 AND parent_id IS NULL
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(event_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comments WHERE event_id = $1 AND parent_id IS NULL",
        )
        .bind(event_id)
        .fetch_one(&self.db)
        .await?;

        Ok((comments, total))
    }

    async fn list_replies(&self, parent_ids: &[Uuid]) -> ApiResult<Vec<Comment>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let replies = sqlx::query_as(
            "SELECT * FROM comments WHERE parent_id = ANY($1) ORDER BY created_at ASC",
        )
        .bind(parent_ids)
        .fetch_all(&self.db)
        .await?;
        Ok(replies)
    }

    async fn add_like(&self, id: Uuid, user_id: Uuid) -> ApiResult<Comment> {
        let liked = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET liked_by = array_append(liked_by, $2), likes = likes + 1
            WHERE id = $1 AND NOT ($2 = ANY(liked_by))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        match liked {
            Some(comment) => Ok(comment),
            None if self.exists(id).await? => Err(ApiError::Conflict(
                "You have already liked this comment".to_string(),
            )),
            None => Err(ApiError::not_found("Comment")),
        }
    }

    async fn remove_like(&self, id: Uuid, user_id: Uuid) -> ApiResult<Comment> {
        let unliked = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET liked_by = array_remove(liked_by, $2), likes = GREATEST(likes - 1, 0)
            WHERE id = $1 AND $2 = ANY(liked_by)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        match unliked {
            Some(comment) => Ok(comment),
            None if self.exists(id).await? => Err(ApiError::BadRequest(
                "You have not liked this comment".to_string(),
            )),
            None => Err(ApiError::not_found("Comment")),
        }
    }

    async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 OR parent_id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> ApiResult<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}

// ============================================
// Notifications
// ============================================

pub struct PgNotificationRepository {
    db: PgPool,
}

impl PgNotificationRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: NewNotification) -> ApiResult<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications
                (user_id, kind, title, message, related_event_id, related_comment_id, related_user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(notification.user_id)
        .bind(notification.kind)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.related_event_id)
        .bind(notification.related_comment_id)
        .bind(notification.related_user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(notification)
    }

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Notification>> {
        let notification = sqlx::query_as("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(notification)
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64, offset: i64) -> ApiResult<(Vec<Notification>, i64)> {
        let notifications = sqlx::query_as(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;

        Ok((notifications, total))
    }

    async fn unread_count(&self, user_id: Uuid) -> ApiResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    async fn mark_read(&self, user_id: Uuid, ids: &[Uuid]) -> ApiResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications SET is_read = TRUE, updated_at = NOW()
            WHERE user_id = $1 AND id = ANY($2) AND is_read = FALSE
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> ApiResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
