//! Event Service

use super::{load_event, NotificationService};
use crate::error::{ApiError, ApiResult};
use crate::models::*;
use crate::repository::Repositories;

use chrono::{DateTime, Utc};
use eventhub_auth::{require_owner_or_roles, require_role, Role, User};
use uuid::Uuid;

#[derive(Clone)]
pub struct EventService {
    repos: Repositories,
    notifications: NotificationService,
}

/// Private events are visible to their organizer and to admins only
pub fn ensure_visible(event: &Event, viewer: Option<&User>) -> ApiResult<()> {
    if !event.is_private {
        return Ok(());
    }

    match viewer {
        None => Err(ApiError::Unauthorized("Event is private".to_string())),
        Some(user) => Ok(require_owner_or_roles(user, event.organizer_id, &[Role::Admin])?),
    }
}

fn check_schedule(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> ApiResult<()> {
    if start_at > end_at {
        return Err(ApiError::BadRequest(
            "End date must be after start date".to_string(),
        ));
    }
    Ok(())
}

fn visibility_for(viewer: Option<&User>) -> Visibility {
    match viewer {
        None => Visibility::PublicOnly,
        Some(user) if user.is_admin() => Visibility::Everything,
        Some(user) => Visibility::PublicOrOrganizedBy(user.id),
    }
}

impl EventService {
    pub const DEFAULT_LIMIT: i64 = 10;

    pub fn new(repos: Repositories, notifications: NotificationService) -> Self {
        Self {
            repos,
            notifications,
        }
    }

    pub async fn list(&self, viewer: Option<&User>, query: EventQuery) -> ApiResult<EventPage> {
        let paging = Paging::new(query.page, query.limit, Self::DEFAULT_LIMIT);

        let tags = query
            .tags
            .as_deref()
            .map(|raw| normalize_tags(raw.split(',').map(String::from).collect()))
            .unwrap_or_default();

        let filter = EventFilter {
            text: query
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(String::from),
            tags,
            from: query.from,
            to: query.to,
            visibility: visibility_for(viewer),
            sort: EventSort::parse(query.sort.as_deref()),
            limit: paging.limit,
            offset: paging.offset(),
        };

        let (events, total) = self.repos.events.search(&filter).await?;
        let now = Utc::now();

        Ok(EventPage {
            events: events.into_iter().map(|e| EventView::at(e, now)).collect(),
            pagination: Pagination::new(total, paging),
        })
    }

    pub async fn get(&self, viewer: Option<&User>, id: Uuid) -> ApiResult<EventView> {
        let event = load_event(&self.repos, id).await?;
        ensure_visible(&event, viewer)?;
        Ok(event.into())
    }

    pub async fn create(&self, user: &User, req: CreateEventRequest) -> ApiResult<EventView> {
        require_role(user, &[Role::Organizer, Role::Admin])?;
        check_schedule(req.start_at, req.end_at)?;

        let draft = EventDraft {
            title: req.title.trim().to_string(),
            description: req.description,
            start_at: req.start_at,
            end_at: req.end_at,
            location: req.location.trim().to_string(),
            is_online: req.is_online,
            online_url: req.online_url,
            capacity: req.capacity,
            is_private: req.is_private,
            tags: normalize_tags(req.tags),
            cover_image: req.cover_image,
            status: EventStatus::derive(req.start_at, req.end_at, Utc::now()),
        };

        let event = self.repos.events.create(user.id, &draft).await?;
        tracing::info!(event_id = %event.id, organizer_id = %user.id, "Event created");

        Ok(event.into())
    }

    pub async fn update(&self, user: &User, id: Uuid, req: UpdateEventRequest) -> ApiResult<EventView> {
        let event = load_event(&self.repos, id).await?;
        require_owner_or_roles(user, event.organizer_id, &[Role::Admin])?;

        let mut draft = req.apply(event.draft());
        check_schedule(draft.start_at, draft.end_at)?;
        draft.status = EventStatus::derive(draft.start_at, draft.end_at, Utc::now());

        let updated = self
            .repos
            .events
            .update(id, &draft)
            .await?
            .ok_or_else(|| ApiError::not_found("Event"))?;
        tracing::info!(event_id = %id, user_id = %user.id, "Event updated");

        self.notifications
            .notify_participants(
                &updated,
                user.id,
                NotificationKind::EventUpdated,
                "Event updated",
                &format!("\"{}\" has been updated", updated.title),
            )
            .await;

        Ok(updated.into())
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> ApiResult<()> {
        let event = load_event(&self.repos, id).await?;
        require_owner_or_roles(user, event.organizer_id, &[Role::Admin])?;

        // Participants are resolved while the RSVPs still exist
        self.notifications
            .notify_participants(
                &event,
                user.id,
                NotificationKind::EventCancelled,
                "Event cancelled",
                &format!("\"{}\" has been cancelled", event.title),
            )
            .await;

        if !self.repos.events.delete(id).await? {
            return Err(ApiError::not_found("Event"));
        }
        tracing::info!(event_id = %id, user_id = %user.id, "Event deleted");

        Ok(())
    }
}
