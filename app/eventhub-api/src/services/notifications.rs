//! Notification Service

use crate::error::{ApiError, ApiResult};
use crate::models::*;
use crate::repository::Repositories;

use eventhub_auth::{require_owner_or_roles, Role, User};
use uuid::Uuid;

#[derive(Clone)]
pub struct NotificationService {
    repos: Repositories,
}

impl NotificationService {
    pub const DEFAULT_LIMIT: i64 = 20;

    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Store a notification; failures are logged and swallowed
    pub async fn notify(&self, notification: NewNotification) {
        let user_id = notification.user_id;
        let kind = notification.kind;

        if let Err(e) = self.repos.notifications.create(notification).await {
            tracing::warn!(user_id = %user_id, ?kind, error = %e, "Failed to create notification");
        }
    }

    /// Notify everyone attending or maybe-attending `event`, except `actor`
    pub async fn notify_participants(
        &self,
        event: &Event,
        actor: Uuid,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) {
        let rsvps = match self.repos.rsvps.list_for_event(event.id).await {
            Ok(rsvps) => rsvps,
            Err(e) => {
                tracing::warn!(event_id = %event.id, error = %e, "Failed to load participants");
                return;
            }
        };

        for rsvp in rsvps {
            if rsvp.user_id == actor || rsvp.status == RsvpStatus::Cancelled {
                continue;
            }
            self.notify(
                NewNotification::new(rsvp.user_id, kind, title, message)
                    .event(event.id)
                    .from_user(actor),
            )
            .await;
        }
    }

    pub async fn list(&self, user: &User, params: PageParams) -> ApiResult<NotificationPage> {
        let paging = Paging::new(params.page, params.limit, Self::DEFAULT_LIMIT);

        let (notifications, total) = self
            .repos
            .notifications
            .list_for_user(user.id, paging.limit, paging.offset())
            .await?;
        let unread_count = self.repos.notifications.unread_count(user.id).await?;

        Ok(NotificationPage {
            notifications,
            total,
            unread_count,
            page: paging.page,
            total_pages: paging.total_pages(total),
            has_more: paging.has_more(total),
        })
    }

    /// Mark the caller's notifications read; returns how many changed
    pub async fn mark_read(&self, user: &User, ids: &[Uuid]) -> ApiResult<u64> {
        let updated = self.repos.notifications.mark_read(user.id, ids).await?;
        tracing::debug!(user_id = %user.id, updated, "Notifications marked read");
        Ok(updated)
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> ApiResult<()> {
        let notification = self
            .repos
            .notifications
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Notification"))?;

        require_owner_or_roles(user, notification.user_id, &[Role::Admin])?;

        self.repos.notifications.delete(id).await?;
        Ok(())
    }
}
