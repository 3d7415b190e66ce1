//! RSVP Service
//!
//! Every write is followed by [`sync_event_counts`] so the counters stored on
//! the event match the RSVP rows.

use super::{load_event, user_summaries, NotificationService};
use crate::error::{ApiError, ApiResult};
use crate::models::*;
use crate::repository::{sync_event_counts, Repositories};

use eventhub_auth::{require_owner_or_roles, Role, User};
use uuid::Uuid;

#[derive(Clone)]
pub struct RsvpService {
    repos: Repositories,
    notifications: NotificationService,
}

impl RsvpService {
    pub fn new(repos: Repositories, notifications: NotificationService) -> Self {
        Self {
            repos,
            notifications,
        }
    }

    async fn resync(&self, event_id: Uuid) -> ApiResult<RsvpCounts> {
        sync_event_counts(self.repos.events.as_ref(), self.repos.rsvps.as_ref(), event_id).await
    }

    /// Create or update the caller's RSVP; the flag is true when it was created
    pub async fn respond(&self, user: &User, event_id: Uuid, req: RsvpRequest) -> ApiResult<(Rsvp, bool)> {
        let event = load_event(&self.repos, event_id).await?;
        if event.is_private {
            require_owner_or_roles(user, event.organizer_id, &[Role::Admin])?;
        }

        let status: RsvpStatus = req.status.parse().map_err(|_| {
            ApiError::BadRequest(
                "Invalid RSVP status. Must be one of: attending, maybe, cancelled".to_string(),
            )
        })?;

        if status == RsvpStatus::Attending {
            let already_attending = self
                .repos
                .rsvps
                .find_for_user(event_id, user.id)
                .await?
                .is_some_and(|r| r.status == RsvpStatus::Attending);

            if !already_attending {
                let counts = self.repos.rsvps.counts(event_id).await?;
                if counts.attending >= i64::from(event.capacity) {
                    return Err(ApiError::Conflict("Event is full".to_string()));
                }
            }
        }

        let (rsvp, created) = self.repos.rsvps.upsert(event_id, user.id, status).await?;
        self.resync(event_id).await?;

        tracing::info!(
            event_id = %event_id,
            user_id = %user.id,
            status = ?status,
            created,
            "RSVP saved"
        );

        if event.organizer_id != user.id {
            self.notifications
                .notify(
                    NewNotification::new(
                        event.organizer_id,
                        NotificationKind::RsvpUpdate,
                        "RSVP update",
                        format!("{} responded \"{}\" to \"{}\"", user.name, status.as_str(), event.title),
                    )
                    .event(event.id)
                    .from_user(user.id),
                )
                .await;
        }

        Ok((rsvp, created))
    }

    /// Delete the caller's own RSVP to an event
    pub async fn withdraw(&self, user: &User, event_id: Uuid) -> ApiResult<()> {
        load_event(&self.repos, event_id).await?;

        let rsvp = self
            .repos
            .rsvps
            .find_for_user(event_id, user.id)
            .await?
            .ok_or_else(|| ApiError::not_found("RSVP"))?;

        self.repos.rsvps.delete(rsvp.id).await?;
        self.resync(event_id).await?;

        tracing::info!(event_id = %event_id, user_id = %user.id, "RSVP withdrawn");
        Ok(())
    }

    pub async fn list(&self, user: &User, event_id: Uuid) -> ApiResult<RsvpList> {
        let event = load_event(&self.repos, event_id).await?;
        require_owner_or_roles(user, event.organizer_id, &[Role::Admin])?;

        let rsvps = self.repos.rsvps.list_for_event(event_id).await?;
        let counts = RsvpCounts::fold(rsvps.iter().map(|r| (r.status, 1)));
        let mut users = user_summaries(&self.repos, rsvps.iter().map(|r| r.user_id).collect::<Vec<Uuid>>()).await?;

        let rsvps = rsvps
            .into_iter()
            .map(|rsvp| RsvpView {
                user: users.remove(&rsvp.user_id),
                rsvp,
            })
            .collect();

        Ok(RsvpList { counts, rsvps })
    }

    /// Delete any RSVP of an event (its owner or an admin)
    pub async fn remove(&self, user: &User, event_id: Uuid, rsvp_id: Uuid) -> ApiResult<()> {
        load_event(&self.repos, event_id).await?;

        let rsvp = self
            .repos
            .rsvps
            .find_by_id(rsvp_id)
            .await?
            .filter(|r| r.event_id == event_id)
            .ok_or_else(|| ApiError::not_found("RSVP"))?;

        require_owner_or_roles(user, rsvp.user_id, &[Role::Admin])?;

        self.repos.rsvps.delete(rsvp_id).await?;
        self.resync(event_id).await?;

        tracing::info!(event_id = %event_id, rsvp_id = %rsvp_id, user_id = %user.id, "RSVP deleted");
        Ok(())
    }
}
