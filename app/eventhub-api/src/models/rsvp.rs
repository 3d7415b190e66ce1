//! RSVP Models

use super::UserSummary;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rsvp_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Attending,
    Maybe,
    Cancelled,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Attending => "attending",
            RsvpStatus::Maybe => "maybe",
            RsvpStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for RsvpStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attending" => Ok(RsvpStatus::Attending),
            "maybe" => Ok(RsvpStatus::Maybe),
            "cancelled" => Ok(RsvpStatus::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rsvp {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: RsvpStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `POST /events/:id/rsvp` body; the status is checked by hand for a clearer error
#[derive(Debug, Clone, Deserialize)]
pub struct RsvpRequest {
    pub status: String,
}

/// Number of RSVPs per status for one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RsvpCounts {
    pub attending: i64,
    pub maybe: i64,
    pub cancelled: i64,
}

impl RsvpCounts {
    /// Fold `(status, count)` groups; repeated statuses accumulate
    pub fn fold(groups: impl IntoIterator<Item = (RsvpStatus, i64)>) -> Self {
        groups
            .into_iter()
            .fold(Self::default(), |mut acc, (status, count)| {
                match status {
                    RsvpStatus::Attending => acc.attending += count,
                    RsvpStatus::Maybe => acc.maybe += count,
                    RsvpStatus::Cancelled => acc.cancelled += count,
                }
                acc
            })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RsvpView {
    #[serde(flatten)]
    pub rsvp: Rsvp,
    pub user: Option<UserSummary>,
}

/// `GET /events/:id/rsvps` payload
#[derive(Debug, Clone, Serialize)]
pub struct RsvpList {
    pub counts: RsvpCounts,
    pub rsvps: Vec<RsvpView>,
}
