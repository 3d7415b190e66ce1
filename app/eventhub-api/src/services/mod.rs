//! EventHub Services
//!
//! Business rules on top of the repositories. Services take the resolved
//! caller (`&User`) and return `ApiResult`; handlers only adapt HTTP.

pub mod comments;
pub mod events;
pub mod notifications;
pub mod rsvps;
pub mod users;

pub use comments::CommentService;
pub use events::{ensure_visible, EventService};
pub use notifications::NotificationService;
pub use rsvps::RsvpService;
pub use users::UserService;

use crate::error::{ApiError, ApiResult};
use crate::models::{Event, UserSummary};
use crate::repository::Repositories;

use std::collections::HashMap;
use uuid::Uuid;

/// Load an event or fail with `NotFound`
pub(crate) async fn load_event(repos: &Repositories, id: Uuid) -> ApiResult<Event> {
    repos
        .events
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event"))
}

/// Resolve author summaries, one lookup per distinct user
pub(crate) async fn user_summaries(
    repos: &Repositories,
    ids: impl IntoIterator<Item = Uuid>,
) -> ApiResult<HashMap<Uuid, UserSummary>> {
    let mut summaries = HashMap::new();
    for id in ids {
        if summaries.contains_key(&id) {
            continue;
        }
        if let Some(user) = repos.users.find_by_id(id).await? {
            summaries.insert(id, UserSummary::from(&user));
        }
    }
    Ok(summaries)
}
