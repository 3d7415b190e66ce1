//! User Management Service

use crate::error::{ApiError, ApiResult};
use crate::models::*;
use crate::repository::{sync_event_counts, Repositories};

use eventhub_auth::{
    normalize_email, require_owner_or_roles, require_role, Role, User, UserChanges, UserQuery,
    UserResponse,
};
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    repos: Repositories,
}

impl UserService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    async fn load_user(&self, id: Uuid) -> ApiResult<User> {
        self.repos
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))
    }

    pub async fn list(&self, admin: &User, query: UserQuery) -> ApiResult<UserPage> {
        require_role(admin, &[Role::Admin])?;

        let (users, total) = self.repos.users.list(&query).await?;
        let paging = Paging {
            page: query.page(),
            limit: query.limit(),
        };

        Ok(UserPage {
            users: users.into_iter().map(UserResponse::from).collect(),
            pagination: Pagination::new(total, paging),
        })
    }

    /// Public profile; roles for the user themself and admins, timestamps for admins
    pub async fn get(&self, viewer: Option<&User>, id: Uuid) -> ApiResult<UserResponse> {
        let user = self.load_user(id).await?;

        let is_admin = viewer.is_some_and(User::is_admin);
        let is_self = viewer.is_some_and(|v| v.id == id);

        let mut response = UserResponse::from(user);
        if !is_admin && !is_self {
            response = response.without_roles();
        }
        if !is_admin {
            response = response.without_timestamps();
        }
        Ok(response)
    }

    pub async fn update(&self, actor: &User, id: Uuid, req: UpdateUserRequest) -> ApiResult<UserResponse> {
        require_owner_or_roles(actor, id, &[Role::Admin])?;

        let roles = match req.roles {
            Some(roles) if actor.is_admin() => {
                if roles.is_empty() {
                    return Err(ApiError::BadRequest("Roles must not be empty".to_string()));
                }
                let mut deduped = Vec::with_capacity(roles.len());
                for role in roles {
                    if !deduped.contains(&role) {
                        deduped.push(role);
                    }
                }
                Some(deduped)
            }
            Some(_) => {
                tracing::debug!(user_id = %actor.id, "Ignoring role change from non-admin");
                None
            }
            None => None,
        };

        let changes = UserChanges {
            name: req.name.map(|n| n.trim().to_string()),
            email: req.email.as_deref().map(normalize_email),
            avatar_url: req.avatar_url,
            bio: req.bio,
            roles,
        };

        let user = self
            .repos
            .users
            .update(id, changes)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?;

        tracing::info!(user_id = %id, actor_id = %actor.id, "User updated");
        Ok(user.into())
    }

    /// Delete a user with everything they own, recomputing the counters of
    /// events that lost an RSVP
    pub async fn delete(&self, actor: &User, id: Uuid) -> ApiResult<()> {
        require_owner_or_roles(actor, id, &[Role::Admin])?;
        self.load_user(id).await?;

        let touched: BTreeSet<Uuid> = self
            .repos
            .rsvps
            .delete_for_user(id)
            .await?
            .into_iter()
            .collect();
        let comments = self.repos.comments.delete_for_user(id).await?;
        let notifications = self.repos.notifications.delete_for_user(id).await?;

        // Organized events go with the user
        if !self.repos.users.delete(id).await? {
            return Err(ApiError::not_found("User"));
        }

        for event_id in touched {
            sync_event_counts(self.repos.events.as_ref(), self.repos.rsvps.as_ref(), event_id).await?;
        }

        tracing::info!(
            user_id = %id,
            actor_id = %actor.id,
            comments,
            notifications,
            "User deleted"
        );
        Ok(())
    }
}
