//! Authorization Guard
//!
//! Role and ownership predicates. Callers resolve the resource owner first;
//! a missing resource is reported as not-found before these run.

use crate::error::AuthError;
use crate::models::{Role, User};

use uuid::Uuid;

/// Pass if the user holds at least one of `roles`
pub fn require_role(user: &User, roles: &[Role]) -> Result<(), AuthError> {
    if user.has_any_role(roles) {
        return Ok(());
    }

    tracing::debug!(user_id = %user.id, ?roles, "Role check failed");
    Err(AuthError::Forbidden(format!(
        "Access denied. Required role: {}",
        join_roles(roles, " or ")
    )))
}

/// Pass if the user owns the resource or holds at least one of `roles`
pub fn require_owner_or_roles(user: &User, owner_id: Uuid, roles: &[Role]) -> Result<(), AuthError> {
    if user.id == owner_id || user.has_any_role(roles) {
        return Ok(());
    }

    tracing::debug!(user_id = %user.id, owner_id = %owner_id, "Ownership check failed");
    Err(AuthError::Forbidden(if roles.is_empty() {
        "Access denied. You must be the owner".to_string()
    } else {
        format!(
            "Access denied. You must be the owner or have one of these roles: {}",
            join_roles(roles, ", ")
        )
    }))
}

fn join_roles(roles: &[Role], sep: &str) -> String {
    roles.iter().map(Role::as_str).collect::<Vec<_>>().join(sep)
}
