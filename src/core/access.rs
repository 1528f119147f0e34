//! Acting-user context for role-gated operations.
//!
//! Authentication happens outside this crate; callers pass the authenticated user as an
//! [`Actor`] and each operation checks role and ownership itself.

use crate::{
    entities::{Role, user},
    errors::{Error, Result},
};

/// The authenticated user performing an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Id of the acting user
    pub user_id: i64,
    /// Role of the acting user
    pub role: Role,
}

impl Actor {
    /// Creates an actor from an id and role.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the actor is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails with [`Error::Forbidden`] unless the actor holds one of `roles`.
    pub fn require_any(&self, roles: &[Role], action: &str) -> Result<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "Role '{}' is not allowed to {action}",
                self.role
            )))
        }
    }
}

impl From<&user::Model> for Actor {
    fn from(user: &user::Model) -> Self {
        Self::new(user.id, user.role)
    }
}
