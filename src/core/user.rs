//! User registry - who exists and which role they hold.
//!
//! Account approval and credentials are handled elsewhere; these functions only maintain
//! the records role checks and assembler assignment rely on.

use crate::{
    core::access::Actor,
    entities::{Role, User, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Creates a user with the given role.
///
/// # Errors
/// Returns an error if the name or email is blank, the email is already registered, or the
/// insert fails.
pub async fn create_user(
    db: &DatabaseConnection,
    name: String,
    email: String,
    role: Role,
) -> Result<user::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("User name cannot be empty"));
    }
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(Error::validation("User email cannot be empty"));
    }

    if get_user_by_email(db, &email).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("A user with email '{email}' already exists"),
        });
    }

    let user = user::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email),
        role: Set(role),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = user.insert(db).await?;
    info!(user_id = created.id, role = %created.role, "Created user");
    Ok(created)
}

/// Finds a user by id.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds a user by email (case-insensitive).
pub async fn get_user_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every user, newest first. Admin only.
pub async fn list_users(db: &DatabaseConnection, actor: &Actor) -> Result<Vec<user::Model>> {
    actor.require_any(&[Role::Admin], "list users")?;
    User::find()
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes a user's role. Admin only; an admin cannot change their own role.
pub async fn update_user_role(
    db: &DatabaseConnection,
    actor: &Actor,
    user_id: i64,
    role: Role,
) -> Result<user::Model> {
    actor.require_any(&[Role::Admin], "change user roles")?;

    let user = get_user_by_id(db, user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    if user.id == actor.user_id {
        return Err(Error::validation("You cannot change your own role"));
    }

    let mut active: user::ActiveModel = user.into();
    active.role = Set(role);
    let updated = active.update(db).await?;
    info!(user_id, role = %role, "Updated user role");
    Ok(updated)
}
