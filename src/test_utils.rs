//! Shared test utilities for `BuildBuddy`.
//!
//! Helpers for an in-memory database and for creating users, categories and components with
//! sensible defaults.

use crate::{
    core::{
        access::Actor,
        category,
        component::{self, ComponentUpdate, NewComponent},
        user,
    },
    entities::{self, Role},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Admin actor used by fixtures that need catalog write access without a stored user.
const FIXTURE_ADMIN: Actor = Actor::new(0, Role::Admin);

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Sets up a database with a stored admin user.
/// Returns (db, admin actor) for admin-driven scenarios.
pub async fn setup_with_admin() -> Result<(DatabaseConnection, Actor)> {
    let db = setup_test_db().await?;
    let admin = create_test_user(&db, "admin", Role::Admin).await?;
    Ok((db, Actor::from(&admin)))
}

/// Creates a user named `name` with email `{name}@example.com`.
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    role: Role,
) -> Result<entities::user::Model> {
    user::create_user(db, name.to_string(), format!("{name}@example.com"), role).await
}

/// Creates an active category with priority 1.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(db, &FIXTURE_ADMIN, name.to_string(), None, None, None).await
}

/// Creates an in-stock, unowned component with no structured fields.
///
/// # Defaults
/// * `specifications`: "Test component"
/// * `priority`: 1
pub async fn create_test_component(
    db: &DatabaseConnection,
    name: &str,
    category: &str,
    price: f64,
) -> Result<entities::component::Model> {
    component::create_component(
        db,
        &FIXTURE_ADMIN,
        NewComponent {
            name: name.to_string(),
            category: category.to_string(),
            price,
            specifications: "Test component".to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Creates an in-stock component with a socket set.
pub async fn create_structured_component(
    db: &DatabaseConnection,
    name: &str,
    category: &str,
    price: f64,
    socket: Option<&str>,
) -> Result<entities::component::Model> {
    component::create_component(
        db,
        &FIXTURE_ADMIN,
        NewComponent {
            name: name.to_string(),
            category: category.to_string(),
            price,
            specifications: "Test component".to_string(),
            socket: socket.map(str::to_string),
            ..Default::default()
        },
    )
    .await
}

/// Flips a component's stock flag.
pub async fn set_stock(
    db: &DatabaseConnection,
    component_id: i64,
    in_stock: bool,
) -> Result<entities::component::Model> {
    component::update_component(
        db,
        &FIXTURE_ADMIN,
        component_id,
        ComponentUpdate {
            stock_status: Some(in_stock),
            ..Default::default()
        },
    )
    .await
}
