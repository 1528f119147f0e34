//! Database configuration for `BuildBuddy`.
//!
//! Connects to the store named by `DATABASE_URL` and creates the tables straight from the
//! entity definitions with `Schema::create_table_from_entity`, so the schema always matches the
//! Rust models.

use crate::entities::{Build, Category, Component, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::debug;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/build_buddy.sqlite?mode=rwc";

/// Gets the database URL from `DATABASE_URL`, falling back to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Connects to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!(%database_url, "Connecting to database");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates every table that does not exist yet.
///
/// Users come first because components reference their supplier.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut user_table = schema.create_table_from_entity(User);
    let mut category_table = schema.create_table_from_entity(Category);
    let mut component_table = schema.create_table_from_entity(Component);
    let mut build_table = schema.create_table_from_entity(Build);

    for table in [
        user_table.if_not_exists(),
        category_table.if_not_exists(),
        component_table.if_not_exists(),
        build_table.if_not_exists(),
    ] {
        db.execute(builder.build(&*table)).await?;
    }

    Ok(())
}
