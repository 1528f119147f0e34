//! Catalog seeding from [`CatalogConfig`].
//!
//! Seeding is repeatable: users are matched by email, categories by name and components by
//! name, and anything already present is left alone.

use crate::{
    config::catalog::{CatalogConfig, ComponentSeed},
    core::{
        access::Actor,
        category::{create_category, get_category_by_name},
        component::{NewComponent, create_component},
        user::{create_user, get_user_by_email},
    },
    entities::{Component, Role, component},
    errors::{Error, Result},
};
use sea_orm::prelude::*;
use tracing::{debug, info, warn};

/// Number of records created by one seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Users created
    pub users: usize,
    /// Categories created
    pub categories: usize,
    /// Components created
    pub components: usize,
}

/// Seeds users, categories and components, skipping entries that already exist.
///
/// # Errors
/// Returns [`Error::Validation`] if a component names a supplier that is neither seeded nor
/// registered, plus any error from the underlying create operations.
pub async fn seed_catalog(db: &DatabaseConnection, config: &CatalogConfig) -> Result<SeedSummary> {
    info!(
        users = config.users.len(),
        categories = config.categories.len(),
        components = config.components.len(),
        "Seeding catalog"
    );
    let system = Actor::new(0, Role::Admin);
    let mut summary = SeedSummary::default();

    for user in &config.users {
        if get_user_by_email(db, &user.email).await?.is_some() {
            debug!(email = %user.email, "User already exists, skipping");
            continue;
        }
        create_user(db, user.name.clone(), user.email.clone(), user.role).await?;
        summary.users += 1;
    }

    for category in &config.categories {
        if get_category_by_name(db, &category.name).await?.is_some() {
            debug!(category = %category.name, "Category already exists, skipping");
            continue;
        }
        create_category(
            db,
            &system,
            category.name.clone(),
            category.description.clone(),
            category.is_active,
            category.priority,
        )
        .await?;
        summary.categories += 1;
    }

    for seed in &config.components {
        let exists = Component::find()
            .filter(component::Column::Name.eq(seed.name.trim()))
            .one(db)
            .await?
            .is_some();
        if exists {
            debug!(component = %seed.name, "Component already exists, skipping");
            continue;
        }
        let supplier_id = resolve_supplier(db, seed).await?;
        create_component(db, &system, new_component(seed, supplier_id)).await?;
        summary.components += 1;
    }

    info!(
        users = summary.users,
        categories = summary.categories,
        components = summary.components,
        "Finished seeding catalog"
    );
    Ok(summary)
}

async fn resolve_supplier(db: &DatabaseConnection, seed: &ComponentSeed) -> Result<Option<i64>> {
    let Some(email) = seed.supplier.as_deref() else {
        return Ok(None);
    };
    match get_user_by_email(db, email).await? {
        Some(user) if user.role == Role::Supplier => Ok(Some(user.id)),
        Some(user) => {
            warn!(email, role = %user.role, "Seed supplier is not a supplier, leaving unowned");
            Ok(None)
        }
        None => Err(Error::validation(format!(
            "Component '{}' names unknown supplier '{email}'",
            seed.name
        ))),
    }
}

fn new_component(seed: &ComponentSeed, supplier_id: Option<i64>) -> NewComponent {
    NewComponent {
        name: seed.name.clone(),
        category: seed.category.clone(),
        price: seed.price,
        specifications: seed.specifications.clone(),
        compatibility: seed.compatibility.clone(),
        url: seed.url.clone(),
        socket: seed.socket.clone(),
        chipset: seed.chipset.clone(),
        form_factor: seed.form_factor.clone(),
        ram_type: seed.ram_type.clone(),
        storage_interface: seed.storage_interface.clone(),
        power_requirement: seed.power_requirement,
        wattage: seed.wattage,
        stock_status: seed.stock_status,
        priority: seed.priority,
        supplier_id,
    }
}
