//! Component business logic - the supplier-maintained catalog.
//!
//! Suppliers and admins create, edit and delete components. A supplier creating or editing a
//! component becomes its owner; only admins may assign ownership explicitly. Every component
//! must be filed under an existing category.

use crate::{
    core::{access::Actor, budget::MAX_PRIORITY, part::normalize_category},
    entities::{Component, Role, component},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Upper bound accepted for `power_requirement` and `wattage`
pub const MAX_WATTS: i32 = 10_000;

/// Optional filters for [`list_components`]
#[derive(Debug, Clone, Default)]
pub struct ComponentFilter {
    /// Only components in this category (case-insensitive)
    pub category: Option<String>,
    /// Only components with this stock flag
    pub stock_status: Option<bool>,
    /// Only components owned by this supplier
    pub supplier_id: Option<i64>,
}

/// Everything needed to create a component
#[derive(Debug, Clone, Default)]
pub struct NewComponent {
    /// Display name
    pub name: String,
    /// Category name; must exist
    pub category: String,
    /// Unit price in dollars
    pub price: f64,
    /// Specification line, required
    pub specifications: String,
    /// Legacy compatibility hint
    pub compatibility: Option<String>,
    /// Product page link
    pub url: Option<String>,
    /// Socket
    pub socket: Option<String>,
    /// Chipset
    pub chipset: Option<String>,
    /// Form factor
    pub form_factor: Option<String>,
    /// Memory type
    pub ram_type: Option<String>,
    /// Storage interface
    pub storage_interface: Option<String>,
    /// Power draw in watts
    pub power_requirement: Option<i32>,
    /// PSU output in watts
    pub wattage: Option<i32>,
    /// Stock flag, defaults to in stock
    pub stock_status: Option<bool>,
    /// Priority weight, defaults to 1
    pub priority: Option<i32>,
    /// Owner; only honoured for admins
    pub supplier_id: Option<i64>,
}

/// Partial component edit; `None` leaves the field as is
#[derive(Debug, Clone, Default)]
pub struct ComponentUpdate {
    /// New name
    pub name: Option<String>,
    /// New category; must exist
    pub category: Option<String>,
    /// New price
    pub price: Option<f64>,
    /// New specification line
    pub specifications: Option<String>,
    /// New compatibility hint
    pub compatibility: Option<String>,
    /// New product link
    pub url: Option<String>,
    /// New socket
    pub socket: Option<Option<String>>,
    /// New chipset
    pub chipset: Option<Option<String>>,
    /// New form factor
    pub form_factor: Option<Option<String>>,
    /// New memory type
    pub ram_type: Option<Option<String>>,
    /// New storage interface
    pub storage_interface: Option<Option<String>>,
    /// New power draw
    pub power_requirement: Option<Option<i32>>,
    /// New PSU output
    pub wattage: Option<Option<i32>>,
    /// New stock flag
    pub stock_status: Option<bool>,
    /// New priority
    pub priority: Option<i32>,
    /// New owner; admin only, `Some(None)` clears it
    pub supplier_id: Option<Option<i64>>,
}

/// Lists components matching `filter`, newest first.
pub async fn list_components(
    db: &DatabaseConnection,
    filter: &ComponentFilter,
) -> Result<Vec<component::Model>> {
    let mut query = Component::find();
    if let Some(category) = &filter.category {
        query = query.filter(component::Column::Category.eq(normalize_category(category)));
    }
    if let Some(in_stock) = filter.stock_status {
        query = query.filter(component::Column::StockStatus.eq(in_stock));
    }
    if let Some(supplier_id) = filter.supplier_id {
        query = query.filter(component::Column::SupplierId.eq(supplier_id));
    }
    query
        .order_by_desc(component::Column::CreatedAt)
        .order_by_desc(component::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a component by id.
pub async fn get_component_by_id(
    db: &DatabaseConnection,
    component_id: i64,
) -> Result<Option<component::Model>> {
    Component::find_by_id(component_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fetches the in-stock components among `ids`; unknown or out-of-stock ids are left out.
pub async fn get_in_stock_components<C>(db: &C, ids: &[i64]) -> Result<Vec<component::Model>>
where
    C: ConnectionTrait,
{
    Component::find()
        .filter(component::Column::Id.is_in(ids.iter().copied()))
        .filter(component::Column::StockStatus.eq(true))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of components filed under `category`.
pub async fn count_components_in_category<C>(db: &C, category: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    Component::find()
        .filter(component::Column::Category.eq(normalize_category(category)))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Creates a component. Admin or supplier only.
///
/// # Errors
/// Returns an error if a required field is blank, the price is negative or not finite, the
/// priority is below 1, the category does not exist, or the insert fails.
pub async fn create_component(
    db: &DatabaseConnection,
    actor: &Actor,
    new: NewComponent,
) -> Result<component::Model> {
    actor.require_any(&[Role::Admin, Role::Supplier], "create components")?;

    if new.name.trim().is_empty() || new.specifications.trim().is_empty() {
        return Err(Error::validation(
            "Please provide name, category, price, and specifications",
        ));
    }
    validate_price(new.price)?;
    let power_requirement = validate_watts("power_requirement", new.power_requirement)?;
    let wattage = validate_watts("wattage", new.wattage)?;
    let priority = validate_priority(new.priority.unwrap_or(1))?;
    let category = require_category(db, &new.category).await?;

    let supplier_id = match actor.role {
        Role::Supplier => Some(actor.user_id),
        _ => new.supplier_id,
    };

    let now = chrono::Utc::now();
    let component = component::ActiveModel {
        name: Set(new.name.trim().to_string()),
        category: Set(category),
        price: Set(new.price),
        specifications: Set(new.specifications),
        compatibility: Set(new.compatibility.unwrap_or_default()),
        url: Set(new.url.map(|u| u.trim().to_string()).unwrap_or_default()),
        socket: Set(new.socket),
        chipset: Set(new.chipset),
        form_factor: Set(new.form_factor),
        ram_type: Set(new.ram_type),
        storage_interface: Set(new.storage_interface),
        power_requirement: Set(power_requirement),
        wattage: Set(wattage),
        stock_status: Set(new.stock_status.unwrap_or(true)),
        priority: Set(priority),
        supplier_id: Set(supplier_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = component.insert(db).await?;
    info!(
        component_id = created.id,
        category = %created.category,
        price = created.price,
        "Created component"
    );
    Ok(created)
}

/// Applies `update` to a component. Admin or supplier only.
///
/// A supplier editing a component takes ownership of it; an explicit `supplier_id` change is
/// only honoured for admins.
pub async fn update_component(
    db: &DatabaseConnection,
    actor: &Actor,
    component_id: i64,
    update: ComponentUpdate,
) -> Result<component::Model> {
    actor.require_any(&[Role::Admin, Role::Supplier], "update components")?;

    let mut component: component::ActiveModel = get_component_by_id(db, component_id)
        .await?
        .ok_or(Error::ComponentNotFound { id: component_id })?
        .into();

    if let Some(name) = update.name.filter(|n| !n.trim().is_empty()) {
        component.name = Set(name.trim().to_string());
    }
    if let Some(category) = update.category.filter(|c| !c.trim().is_empty()) {
        component.category = Set(require_category(db, &category).await?);
    }
    if let Some(price) = update.price {
        component.price = Set(validate_price(price)?);
    }
    if let Some(specifications) = update.specifications.filter(|s| !s.trim().is_empty()) {
        component.specifications = Set(specifications);
    }
    if let Some(compatibility) = update.compatibility {
        component.compatibility = Set(compatibility);
    }
    if let Some(url) = update.url {
        component.url = Set(url.trim().to_string());
    }
    if let Some(socket) = update.socket {
        component.socket = Set(socket);
    }
    if let Some(chipset) = update.chipset {
        component.chipset = Set(chipset);
    }
    if let Some(form_factor) = update.form_factor {
        component.form_factor = Set(form_factor);
    }
    if let Some(ram_type) = update.ram_type {
        component.ram_type = Set(ram_type);
    }
    if let Some(interface) = update.storage_interface {
        component.storage_interface = Set(interface);
    }
    if let Some(power) = update.power_requirement {
        component.power_requirement = Set(validate_watts("power_requirement", power)?);
    }
    if let Some(wattage) = update.wattage {
        component.wattage = Set(validate_watts("wattage", wattage)?);
    }
    if let Some(in_stock) = update.stock_status {
        component.stock_status = Set(in_stock);
    }
    if let Some(priority) = update.priority {
        component.priority = Set(validate_priority(priority)?);
    }

    match actor.role {
        Role::Supplier => component.supplier_id = Set(Some(actor.user_id)),
        Role::Admin => {
            if let Some(supplier_id) = update.supplier_id {
                component.supplier_id = Set(supplier_id);
            }
        }
        Role::User | Role::Assembler => {}
    }
    component.updated_at = Set(chrono::Utc::now());

    let updated = component.update(db).await?;
    info!(component_id, by = actor.user_id, "Updated component");
    Ok(updated)
}

/// Deletes a component. Admin or supplier only.
///
/// Existing builds keep their snapshot of the component.
pub async fn delete_component(
    db: &DatabaseConnection,
    actor: &Actor,
    component_id: i64,
) -> Result<()> {
    actor.require_any(&[Role::Admin, Role::Supplier], "delete components")?;

    let result = Component::delete_by_id(component_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::ComponentNotFound { id: component_id });
    }
    info!(component_id, by = actor.user_id, "Deleted component");
    Ok(())
}

async fn require_category<C>(db: &C, name: &str) -> Result<String>
where
    C: ConnectionTrait,
{
    crate::core::category::get_category_by_name(db, name)
        .await?
        .map(|c| c.name)
        .ok_or_else(|| Error::validation(format!("Unknown category '{}'", name.trim())))
}

fn validate_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(price)
}

fn validate_watts(field: &str, watts: Option<i32>) -> Result<Option<i32>> {
    match watts {
        Some(w) if !(0..=MAX_WATTS).contains(&w) => Err(Error::validation(format!(
            "{field} must be between 0 and {MAX_WATTS} watts"
        ))),
        _ => Ok(watts),
    }
}

fn validate_priority(priority: i32) -> Result<i32> {
    if !(1..=MAX_PRIORITY).contains(&priority) {
        return Err(Error::validation(format!(
            "Component priority must be between 1 and {MAX_PRIORITY}"
        )));
    }
    Ok(priority)
}
