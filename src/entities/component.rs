//! Component entity - A catalog part offered by a supplier.
//!
//! Besides price and stock, each component carries the structured fields the
//! compatibility checker reads (socket, chipset, form factor, RAM type, storage
//! interface, power draw, PSU wattage). The free-text `compatibility` column is kept as
//! a fallback for entries that predate the structured fields.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Component database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "components")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the component
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "AMD Ryzen 7 7700X")
    pub name: String,
    /// Upper-cased category name, matches a `categories.name`
    pub category: String,
    /// Unit price in dollars
    pub price: f64,
    /// Free-text specification line
    pub specifications: String,
    /// Legacy free-text compatibility hint (e.g., "LGA 1700")
    pub compatibility: String,
    /// Product page link
    pub url: String,
    /// CPU / motherboard socket
    pub socket: Option<String>,
    /// CPU / motherboard chipset
    pub chipset: Option<String>,
    /// Motherboard / case form factor
    pub form_factor: Option<String>,
    /// RAM / motherboard memory type
    pub ram_type: Option<String>,
    /// Storage interface (SATA, NVMe, M.2)
    pub storage_interface: Option<String>,
    /// Power draw in watts
    pub power_requirement: Option<i32>,
    /// PSU output in watts
    pub wattage: Option<i32>,
    /// Whether the component can be ordered
    pub stock_status: bool,
    /// Priority weight, at least 1
    pub priority: i32,
    /// Owning supplier, if any
    pub supplier_id: Option<i64>,
    /// When the component was created
    pub created_at: DateTimeUtc,
    /// When the component was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Component and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each component may belong to one supplier
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SupplierId",
        to = "super::user::Column::Id"
    )]
    Supplier,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
