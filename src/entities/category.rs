//! Category entity - A named grouping of components (CPU, GPU, ...).
//!
//! The priority weight drives how much of a budget the category receives during
//! allocation. Names are stored trimmed and upper-cased and are unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Normalized name (e.g., "CPU", "MOTHERBOARD")
    #[sea_orm(unique)]
    pub name: String,
    /// Free-form description shown in the catalog
    pub description: String,
    /// Inactive categories are skipped by the budget allocator
    pub is_active: bool,
    /// Allocation weight, at least 1
    pub priority: i32,
    /// When the category was created
    pub created_at: DateTimeUtc,
    /// When the category was last modified
    pub updated_at: DateTimeUtc,
}

/// Components reference categories by name, not by key, so there is no relation here.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
