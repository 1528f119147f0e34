//! User entity - Accounts known to the marketplace and their role.
//!
//! Authentication lives outside this crate; the table only records who exists and
//! which role gates their actions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Marketplace role
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Customer who composes builds
    #[sea_orm(string_value = "user")]
    User,
    /// Full access
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Assembles assigned builds
    #[sea_orm(string_value = "assembler")]
    Assembler,
    /// Maintains component inventory
    #[sea_orm(string_value = "supplier")]
    Supplier,
}

impl Role {
    /// Lower-case wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Assembler => "assembler",
            Self::Supplier => "supplier",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "assembler" => Ok(Self::Assembler),
            "supplier" => Ok(Self::Supplier),
            other => Err(crate::errors::Error::validation(format!(
                "Invalid role '{other}'"
            ))),
        }
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email, unique
    #[sea_orm(unique)]
    pub email: String,
    /// Role gating the user's actions
    pub role: Role,
    /// When the user was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A supplier owns many components
    #[sea_orm(has_many = "super::component::Entity")]
    Components,
}

impl Related<super::component::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Components.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
