//! Build entity - A user's submitted component selection and its assembly progress.
//!
//! The component list is a snapshot copied from the catalog at creation time and the
//! compatibility verdict computed then is frozen alongside it. Both are stored as
//! embedded JSON values so later catalog edits never reach an existing build.

use crate::core::compatibility::CompatibilityVerdict;
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Assembly lifecycle state
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AssemblyStatus {
    /// Submitted, waiting for an assembler
    #[sea_orm(string_value = "Pending")]
    Pending,
    /// An assembler is working on it
    #[sea_orm(string_value = "Assembling")]
    Assembling,
    /// Finished
    #[sea_orm(string_value = "Completed")]
    Completed,
}

impl AssemblyStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Assembling => "Assembling",
            Self::Completed => "Completed",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Re-applying the current status is accepted as a no-op.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Pending | Self::Assembling)
                | (Self::Assembling, _)
                | (Self::Completed, Self::Completed)
        )
    }
}

impl std::fmt::Display for AssemblyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssemblyStatus {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Assembling" => Ok(Self::Assembling),
            "Completed" => Ok(Self::Completed),
            other => Err(crate::errors::Error::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// One catalog component as it looked when the build was submitted
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildComponent {
    /// Catalog id at submission time
    pub component_id: i64,
    /// Name at submission time
    pub component_name: String,
    /// Category at submission time
    pub category: String,
    /// Price at submission time
    pub price: f64,
}

/// The embedded component snapshot of a build
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct BuildComponents(pub Vec<BuildComponent>);

impl BuildComponents {
    /// Sum of the snapshot prices.
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.0.iter().map(|c| c.price).sum()
    }
}

/// Build database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "builds")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the build
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User who submitted the build
    pub user_id: i64,
    /// Immutable component snapshot
    #[sea_orm(column_type = "Json")]
    pub components: BuildComponents,
    /// Sum of snapshot prices at creation
    pub total_price: f64,
    /// Current lifecycle state
    pub assembly_status: AssemblyStatus,
    /// Assembler responsible for the build, if any
    pub assembler_id: Option<i64>,
    /// Verdict frozen at creation time
    #[sea_orm(column_type = "Json")]
    pub compatibility_check: CompatibilityVerdict,
    /// Mirrors `compatibility_check.is_compatible`
    pub is_compatible: bool,
    /// When the build was submitted
    pub created_at: DateTimeUtc,
    /// When the build last changed state
    pub updated_at: DateTimeUtc,
}

/// Builds reference users by id only; the component list is embedded.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
