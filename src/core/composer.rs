//! Interactive build composition.
//!
//! [`BuildComposer`] holds a budget, the active categories, the in-stock catalog and the parts
//! picked so far. Allocation, candidates and the verdict are recomputed from scratch on every
//! call; nothing is cached between selections.

use crate::{
    core::{
        access::Actor,
        budget::{BudgetAllocation, CategoryWeight, allocate_budget_by_category},
        build::{CreatedBuild, create_build},
        category::list_categories,
        compatibility::{CompatibilityVerdict, check_compatibility},
        component::{ComponentFilter, list_components},
        part::{Part, normalize_category},
        selection::{CandidateSet, filter_components_by_budget_and_compatibility},
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use tracing::debug;

/// Active categories and in-stock parts, read once per composing session
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    /// Active categories with their priorities
    pub categories: Vec<CategoryWeight>,
    /// In-stock parts
    pub parts: Vec<Part>,
}

/// Reads the active categories and the in-stock catalog.
pub async fn load_catalog_snapshot(db: &DatabaseConnection) -> Result<CatalogSnapshot> {
    let categories = list_categories(db, false)
        .await?
        .iter()
        .map(CategoryWeight::from)
        .collect();
    let parts = list_components(
        db,
        &ComponentFilter {
            stock_status: Some(true),
            ..Default::default()
        },
    )
    .await?
    .into_iter()
    .map(Part::from)
    .collect();
    Ok(CatalogSnapshot { categories, parts })
}

/// Loads the catalog and starts a composer with `component_ids` preselected.
pub async fn load_composer(
    db: &DatabaseConnection,
    budget: f64,
    component_ids: &[i64],
) -> Result<BuildComposer> {
    let snapshot = load_catalog_snapshot(db).await?;
    let mut composer = BuildComposer::new(budget, snapshot)?;
    for id in component_ids {
        composer.select(*id)?;
    }
    debug!(
        budget,
        selected = composer.selection().len(),
        "Loaded build composer"
    );
    Ok(composer)
}

/// A build being put together against a budget
#[derive(Debug, Clone)]
pub struct BuildComposer {
    budget: f64,
    catalog: CatalogSnapshot,
    selection: Vec<Part>,
}

impl BuildComposer {
    /// Starts an empty selection.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAmount`] if `budget` is negative or not finite.
    pub fn new(budget: f64, catalog: CatalogSnapshot) -> Result<Self> {
        if !budget.is_finite() || budget < 0.0 {
            return Err(Error::InvalidAmount { amount: budget });
        }
        Ok(Self {
            budget,
            catalog,
            selection: Vec::new(),
        })
    }

    /// The total budget.
    #[must_use]
    pub const fn budget(&self) -> f64 {
        self.budget
    }

    /// Parts picked so far, one per category.
    #[must_use]
    pub fn selection(&self) -> &[Part] {
        &self.selection
    }

    /// Picks a catalog part, replacing any earlier pick in its category.
    ///
    /// # Errors
    /// Returns [`Error::ComponentNotFound`] if the id is not in the in-stock catalog.
    pub fn select(&mut self, component_id: i64) -> Result<&Part> {
        let part = self
            .catalog
            .parts
            .iter()
            .find(|p| p.id == component_id && p.stock_status)
            .cloned()
            .ok_or(Error::ComponentNotFound { id: component_id })?;

        let index = match self.selection.iter().position(|p| p.category == part.category) {
            Some(index) => {
                self.selection[index] = part;
                index
            }
            None => {
                self.selection.push(part);
                self.selection.len() - 1
            }
        };
        Ok(&self.selection[index])
    }

    /// Drops the pick for `category`, returning it.
    pub fn deselect(&mut self, category: &str) -> Option<Part> {
        let category = normalize_category(category);
        let index = self.selection.iter().position(|p| p.category == category)?;
        Some(self.selection.remove(index))
    }

    /// Sum of the selected prices.
    #[must_use]
    pub fn spent(&self) -> f64 {
        self.selection.iter().map(|p| p.price).sum()
    }

    /// Budget split for the current selection.
    pub fn allocation(&self) -> Result<BudgetAllocation> {
        allocate_budget_by_category(self.budget, &self.catalog.categories, &self.selection)
    }

    /// Compatible, budget-fitting candidates per category for the current selection.
    pub fn candidates(&self) -> Result<CandidateSet> {
        let allocation = self.allocation()?;
        Ok(filter_components_by_budget_and_compatibility(
            &self.catalog.parts,
            &self.selection,
            &allocation,
        ))
    }

    /// Compatibility verdict of the current selection.
    #[must_use]
    pub fn verdict(&self) -> CompatibilityVerdict {
        check_compatibility(&self.selection)
    }

    /// Ids of the selected parts, in selection order.
    #[must_use]
    pub fn component_ids(&self) -> Vec<i64> {
        self.selection.iter().map(|p| p.id).collect()
    }

    /// Submits the selection as a build for `actor`.
    pub async fn submit(&self, db: &DatabaseConnection, actor: &Actor) -> Result<CreatedBuild> {
        create_build(db, actor, &self.component_ids()).await
    }
}
