//! Budget allocation - splits a total budget across categories by priority weight.
//!
//! Allocation is recomputed from scratch on every change to the budget or the selection.
//! Categories that already hold a selected part are locked at what was spent on them; the
//! remaining budget is shared among the open categories in proportion to their priority,
//! and each share is widened into a `[min, max]` window used to filter the catalog.

use crate::{
    core::part::{Part, normalize_category},
    entities::category,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Largest priority weight stored on a category or component.
pub const MAX_PRIORITY: i32 = 1_000;

/// Flexibility applied around each category's allocated amount (±20%).
pub const ALLOCATION_FLEX: f64 = 0.2;

/// Category weight as seen by the allocator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWeight {
    /// Catalog id, when the category is persisted
    pub id: Option<i64>,
    /// Category name
    pub name: String,
    /// Raw priority; anything below 1 counts as 1
    pub priority: f64,
    /// Inactive categories receive nothing and are left out of the result
    pub is_active: bool,
}

impl CategoryWeight {
    /// Active category with the given priority.
    #[must_use]
    pub fn new(name: &str, priority: f64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            priority,
            is_active: true,
        }
    }
}

impl From<&category::Model> for CategoryWeight {
    fn from(model: &category::Model) -> Self {
        Self {
            id: Some(model.id),
            name: model.name.clone(),
            priority: f64::from(model.priority),
            is_active: model.is_active,
        }
    }
}

/// Budget share of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAllocation {
    /// Catalog id of the category, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    /// Category name as given
    pub category_name: String,
    /// Effective priority; 0 once the category is locked
    pub priority: u32,
    /// Share of the remaining budget, 3 decimals
    pub ratio: f64,
    /// Allocated amount, or the spent amount when locked
    pub allocated_budget: f64,
    /// Lower edge of the price window
    pub min_budget: f64,
    /// Upper edge of the price window
    pub max_budget: f64,
    /// Already spent on this category
    pub spent: f64,
    /// `allocated_budget - spent`
    pub remaining: f64,
}

impl CategoryAllocation {
    /// Whether a selection already fixed this category's spend.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.spent > 0.0
    }
}

/// Result of [`allocate_budget_by_category`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAllocation {
    /// The budget that was split
    pub total_budget: f64,
    /// Sum of selected part prices
    pub spent: f64,
    /// Budget left after the selection, never negative
    pub remaining: f64,
    /// One entry per active category, in input order
    pub allocations: Vec<CategoryAllocation>,
}

impl BudgetAllocation {
    /// Looks up a category's entry by name (case-insensitive).
    #[must_use]
    pub fn for_category(&self, name: &str) -> Option<&CategoryAllocation> {
        let wanted = normalize_category(name);
        self.allocations
            .iter()
            .find(|a| normalize_category(&a.category_name) == wanted)
    }
}

/// Splits `total_budget` across the active `categories`.
///
/// Money already spent on `selected` parts is subtracted first; categories holding a selection
/// are locked at their spent amount. The rest of the budget goes to the open categories in
/// proportion to their priority, each with a ±20% window. Money is rounded to cents and ratios
/// to three decimals.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] when `total_budget` is negative or not finite.
pub fn allocate_budget_by_category(
    total_budget: f64,
    categories: &[CategoryWeight],
    selected: &[Part],
) -> Result<BudgetAllocation> {
    if !total_budget.is_finite() || total_budget < 0.0 {
        return Err(Error::InvalidAmount {
            amount: total_budget,
        });
    }

    let active: Vec<&CategoryWeight> = categories.iter().filter(|c| c.is_active).collect();
    if active.is_empty() {
        return Ok(BudgetAllocation {
            total_budget,
            spent: 0.0,
            remaining: total_budget,
            allocations: Vec::new(),
        });
    }

    let mut spent_by_category: HashMap<String, f64> = HashMap::new();
    for part in selected {
        let price = if part.price.is_finite() { part.price } else { 0.0 };
        *spent_by_category
            .entry(normalize_category(&part.category))
            .or_default() += price;
    }
    let total_spent: f64 = spent_by_category.values().sum();
    let remaining_budget = (total_budget - total_spent).max(0.0);

    let weighted: Vec<(&CategoryWeight, u32, f64)> = active
        .into_iter()
        .map(|cat| {
            let spent = spent_by_category
                .get(&normalize_category(&cat.name))
                .copied()
                .unwrap_or(0.0);
            let priority = if spent > 0.0 {
                0
            } else {
                effective_priority(cat.priority)
            };
            (cat, priority, spent)
        })
        .collect();

    let total_priority: u64 = weighted.iter().map(|(_, p, _)| u64::from(*p)).sum();

    let allocations = weighted
        .into_iter()
        .map(|(cat, priority, spent)| {
            let (ratio, allocated, min, max) = if priority > 0 && total_priority > 0 {
                let ratio = priority_ratio(priority, total_priority);
                let allocated = ratio * remaining_budget;
                (
                    ratio,
                    allocated,
                    (allocated * (1.0 - ALLOCATION_FLEX)).max(0.0),
                    allocated * (1.0 + ALLOCATION_FLEX),
                )
            } else if spent > 0.0 {
                (0.0, spent, spent, spent)
            } else {
                (0.0, 0.0, 0.0, 0.0)
            };

            CategoryAllocation {
                category_id: cat.id,
                category_name: cat.name.clone(),
                priority,
                ratio: round_to(ratio, 3),
                allocated_budget: round_cents(allocated),
                min_budget: round_cents(min),
                max_budget: round_cents(max),
                spent: round_cents(spent),
                remaining: round_cents(allocated - spent),
            }
        })
        .collect();

    Ok(BudgetAllocation {
        total_budget: round_cents(total_budget),
        spent: round_cents(total_spent),
        remaining: round_cents(remaining_budget),
        allocations,
    })
}

/// An item competing for a share of a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityItem {
    /// Component id, if the item refers to one
    pub component_id: Option<i64>,
    /// Display name
    pub name: Option<String>,
    /// Category name
    pub category: Option<String>,
    /// Raw priority; missing or invalid counts as 1
    pub priority: Option<f64>,
}

/// Share of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAllocation {
    /// Component id, if known
    pub component_id: Option<i64>,
    /// Display name
    pub name: Option<String>,
    /// Category name
    pub category: Option<String>,
    /// Effective priority
    pub priority: u32,
    /// Share of the budget, 2 decimals
    pub ratio: f64,
    /// Allocated amount, 2 decimals
    pub allocated_budget: f64,
}

/// Result of [`allocate_budget_by_priority`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityAllocation {
    /// The budget that was split
    pub budget: f64,
    /// Sum of effective priorities
    pub total_priority: u64,
    /// One entry per input item, in order
    pub allocations: Vec<ItemAllocation>,
}

/// Splits `budget` across individual items by priority weight.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] when `budget` is negative or not finite.
pub fn allocate_budget_by_priority(
    budget: f64,
    items: &[PriorityItem],
) -> Result<PriorityAllocation> {
    if !budget.is_finite() || budget < 0.0 {
        return Err(Error::InvalidAmount { amount: budget });
    }

    let priorities: Vec<u32> = items
        .iter()
        .map(|item| item.priority.map_or(1, effective_priority))
        .collect();
    let total_priority: u64 = priorities.iter().copied().map(u64::from).sum();

    let allocations = items
        .iter()
        .zip(priorities)
        .map(|(item, priority)| {
            let ratio = if total_priority > 0 {
                priority_ratio(priority, total_priority)
            } else {
                0.0
            };
            ItemAllocation {
                component_id: item.component_id,
                name: item.name.clone(),
                category: item.category.clone(),
                priority,
                ratio: round_cents(ratio),
                allocated_budget: round_cents(ratio * budget),
            }
        })
        .collect();

    Ok(PriorityAllocation {
        budget: round_cents(budget),
        total_priority,
        allocations,
    })
}

/// `max(1, floor(priority))`, with non-finite values counting as 1.
#[must_use]
pub fn effective_priority(raw: f64) -> u32 {
    if !raw.is_finite() || raw < 1.0 {
        return 1;
    }
    // Cast safety: raw is finite and >= 1; saturates at u32::MAX for absurd weights.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let floored = raw.floor().min(f64::from(u32::MAX)) as u32;
    floored
}

// Totals of u32 weights stay far below 2^53, so the float conversion is exact.
#[allow(clippy::cast_precision_loss)]
fn priority_ratio(priority: u32, total: u64) -> f64 {
    f64::from(priority) / total as f64
}

/// Rounds to two decimal places.
#[must_use]
pub fn round_cents(value: f64) -> f64 {
    round_to(value, 2)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
