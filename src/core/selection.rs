//! Budget-filtered candidate selection.
//!
//! For each allocated category, offers the in-stock catalog parts whose price sits inside the
//! category's window and that stay compatible when swapped into the current selection.

use crate::core::{
    budget::{BudgetAllocation, CategoryAllocation},
    compatibility::{CompatibilityVerdict, check_compatibility},
    part::{Part, normalize_category},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extra slack applied to the allocator's window when matching prices (±10%).
///
/// This stacks on top of the allocator's own ±20%, so the effective tolerance is wider than
/// either figure. Kept as-is for compatibility with existing clients; collapsing both into a
/// single tolerance needs a product decision.
pub const CANDIDATE_PRICE_SLACK: f64 = 0.1;

/// A part offered for a category, with the verdict of the selection it would produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The offered part
    pub part: Part,
    /// Verdict of the selection with this part swapped in
    pub compatibility: CompatibilityVerdict,
}

/// Candidates grouped by upper-cased category name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    /// Category name -> compatible candidates, in catalog order
    pub by_category: BTreeMap<String, Vec<Candidate>>,
}

impl CandidateSet {
    /// Candidates for `category` (case-insensitive); empty if none.
    #[must_use]
    pub fn for_category(&self, category: &str) -> &[Candidate] {
        self.by_category
            .get(&normalize_category(category))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Price window `[min * 0.9, max * 1.1]` used to match catalog parts to an allocation.
#[must_use]
pub fn candidate_price_window(allocation: &CategoryAllocation) -> (f64, f64) {
    (
        allocation.min_budget * (1.0 - CANDIDATE_PRICE_SLACK),
        allocation.max_budget * (1.0 + CANDIDATE_PRICE_SLACK),
    )
}

/// Returns `selection` with `candidate` replacing whatever part held its category.
#[must_use]
pub fn substitute(selection: &[Part], candidate: &Part) -> Vec<Part> {
    let mut trial = selection.to_vec();
    match trial.iter().position(|p| p.category == candidate.category) {
        Some(index) => trial[index] = candidate.clone(),
        None => trial.push(candidate.clone()),
    }
    trial
}

/// Filters the catalog down to budget-fitting, compatible candidates per category.
///
/// A locked category (already spent) only offers the part selected for it. Out-of-stock parts
/// are never offered.
#[must_use]
pub fn filter_components_by_budget_and_compatibility(
    catalog: &[Part],
    selection: &[Part],
    allocation: &BudgetAllocation,
) -> CandidateSet {
    let mut by_category = BTreeMap::new();

    for alloc in &allocation.allocations {
        let category = normalize_category(&alloc.category_name);
        let (min_price, max_price) = candidate_price_window(alloc);

        let candidates: Vec<Candidate> = catalog
            .iter()
            .filter(|part| part.stock_status && part.category == category)
            .filter(|part| {
                if alloc.is_locked() {
                    selection
                        .iter()
                        .any(|s| s.category == category && s.id == part.id)
                } else {
                    let price = if part.price.is_finite() { part.price } else { 0.0 };
                    price >= min_price && price <= max_price
                }
            })
            .filter_map(|part| {
                let compatibility = check_compatibility(&substitute(selection, part));
                compatibility.is_compatible.then(|| Candidate {
                    part: part.clone(),
                    compatibility,
                })
            })
            .collect();

        by_category.insert(category, candidates);
    }

    CandidateSet { by_category }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::budget::{CategoryWeight, allocate_budget_by_category};
    use crate::core::compatibility::{CPU, MOTHERBOARD};

    fn categories() -> Vec<CategoryWeight> {
        vec![CategoryWeight::new(CPU, 1.0), CategoryWeight::new(MOTHERBOARD, 1.0)]
    }

    #[test]
    fn test_window_is_widened_twice() {
        let allocation = allocate_budget_by_category(1000.0, &categories(), &[]).unwrap();
        let cpu = allocation.for_category(CPU).unwrap();
        // 500 allocated -> [400, 600] -> [360, 660]
        let (min, max) = candidate_price_window(cpu);
        assert!((min - 360.0).abs() < 1e-9);
        assert!((max - 660.0).abs() < 1e-9);
    }

    #[test]
    fn test_price_and_stock_filtering() {
        let catalog = vec![
            Part::new(1, "cheap", CPU, 300.0).with_socket("AM5"),
            Part::new(2, "near-low", CPU, 365.0).with_socket("AM5"),
            Part::new(3, "near-high", CPU, 655.0).with_socket("AM5"),
            Part::new(4, "pricey", CPU, 700.0).with_socket("AM5"),
            Part::new(5, "gone", CPU, 500.0).with_socket("AM5").with_stock(false),
        ];
        let allocation = allocate_budget_by_category(1000.0, &categories(), &[]).unwrap();
        let set = filter_components_by_budget_and_compatibility(&catalog, &[], &allocation);

        let ids: Vec<i64> = set.for_category("cpu").iter().map(|c| c.part.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(set.for_category(MOTHERBOARD).is_empty());
    }

    #[test]
    fn test_incompatible_candidates_dropped() {
        let board = Part::new(10, "board", MOTHERBOARD, 400.0).with_socket("AM5");
        let catalog = vec![
            Part::new(1, "amd", CPU, 450.0).with_socket("AM5"),
            Part::new(2, "intel", CPU, 450.0).with_socket("LGA1700"),
            board.clone(),
        ];
        let selection = vec![board];
        let allocation = allocate_budget_by_category(1000.0, &categories(), &selection).unwrap();
        let set = filter_components_by_budget_and_compatibility(&catalog, &selection, &allocation);

        let cpus = set.for_category(CPU);
        assert_eq!(cpus.len(), 1);
        assert_eq!(cpus[0].part.id, 1);
        assert!(cpus[0].compatibility.is_compatible);

        // Locked category offers only the selected board.
        let boards = set.for_category(MOTHERBOARD);
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].part.id, 10);
    }

    #[test]
    fn test_substitute_replaces_same_category() {
        let selection = vec![
            Part::new(1, "old cpu", CPU, 100.0),
            Part::new(2, "board", MOTHERBOARD, 100.0),
        ];
        let trial = substitute(&selection, &Part::new(3, "new cpu", CPU, 200.0));
        assert_eq!(trial.len(), 2);
        assert_eq!(trial[0].id, 3);

        let trial = substitute(&selection[1..], &Part::new(3, "new cpu", CPU, 200.0));
        assert_eq!(trial.len(), 2);
        assert_eq!(trial[1].id, 3);
    }
}
