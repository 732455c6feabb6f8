//! Pure predicate set over a catalog snapshot.
//!
//! Filtering is cheap enough to re-run on every recompute for catalogs of
//! tens to low hundreds of records, so no caching is attempted.

use crate::model::{Difficulty, Problem};

/// Conjunctive filter criteria for the catalog view.
///
/// An unset axis places no constraint; the default value is the identity
/// filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring match against the problem name.
    pub search: String,
    /// Exact difficulty match when set.
    pub difficulty: Option<Difficulty>,
    /// Exact category match when set.
    pub category: Option<String>,
}

impl FilterCriteria {
    /// Returns true if no axis constrains the result.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.search.is_empty() && self.difficulty.is_none() && self.category.is_none()
    }
}

/// Apply the criteria over a catalog snapshot in a single order-preserving
/// pass.
///
/// Empty criteria yield the input unchanged. Deterministic and side-effect
/// free.
#[must_use]
pub fn apply(problems: &[Problem], criteria: &FilterCriteria) -> Vec<Problem> {
    let search = criteria.search.to_lowercase();

    problems
        .iter()
        .filter(|problem| {
            let by_search = search.is_empty() || problem.name().to_lowercase().contains(&search);
            let by_difficulty = criteria
                .difficulty
                .is_none_or(|difficulty| problem.difficulty() == difficulty);
            let by_category = criteria
                .category
                .as_deref()
                .is_none_or(|category| problem.category() == category);

            by_search && by_difficulty && by_category
        })
        .cloned()
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
