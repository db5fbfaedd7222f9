//! Arithmetic over ingredient multisets.
//!
//! All functions are pure. Multisets are plain slices of [`IngredientAmount`];
//! duplicate entries for one ingredient are allowed on input and are combined
//! wherever a result is canonical.

use crate::{IngredientAmount, IngredientId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decimal places kept for amounts in canonical multisets.
pub const AMOUNT_DECIMALS: i32 = 2;

/// Shortfalls at or below this are float noise, not missing ingredients.
pub const AMOUNT_EPSILON: f64 = 1e-9;

/// Round an amount to [`AMOUNT_DECIMALS`] places.
pub fn round_amount(amount: f64) -> f64 {
    let scale = 10f64.powi(AMOUNT_DECIMALS);
    (amount * scale).round() / scale
}

/// Round a requirement up to [`AMOUNT_DECIMALS`] places, so it never shrinks.
pub fn ceil_amount(amount: f64) -> f64 {
    let scale = 10f64.powi(AMOUNT_DECIMALS);
    ((amount * scale - 1e-6).ceil() / scale).max(0.0)
}

fn totals(items: &[IngredientAmount]) -> BTreeMap<&IngredientId, f64> {
    let mut totals: BTreeMap<&IngredientId, f64> = BTreeMap::new();
    for item in items {
        *totals.entry(&item.ingredient).or_insert(0.0) += item.amount;
    }
    totals
}

/// Sum amounts per distinct ingredient. Output is sorted by ingredient id.
pub fn combine_same_ingredients(items: &[IngredientAmount]) -> Vec<IngredientAmount> {
    totals(items)
        .into_iter()
        .map(|(id, amount)| IngredientAmount {
            ingredient: id.clone(),
            amount,
        })
        .collect()
}

/// Canonical multiset form: combined, rounded, zero entries dropped, sorted by id.
pub fn normalize(items: &[IngredientAmount]) -> Vec<IngredientAmount> {
    combine_same_ingredients(items)
        .into_iter()
        .map(|a| IngredientAmount {
            amount: round_amount(a.amount),
            ..a
        })
        .filter(|a| a.amount > 0.0)
        .collect()
}

/// Canonical form of a requirement: like [`normalize`], but amounts round up.
pub fn normalize_requirement(items: &[IngredientAmount]) -> Vec<IngredientAmount> {
    combine_same_ingredients(items)
        .into_iter()
        .filter(|a| a.amount > AMOUNT_EPSILON)
        .map(|a| IngredientAmount {
            amount: ceil_amount(a.amount),
            ..a
        })
        .collect()
}

/// Total of all amounts.
pub fn sum_amounts(items: &[IngredientAmount]) -> f64 {
    items.iter().map(|i| i.amount).sum()
}

/// What is left of `requirement` once `produce` is applied.
///
/// Entries keep the order of `requirement`; satisfied entries are dropped and
/// any real shortfall is rounded up, never down to zero.
/// `requirement` is expected to hold one entry per ingredient.
pub fn remaining_after(
    requirement: &[IngredientAmount],
    produce: &[IngredientAmount],
) -> Vec<IngredientAmount> {
    let produced = totals(produce);
    requirement
        .iter()
        .filter_map(|req| {
            let have = produced.get(&req.ingredient).copied().unwrap_or(0.0);
            let left = req.amount - have;
            (left > AMOUNT_EPSILON).then(|| IngredientAmount {
                ingredient: req.ingredient.clone(),
                amount: ceil_amount(left),
            })
        })
        .collect()
}

/// Amounts produced beyond what `recipe` requires. Positive entries only, sorted by id.
pub fn surplus_over(
    produce: &[IngredientAmount],
    recipe: &[IngredientAmount],
) -> Vec<IngredientAmount> {
    let required = totals(recipe);
    combine_same_ingredients(produce)
        .into_iter()
        .filter_map(|p| {
            let need = required.get(&p.ingredient).copied().unwrap_or(0.0);
            let extra = round_amount(p.amount - need);
            (extra > 0.0).then(|| IngredientAmount {
                ingredient: p.ingredient,
                amount: extra,
            })
        })
        .collect()
}

/// Whether `produce` meets or exceeds every requirement of `recipe`.
pub fn covers(produce: &[IngredientAmount], recipe: &[IngredientAmount]) -> bool {
    remaining_after(&combine_same_ingredients(recipe), produce).is_empty()
}

/// Surplus of a team relative to a recipe, split by whether the recipe asks for it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Surplus {
    /// Every positive surplus entry.
    pub total: Vec<IngredientAmount>,
    /// Surplus on ingredients the recipe requires.
    pub relevant: Vec<IngredientAmount>,
    /// Filler: surplus on ingredients the recipe does not use at all.
    pub extra: Vec<IngredientAmount>,
}

impl Surplus {
    /// Summed filler production.
    pub fn filler(&self) -> f64 {
        sum_amounts(&self.extra)
    }

    /// Summed overproduction of required ingredients.
    pub fn relevant_sum(&self) -> f64 {
        sum_amounts(&self.relevant)
    }
}

/// Split a total surplus into the parts inside and outside `recipe`.
pub fn extract_relevant_surplus(
    recipe: &[IngredientAmount],
    total: Vec<IngredientAmount>,
) -> Surplus {
    let required = totals(recipe);
    let (relevant, extra): (Vec<_>, Vec<_>) = total
        .iter()
        .cloned()
        .partition(|s| required.contains_key(&s.ingredient));
    Surplus {
        total,
        relevant,
        extra,
    }
}
