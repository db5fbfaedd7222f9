//! Ingredient to producer lookup consumed by the solver.

use std::collections::HashMap;
use team_core::ingredients::combine_same_ingredients;
use team_core::{validate_candidate, Candidate, IngredientId, ValidationError};

/// Maps each ingredient to the candidates that produce a positive amount of it.
///
/// Built once per search session and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct ReverseIndex {
    by_ingredient: HashMap<IngredientId, Vec<Candidate>>,
}

impl ReverseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every candidate under each distinct ingredient it produces.
    ///
    /// Fails on the first candidate with an empty name, a bad ingredient id,
    /// or a negative or non-finite produce amount.
    pub fn from_candidates<I>(candidates: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut index = Self::new();
        for candidate in candidates {
            validate_candidate(&candidate)?;
            for produced in combine_same_ingredients(&candidate.produce) {
                if produced.amount > 0.0 {
                    index.insert(produced.ingredient, candidate.clone());
                }
            }
        }
        Ok(index)
    }

    fn insert(&mut self, ingredient: IngredientId, candidate: Candidate) {
        self.by_ingredient.entry(ingredient).or_default().push(candidate);
    }

    /// Producers of `ingredient`, in insertion order.
    pub fn producers_of(&self, ingredient: &IngredientId) -> &[Candidate] {
        self.by_ingredient
            .get(ingredient)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct indexed ingredients.
    pub fn len(&self) -> usize {
        self.by_ingredient.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ingredient.is_empty()
    }
}
