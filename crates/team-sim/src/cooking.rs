//! The shared cooking pot.

use serde::{Deserialize, Serialize};
use team_core::ingredients::{
    covers, normalize, normalize_requirement, round_amount, sum_amounts, surplus_over,
};
use team_core::{validate_recipe, IngredientAmount, Recipe};

use crate::SimError;

/// Per-day averages for the pot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CookingResult {
    pub meals: f64,
    /// Meals that cooked the target recipe.
    pub recipe_meals: f64,
    /// Meals cooked from whatever was in stock.
    pub filler_meals: f64,
    /// Total meals cooked under the Sunday rule.
    pub sunday_meals: u32,
    pub ingredients_used: f64,
    /// Stock left in the pot right now.
    pub stock: Vec<IngredientAmount>,
}

/// Contract between the simulator and the team's shared pot.
pub trait CookingState {
    /// Ingredients handed over by a member at mealtime.
    fn add_ingredients(&mut self, ingredients: &[IngredientAmount]);
    /// Cook one meal. `sunday` selects the weekly cooking rule.
    fn cook(&mut self, sunday: bool);
    /// Averages over `iterations` simulated days.
    fn results(&self, iterations: u32) -> CookingResult;
}

/// Static description of a [`CookingPot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PotDefinition {
    /// Pot capacity in ingredient units before bonuses.
    pub pot_size: f64,
    /// Dish to cook whenever the stock covers it.
    #[serde(default)]
    pub recipe: Recipe,
}

impl Default for PotDefinition {
    fn default() -> Self {
        Self {
            pot_size: 15.0,
            recipe: Vec::new(),
        }
    }
}

/// Pot capacity multiplier with the favorable camp bonus.
pub const CAMP_POT_MULTIPLIER: f64 = 1.5;
/// Pot capacity multiplier under the Sunday rule.
pub const SUNDAY_POT_MULTIPLIER: f64 = 2.0;

/// Reference pot: cooks the target recipe when possible, filler otherwise.
#[derive(Clone, Debug)]
pub struct CookingPot {
    recipe: Recipe,
    capacity: f64,
    stock: Vec<IngredientAmount>,
    meals: u32,
    recipe_meals: u32,
    filler_meals: u32,
    sunday_meals: u32,
    ingredients_used: f64,
}

impl CookingPot {
    pub fn new(def: PotDefinition, camp: bool) -> Result<Self, SimError> {
        if !(def.pot_size.is_finite() && def.pot_size > 0.0) {
            return Err(SimError::NonPositivePot);
        }
        validate_recipe(&def.recipe)?;
        let bonus = if camp { CAMP_POT_MULTIPLIER } else { 1.0 };
        Ok(Self {
            recipe: normalize_requirement(&def.recipe),
            capacity: (def.pot_size * bonus).floor(),
            stock: Vec::new(),
            meals: 0,
            recipe_meals: 0,
            filler_meals: 0,
            sunday_meals: 0,
            ingredients_used: 0.0,
        })
    }

    /// Capacity for the next meal.
    pub fn capacity(&self, sunday: bool) -> f64 {
        if sunday {
            self.capacity * SUNDAY_POT_MULTIPLIER
        } else {
            self.capacity
        }
    }

    pub fn stock(&self) -> &[IngredientAmount] {
        &self.stock
    }
}

/// Take up to `limit` units from `stock`, smallest ingredient id first.
fn take_up_to(stock: &[IngredientAmount], limit: f64) -> Vec<IngredientAmount> {
    let mut left = limit;
    let mut taken = Vec::new();
    for item in normalize(stock) {
        if left <= 0.0 {
            break;
        }
        let amount = round_amount(item.amount.min(left));
        left -= amount;
        taken.push(IngredientAmount { amount, ..item });
    }
    taken
}

impl CookingState for CookingPot {
    fn add_ingredients(&mut self, ingredients: &[IngredientAmount]) {
        self.stock.extend(ingredients.iter().cloned());
        self.stock = normalize(&self.stock);
    }

    fn cook(&mut self, sunday: bool) {
        let capacity = self.capacity(sunday);
        let recipe_size = sum_amounts(&self.recipe);
        let used = if !self.recipe.is_empty()
            && recipe_size <= capacity
            && covers(&self.stock, &self.recipe)
        {
            self.recipe_meals += 1;
            self.recipe.clone()
        } else {
            self.filler_meals += 1;
            take_up_to(&self.stock, capacity)
        };
        self.stock = surplus_over(&self.stock, &used);
        self.ingredients_used += sum_amounts(&used);
        self.meals += 1;
        if sunday {
            self.sunday_meals += 1;
        }
    }

    fn results(&self, iterations: u32) -> CookingResult {
        let days = iterations.max(1) as f64;
        CookingResult {
            meals: self.meals as f64 / days,
            recipe_meals: self.recipe_meals as f64 / days,
            filler_meals: self.filler_meals as f64 / days,
            sunday_meals: self.sunday_meals,
            ingredients_used: self.ingredients_used / days,
            stock: self.stock.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pot(recipe: Vec<IngredientAmount>, camp: bool) -> CookingPot {
        CookingPot::new(
            PotDefinition {
                pot_size: 15.0,
                recipe,
            },
            camp,
        )
        .unwrap()
    }

    #[test]
    fn camp_and_sunday_grow_the_pot() {
        let p = pot(Vec::new(), true);
        assert_eq!(p.capacity(false), 22.0);
        assert_eq!(p.capacity(true), 44.0);
        assert_eq!(pot(Vec::new(), false).capacity(false), 15.0);
    }

    #[test]
    fn rejects_empty_pot() {
        let def = PotDefinition {
            pot_size: 0.0,
            recipe: Vec::new(),
        };
        assert!(matches!(CookingPot::new(def, false), Err(SimError::NonPositivePot)));
    }

    #[test]
    fn cooks_recipe_when_stock_covers_it() {
        let mut p = pot(vec![IngredientAmount::new("honey", 5.0)], false);
        p.add_ingredients(&[IngredientAmount::new("honey", 3.0)]);
        p.add_ingredients(&[
            IngredientAmount::new("honey", 4.0),
            IngredientAmount::new("egg", 1.0),
        ]);
        p.cook(false);
        assert_eq!(
            p.stock(),
            &[IngredientAmount::new("egg", 1.0), IngredientAmount::new("honey", 2.0)]
        );
        let r = p.results(1);
        assert_eq!(r.recipe_meals, 1.0);
        assert_eq!(r.ingredients_used, 5.0);
    }

    #[test]
    fn filler_meal_is_capped_by_capacity() {
        let mut p = pot(vec![IngredientAmount::new("honey", 30.0)], false);
        p.add_ingredients(&[
            IngredientAmount::new("apple", 10.0),
            IngredientAmount::new("honey", 10.0),
        ]);
        p.cook(false);
        assert_eq!(p.stock(), &[IngredientAmount::new("honey", 5.0)]);
        p.cook(true);
        assert!(p.stock().is_empty());
        let r = p.results(2);
        assert_eq!(r.filler_meals, 1.0);
        assert_eq!(r.sunday_meals, 1);
        assert_eq!(r.ingredients_used, 10.0);
    }
}
