#![deny(warnings)]

//! Core domain models and invariants for helper team planning.
//!
//! This crate defines the serializable types shared by the team optimizer and
//! the day simulator, plus validation helpers guarding their basic invariants.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

pub mod ingredients;

pub use ingredients::Surplus;

/// Largest team the game allows.
pub const MAX_TEAM_SIZE: usize = 5;

/// Characters reserved by the memo key encoding; ingredient names may not contain them.
pub const RESERVED_KEY_CHARS: [char; 3] = [',', '=', '|'];

/// Unique identifier for an ingredient, e.g. "honey" or "fancy_apple".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IngredientId(pub String);

impl IngredientId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IngredientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An amount of a single ingredient. Used for recipes, produce and surplus alike.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IngredientAmount {
    /// Which ingredient.
    pub ingredient: IngredientId,
    /// How much of it (>= 0, may be fractional for averaged production).
    pub amount: f64,
}

impl IngredientAmount {
    pub fn new(ingredient: impl Into<String>, amount: f64) -> Self {
        Self {
            ingredient: IngredientId::new(ingredient),
            amount,
        }
    }
}

/// Target multiset of required ingredients. Order carries no meaning.
pub type Recipe = Vec<IngredientAmount>;

/// A character with a fixed ingredient loadout and its already-computed produce.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Character name, e.g. "pinsir".
    pub character: String,
    /// Ingredients unlocked at each ingredient level, in unlock order.
    pub loadout: Vec<IngredientId>,
    /// Ingredient output over the evaluated period.
    pub produce: Vec<IngredientAmount>,
}

impl Candidate {
    /// Canonical identity of the character and loadout, independent of produce.
    pub fn identity_hash(&self) -> String {
        let loadout: Vec<&str> = self.loadout.iter().map(IngredientId::as_str).collect();
        format!("{}:{}", self.character, loadout.join(","))
    }

    /// Amount of `ingredient` this candidate produces, summing duplicate entries.
    pub fn produces(&self, ingredient: &IngredientId) -> f64 {
        self.produce
            .iter()
            .filter(|p| &p.ingredient == ingredient)
            .map(|p| p.amount)
            .sum()
    }
}

/// A time of day window; `end` may be earlier than `start` when it wraps midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Sleep schedule and camp settings shared by the whole team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSettings {
    /// Time the player wakes up; the simulated day starts here.
    pub wakeup: NaiveTime,
    /// Time the player goes to sleep; the night phase starts here.
    pub bedtime: NaiveTime,
    /// Whether the favorable camp bonus is active.
    #[serde(default)]
    pub camp: bool,
}

impl TeamSettings {
    pub fn day_period(&self) -> TimePeriod {
        TimePeriod {
            start: self.wakeup,
            end: self.bedtime,
        }
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Ingredient names must be non-empty.
    #[error("ingredient name must not be empty")]
    EmptyIngredient,
    /// Ingredient names may not contain memo key separators.
    #[error("ingredient name {0:?} contains a reserved character")]
    ReservedCharacter(String),
    /// Amounts must be finite.
    #[error("non-finite amount for ingredient {0}")]
    NonFinite(String),
    /// Amounts must be non-negative.
    #[error("negative amount for ingredient {0}")]
    NegativeAmount(String),
    /// Character names must be non-empty.
    #[error("candidate character name must not be empty")]
    EmptyCharacter,
    /// Team may hold at most [`MAX_TEAM_SIZE`] members.
    #[error("team size {0} exceeds the maximum of {}", MAX_TEAM_SIZE)]
    TeamTooLarge(usize),
    /// Wakeup and bedtime must differ.
    #[error("wakeup and bedtime must differ")]
    EmptyDay,
    /// Member names in a team must be unique.
    #[error("duplicate team member: {0}")]
    DuplicateMember(String),
}

/// Validate an ingredient identity.
pub fn validate_ingredient_id(id: &IngredientId) -> Result<(), ValidationError> {
    if id.0.trim().is_empty() {
        return Err(ValidationError::EmptyIngredient);
    }
    if id.0.contains(RESERVED_KEY_CHARS) {
        return Err(ValidationError::ReservedCharacter(id.0.clone()));
    }
    Ok(())
}

/// Validate a single ingredient amount.
pub fn validate_amount(a: &IngredientAmount) -> Result<(), ValidationError> {
    validate_ingredient_id(&a.ingredient)?;
    if !a.amount.is_finite() {
        return Err(ValidationError::NonFinite(a.ingredient.0.clone()));
    }
    if a.amount < 0.0 {
        return Err(ValidationError::NegativeAmount(a.ingredient.0.clone()));
    }
    Ok(())
}

/// Validate a recipe. An empty recipe is valid; it is simply already satisfied.
pub fn validate_recipe(recipe: &[IngredientAmount]) -> Result<(), ValidationError> {
    recipe.iter().try_for_each(validate_amount)
}

/// Validate a candidate and its produce.
pub fn validate_candidate(c: &Candidate) -> Result<(), ValidationError> {
    if c.character.trim().is_empty() {
        return Err(ValidationError::EmptyCharacter);
    }
    c.loadout.iter().try_for_each(validate_ingredient_id)?;
    c.produce.iter().try_for_each(validate_amount)
}

/// Validate team settings together with the names of the members taking part.
pub fn validate_team(
    settings: &TeamSettings,
    member_names: &[&str],
) -> Result<(), ValidationError> {
    if settings.wakeup == settings.bedtime {
        return Err(ValidationError::EmptyDay);
    }
    if member_names.len() > MAX_TEAM_SIZE {
        return Err(ValidationError::TeamTooLarge(member_names.len()));
    }
    let mut seen = BTreeSet::new();
    for name in member_names {
        if !seen.insert(*name) {
            return Err(ValidationError::DuplicateMember(name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn pinsir() -> Candidate {
        Candidate {
            character: "pinsir".to_string(),
            loadout: vec![
                IngredientId::new("honey"),
                IngredientId::new("fancy_apple"),
            ],
            produce: vec![
                IngredientAmount::new("honey", 5.0),
                IngredientAmount::new("fancy_apple", 3.0),
                IngredientAmount::new("honey", 1.5),
            ],
        }
    }

    #[test]
    fn identity_hash_ignores_produce() {
        let a = pinsir();
        let mut b = pinsir();
        b.produce.clear();
        assert_eq!(a.identity_hash(), "pinsir:honey,fancy_apple");
        assert_eq!(a.identity_hash(), b.identity_hash());
    }

    #[test]
    fn produces_sums_duplicates() {
        assert_eq!(pinsir().produces(&IngredientId::new("honey")), 6.5);
        assert_eq!(pinsir().produces(&IngredientId::new("tomato")), 0.0);
    }

    #[test]
    fn serde_roundtrip_settings() {
        let s = TeamSettings {
            wakeup: time(6, 0),
            bedtime: time(21, 30),
            camp: true,
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: TeamSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert_eq!(back.day_period().end, time(21, 30));
    }

    #[test]
    fn camp_defaults_to_false() {
        let back: TeamSettings =
            serde_json::from_str(r#"{"wakeup":"06:00:00","bedtime":"21:30:00"}"#).unwrap();
        assert!(!back.camp);
    }

    #[test]
    fn rejects_bad_ingredients() {
        assert_eq!(
            validate_ingredient_id(&IngredientId::new(" ")),
            Err(ValidationError::EmptyIngredient)
        );
        assert!(matches!(
            validate_ingredient_id(&IngredientId::new("a|b")),
            Err(ValidationError::ReservedCharacter(_))
        ));
        assert!(matches!(
            validate_amount(&IngredientAmount::new("honey", -1.0)),
            Err(ValidationError::NegativeAmount(_))
        ));
        assert!(matches!(
            validate_amount(&IngredientAmount::new("honey", f64::NAN)),
            Err(ValidationError::NonFinite(_))
        ));
    }

    #[test]
    fn empty_recipe_is_valid() {
        assert!(validate_recipe(&[]).is_ok());
        assert!(validate_candidate(&pinsir()).is_ok());
    }

    #[test]
    fn team_validation() {
        let s = TeamSettings {
            wakeup: time(6, 0),
            bedtime: time(22, 0),
            camp: false,
        };
        assert!(validate_team(&s, &["a", "b"]).is_ok());
        assert_eq!(
            validate_team(&s, &["a", "a"]),
            Err(ValidationError::DuplicateMember("a".to_string()))
        );
        assert_eq!(
            validate_team(&s, &["a", "b", "c", "d", "e", "f"]),
            Err(ValidationError::TeamTooLarge(6))
        );
        let same = TeamSettings {
            bedtime: time(6, 0),
            ..s
        };
        assert_eq!(validate_team(&same, &[]), Err(ValidationError::EmptyDay));
    }

    proptest! {
        #[test]
        fn non_negative_amounts_validate(amount in 0.0f64..10_000.0) {
            prop_assert!(validate_amount(&IngredientAmount::new("tomato", amount)).is_ok());
        }
    }
}
