#![deny(warnings)]

//! Smallest-team search: which candidates jointly cover a recipe.
//!
//! The solver branches on the producers of the first uncovered ingredient,
//! memoizes each canonical (remaining requirement, free slots) state, and
//! polls a wall-clock deadline at every recursive entry. Results are ranked
//! by how little filler the team produces.

use serde::{Deserialize, Serialize};
use team_core::{IngredientAmount, ValidationError};
use thiserror::Error;

pub mod index;
pub mod memo;
pub mod rank;
pub mod solver;

pub use index::ReverseIndex;
pub use memo::{MemoKey, MemoKeyError, SearchState};
pub use rank::{rank, team_hash, TeamSolution};
pub use solver::{Deadline, SearchStats, SetCover, Team};

/// Search limits for one optimization request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Largest team considered.
    pub max_team_size: usize,
    /// Wall-clock budget in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_team_size: team_core::MAX_TEAM_SIZE,
            timeout_ms: 10_000,
        }
    }
}

/// Errors produced by the team search.
#[derive(Debug, Error, PartialEq)]
pub enum SetCoverError {
    #[error("invalid recipe: {0}")]
    Validation(#[from] ValidationError),
    #[error("corrupt memo key: {0}")]
    MemoKey(#[from] MemoKeyError),
    /// The search reached a state its own bookkeeping rules out. Always a bug.
    #[error("set cover invariant violated: {0}")]
    Invariant(String),
}

/// Smallest teams covering `recipe`, using a fresh solver session.
pub fn find_optimal_combination_for(
    index: &ReverseIndex,
    recipe: &[IngredientAmount],
    config: &SolverConfig,
) -> Result<Vec<TeamSolution>, SetCoverError> {
    SetCover::new(index).find_optimal_combination_for(recipe, config)
}

/// Size of the smallest covering team, or `max_team_size + 1` when none fits.
pub fn calculate_min_team_size_for(
    index: &ReverseIndex,
    recipe: &[IngredientAmount],
    config: &SolverConfig,
) -> Result<usize, SetCoverError> {
    SetCover::new(index).calculate_min_team_size_for(recipe, config)
}
