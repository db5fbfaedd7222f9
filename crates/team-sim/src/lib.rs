#![deny(warnings)]

//! Minute-by-minute simulation of a helper team over whole days.
//!
//! A day starts at wakeup and advances in 5 minute ticks: daytime ticks
//! cook meals, attempt helps and broadcast team skills; the inventory is
//! collected at bedtime; night ticks keep helping until the day wraps.
//! Energy decays every other tick throughout.

use serde::{Deserialize, Serialize};
use team_core::{validate_team, TeamSettings, ValidationError};
use thiserror::Error;
use tracing::info;

pub mod cooking;
pub mod meals;
pub mod member;
pub mod simulator;
pub mod time;

pub use cooking::{CookingPot, CookingResult, CookingState, PotDefinition};
pub use member::{HelperMember, MemberDefinition, MemberResult, MemberState, SkillActivation};
pub use simulator::{DayStats, TeamResults, TeamSimulator};

/// Errors building simulation participants.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("member {0}: help interval must be positive")]
    NonPositiveInterval(String),
    #[error("member {0}: skill chance must be within [0, 1]")]
    InvalidSkillChance(String),
    #[error("member {0}: inventory limit and meal recovery must be non-negative")]
    NegativeLimit(String),
    #[error("pot size must be positive")]
    NonPositivePot,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Everything needed to simulate a team built from reference members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamDefinition {
    pub settings: TeamSettings,
    pub members: Vec<MemberDefinition>,
    #[serde(default)]
    pub pot: PotDefinition,
    /// Seed for skill activation rolls.
    #[serde(default)]
    pub rng_seed: u64,
}

/// Build a simulator over [`HelperMember`]s and a [`CookingPot`].
///
/// Member `i` rolls its skills with seed `rng_seed + i`.
pub fn build_team(
    def: &TeamDefinition,
) -> Result<TeamSimulator<HelperMember, CookingPot>, SimError> {
    let names: Vec<&str> = def.members.iter().map(|m| m.name.as_str()).collect();
    validate_team(&def.settings, &names)?;
    let members = def
        .members
        .iter()
        .enumerate()
        .map(|(i, m)| HelperMember::new(m.clone(), def.rng_seed.wrapping_add(i as u64)))
        .collect::<Result<Vec<_>, _>>()?;
    let pot = CookingPot::new(def.pot.clone(), def.settings.camp)?;
    Ok(TeamSimulator::new(&def.settings, members, pot))
}

/// Simulate `days` consecutive days and return the averaged results.
pub fn simulate_days<M: MemberState, C: CookingState>(
    sim: &mut TeamSimulator<M, C>,
    days: u32,
) -> TeamResults {
    for _ in 0..days {
        sim.simulate();
    }
    info!(days, total_runs = sim.runs(), "simulation finished");
    sim.results()
}
