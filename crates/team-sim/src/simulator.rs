//! Stepped day/night simulation of a fixed team.

use serde::{Deserialize, Serialize};
use team_core::TeamSettings;
use tracing::debug;

use crate::cooking::{CookingResult, CookingState};
use crate::meals::default_meal_times;
use crate::member::{MemberResult, MemberState, SkillActivation};
use crate::time::DayClock;

/// Snapshot of the team's averaged results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamResults {
    pub members: Vec<MemberResult>,
    pub cooking: CookingResult,
}

/// Counters of the most recent simulated day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DayStats {
    pub day_ticks: u32,
    pub night_ticks: u32,
    pub energy_decays: u32,
    pub meals_cooked: u32,
    pub team_skills: u32,
}

/// Every 7th simulated day cooks under the Sunday rule.
pub const DAYS_PER_WEEK: u32 = 7;

/// Steps a team through whole days at 5 minute resolution.
pub struct TeamSimulator<M, C> {
    members: Vec<M>,
    cooking: C,
    clock: DayClock,
    meal_times: Vec<u32>,
    run: u32,
    cooked_meals: usize,
    // Starts at -1 so the first decay lands after the third tick.
    energy_decay_counter: i32,
    stats: DayStats,
}

impl<M: MemberState, C: CookingState> TeamSimulator<M, C> {
    pub fn new(settings: &TeamSettings, members: Vec<M>, cooking: C) -> Self {
        Self {
            members,
            cooking,
            clock: DayClock::new(settings),
            meal_times: default_meal_times(&settings.day_period()),
            run: 0,
            cooked_meals: 0,
            energy_decay_counter: -1,
            stats: DayStats::default(),
        }
    }

    /// Simulate one full day. Counters that span days persist across calls.
    pub fn simulate(&mut self) {
        self.init();

        let clock = self.clock;
        for minute in clock.day_ticks() {
            self.attempt_cooking(minute);
            for i in 0..self.members.len() {
                if let Some(skill) = self.members[i].attempt_day_help(minute) {
                    self.activate_team_skill(skill);
                }
            }
            self.maybe_degrade_energy();
            self.stats.day_ticks += 1;
        }

        self.collect_inventory();

        for minute in clock.night_ticks() {
            for member in &mut self.members {
                member.attempt_night_help(minute);
            }
            self.maybe_degrade_energy();
            self.stats.night_ticks += 1;
        }

        debug!(
            run = self.run,
            meals = self.stats.meals_cooked,
            decays = self.stats.energy_decays,
            team_skills = self.stats.team_skills,
            "simulated day"
        );
    }

    /// Averages over every day simulated so far.
    pub fn results(&self) -> TeamResults {
        TeamResults {
            members: self.members.iter().map(|m| m.results(self.run)).collect(),
            cooking: self.cooking.results(self.run),
        }
    }

    /// Number of days simulated so far.
    pub fn runs(&self) -> u32 {
        self.run
    }

    pub fn last_day_stats(&self) -> DayStats {
        self.stats
    }

    pub fn meal_times(&self) -> &[u32] {
        &self.meal_times
    }

    fn init(&mut self) {
        self.stats = DayStats::default();
        for i in 0..self.members.len() {
            for skill in self.members[i].start_day() {
                self.activate_team_skill(skill);
            }
        }
        self.energy_decay_counter = -1;
        self.cooked_meals = 0;
        self.run += 1;
    }

    fn attempt_cooking(&mut self, minutes_since_wakeup: u32) {
        let Some(&meal_time) = self.meal_times.get(self.cooked_meals) else {
            return;
        };
        if minutes_since_wakeup < meal_time {
            return;
        }
        for member in &mut self.members {
            let delivered = member.update_ingredient_bag();
            self.cooking.add_ingredients(&delivered);
            member.recover_meal();
        }
        self.cooking.cook(self.run % DAYS_PER_WEEK == 0);
        self.cooked_meals += 1;
        self.stats.meals_cooked += 1;
    }

    fn maybe_degrade_energy(&mut self) {
        self.energy_decay_counter += 1;
        if self.energy_decay_counter >= 2 {
            self.energy_decay_counter = 0;
            for member in &mut self.members {
                member.degrade_energy();
            }
            self.stats.energy_decays += 1;
        }
    }

    fn activate_team_skill(&mut self, skill: SkillActivation) {
        self.stats.team_skills += 1;
        match skill {
            SkillActivation::HelpsTeam(helps) => {
                for member in &mut self.members {
                    member.add_helps(helps);
                }
            }
            SkillActivation::EnergyTeam(energy) => {
                for member in &mut self.members {
                    member.recover_energy(energy);
                }
            }
        }
    }

    fn collect_inventory(&mut self) {
        for member in &mut self.members {
            member.collect_inventory();
        }
    }
}
