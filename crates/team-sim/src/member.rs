//! Per-member behavior the simulator drives, and a reference helper model.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use team_core::ingredients::{combine_same_ingredients, sum_amounts};
use team_core::{validate_amount, IngredientAmount};

use crate::SimError;

/// Team-wide effect of a skill activation. These are the only broadcast kinds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum SkillActivation {
    /// Every member performs this many extra helps.
    HelpsTeam(u32),
    /// Every member recovers this much energy.
    EnergyTeam(f64),
}

/// Per-day averages for one member.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberResult {
    pub name: String,
    pub day_helps: f64,
    pub night_helps: f64,
    /// Helps granted by team skills.
    pub bonus_helps: f64,
    /// Helps whose ingredients were lost to a full inventory.
    pub spilled_helps: f64,
    pub skill_procs: f64,
    /// Ingredients gathered per day.
    pub produce: Vec<IngredientAmount>,
}

/// Contract between the simulator and one team member.
///
/// Times are minutes since wakeup. The simulator calls these strictly in
/// tick order and is the only caller while a day is simulated.
pub trait MemberState {
    /// Wake-up bookkeeping. Returns team skills that fire at wakeup.
    fn start_day(&mut self) -> Vec<SkillActivation>;
    /// A daytime help attempt; may activate a team skill.
    fn attempt_day_help(&mut self, minutes_since_wakeup: u32) -> Option<SkillActivation>;
    /// A nighttime help attempt. Night activations are never broadcast.
    fn attempt_night_help(&mut self, minutes_since_wakeup: u32);
    fn add_helps(&mut self, helps: u32);
    fn recover_energy(&mut self, energy: f64);
    fn degrade_energy(&mut self);
    /// Empty the inventory at a meal. Returns the ingredients handed to the pot.
    fn update_ingredient_bag(&mut self) -> Vec<IngredientAmount>;
    /// Energy effects of the meal just cooked.
    fn recover_meal(&mut self);
    /// Bedtime collection of everything gathered during the day.
    fn collect_inventory(&mut self);
    /// Averages over `iterations` simulated days.
    fn results(&self, iterations: u32) -> MemberResult;
}

/// Static description of a [`HelperMember`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberDefinition {
    pub name: String,
    /// Seconds between helps before the energy multiplier.
    pub help_interval_secs: f64,
    /// Ingredients found on every help.
    pub ingredients_per_help: Vec<IngredientAmount>,
    /// Inventory capacity in ingredient units.
    pub inventory_limit: f64,
    /// Chance in [0, 1] that a help activates the main skill.
    #[serde(default)]
    pub skill_chance: f64,
    /// Team effect of the main skill; `None` for skills that only affect the member.
    #[serde(default)]
    pub skill: Option<SkillActivation>,
    /// Energy recovered after each meal.
    #[serde(default)]
    pub meal_recovery: f64,
}

impl MemberDefinition {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.help_interval_secs.is_finite() && self.help_interval_secs > 0.0) {
            return Err(SimError::NonPositiveInterval(self.name.clone()));
        }
        if !(0.0..=1.0).contains(&self.skill_chance) {
            return Err(SimError::InvalidSkillChance(self.name.clone()));
        }
        if !(self.inventory_limit.is_finite() && self.inventory_limit >= 0.0)
            || !(self.meal_recovery.is_finite() && self.meal_recovery >= 0.0)
        {
            return Err(SimError::NegativeLimit(self.name.clone()));
        }
        self.ingredients_per_help.iter().try_for_each(validate_amount)?;
        Ok(())
    }
}

/// Energy level restored by a night of sleep.
pub const WAKEUP_ENERGY: f64 = 100.0;
/// Highest energy a member can hold.
pub const MAX_ENERGY: f64 = 150.0;
/// Energy lost on each decay event.
pub const ENERGY_DECAY: f64 = 1.0;

/// Help interval multiplier for an energy level.
pub fn energy_multiplier(energy: f64) -> f64 {
    if energy >= 81.0 {
        0.45
    } else if energy >= 61.0 {
        0.52
    } else if energy >= 41.0 {
        0.58
    } else if energy >= 1.0 {
        0.66
    } else {
        1.0
    }
}

/// Reference member: fixed output per help, energy-scaled timing, bounded inventory.
///
/// Night skill activations are banked (one at most) and fire at the next wakeup.
#[derive(Clone, Debug)]
pub struct HelperMember {
    def: MemberDefinition,
    help_units: f64,
    rng: ChaCha8Rng,
    energy: f64,
    next_help_at: f64,
    inventory: Vec<IngredientAmount>,
    collected: Vec<IngredientAmount>,
    banked_skill: bool,
    gathered: Vec<IngredientAmount>,
    day_helps: u64,
    night_helps: u64,
    bonus_helps: u64,
    spilled_helps: u64,
    skill_procs: u64,
}

impl HelperMember {
    pub fn new(def: MemberDefinition, seed: u64) -> Result<Self, SimError> {
        def.validate()?;
        let help_units = sum_amounts(&def.ingredients_per_help);
        Ok(Self {
            def,
            help_units,
            rng: ChaCha8Rng::seed_from_u64(seed),
            energy: WAKEUP_ENERGY,
            next_help_at: 0.0,
            inventory: Vec::new(),
            collected: Vec::new(),
            banked_skill: false,
            gathered: Vec::new(),
            day_helps: 0,
            night_helps: 0,
            bonus_helps: 0,
            spilled_helps: 0,
            skill_procs: 0,
        })
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Minutes until the next help at the current energy.
    pub fn help_interval_minutes(&self) -> f64 {
        self.def.help_interval_secs / 60.0 * energy_multiplier(self.energy)
    }

    fn inventory_units(&self) -> f64 {
        sum_amounts(&self.inventory)
    }

    /// One help's worth of ingredients, unless the inventory is full.
    fn gather(&mut self) {
        if self.inventory_units() + self.help_units > self.def.inventory_limit {
            self.spilled_helps += 1;
            return;
        }
        self.inventory.extend(self.def.ingredients_per_help.iter().cloned());
        self.inventory = combine_same_ingredients(&self.inventory);
    }

    fn roll_skill(&mut self) -> bool {
        let procced = self.rng.gen_bool(self.def.skill_chance);
        if procced {
            self.skill_procs += 1;
        }
        procced
    }

    fn help_due(&mut self, minutes_since_wakeup: u32) -> bool {
        let now = minutes_since_wakeup as f64;
        if now < self.next_help_at {
            return false;
        }
        self.next_help_at = now + self.help_interval_minutes();
        true
    }
}

impl MemberState for HelperMember {
    fn start_day(&mut self) -> Vec<SkillActivation> {
        self.energy = self.energy.max(WAKEUP_ENERGY);
        self.next_help_at = 0.0;
        let banked = std::mem::take(&mut self.banked_skill);
        match self.def.skill {
            Some(skill) if banked => vec![skill],
            _ => Vec::new(),
        }
    }

    fn attempt_day_help(&mut self, minutes_since_wakeup: u32) -> Option<SkillActivation> {
        if !self.help_due(minutes_since_wakeup) {
            return None;
        }
        self.day_helps += 1;
        self.gather();
        if self.roll_skill() {
            self.def.skill
        } else {
            None
        }
    }

    fn attempt_night_help(&mut self, minutes_since_wakeup: u32) {
        if !self.help_due(minutes_since_wakeup) {
            return;
        }
        self.night_helps += 1;
        self.gather();
        if !self.banked_skill && self.roll_skill() {
            self.banked_skill = true;
        }
    }

    fn add_helps(&mut self, helps: u32) {
        for _ in 0..helps {
            self.bonus_helps += 1;
            self.gather();
        }
    }

    fn recover_energy(&mut self, energy: f64) {
        self.energy = (self.energy + energy).min(MAX_ENERGY);
    }

    fn degrade_energy(&mut self) {
        self.energy = (self.energy - ENERGY_DECAY).max(0.0);
    }

    fn update_ingredient_bag(&mut self) -> Vec<IngredientAmount> {
        let mut delivered = std::mem::take(&mut self.collected);
        delivered.append(&mut self.inventory);
        let delivered = combine_same_ingredients(&delivered);
        self.gathered.extend(delivered.iter().cloned());
        self.gathered = combine_same_ingredients(&self.gathered);
        delivered
    }

    fn recover_meal(&mut self) {
        if self.def.meal_recovery > 0.0 {
            self.recover_energy(self.def.meal_recovery);
        }
    }

    fn collect_inventory(&mut self) {
        self.collected.append(&mut self.inventory);
        self.collected = combine_same_ingredients(&self.collected);
    }

    fn results(&self, iterations: u32) -> MemberResult {
        let days = iterations.max(1) as f64;
        MemberResult {
            name: self.def.name.clone(),
            day_helps: self.day_helps as f64 / days,
            night_helps: self.night_helps as f64 / days,
            bonus_helps: self.bonus_helps as f64 / days,
            spilled_helps: self.spilled_helps as f64 / days,
            skill_procs: self.skill_procs as f64 / days,
            produce: self
                .gathered
                .iter()
                .map(|g| IngredientAmount {
                    ingredient: g.ingredient.clone(),
                    amount: g.amount / days,
                })
                .collect(),
        }
    }
}
