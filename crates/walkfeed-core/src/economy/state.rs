use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pet::PetIdentity;

/// Hunger level of a freshly adopted or reset pet.
pub const FULL_HUNGER: f64 = 100.0;

/// Levels at or below this are treated as zero, absorbing float drift from
/// repeated fractional decay.
pub const DEATH_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeState {
    Alive,
    Dead,
}

/// Coarse wellbeing classification of the hunger level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HungerBand {
    /// Above 70%.
    Healthy,
    /// 30% to 70% inclusive.
    Peckish,
    /// Below 30%.
    Starving,
}

impl HungerBand {
    pub fn from_level(level: f64) -> Self {
        if level > 70.0 {
            HungerBand::Healthy
        } else if level < 30.0 {
            HungerBand::Starving
        } else {
            HungerBand::Peckish
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HungerBand::Healthy => "Your pet is happy!",
            HungerBand::Peckish => "Your pet is getting hungry.",
            HungerBand::Starving => "Your pet is starving!",
        }
    }
}

/// Everything the economy knows about the pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetState {
    /// Cumulative steps observed today.
    pub today_steps: u64,
    /// Spendable currency.
    pub hunger_points: u64,
    /// Wellbeing in `[0, 100]`; 0 means dead.
    pub hunger_level: f64,
    pub is_dead: bool,
    #[serde(default)]
    pub pet: Option<PetIdentity>,
    /// Wall-clock time of the last applied decay tick.
    #[serde(default)]
    pub last_tick_at: Option<DateTime<Utc>>,
}

impl Default for PetState {
    fn default() -> Self {
        Self {
            today_steps: 0,
            hunger_points: 0,
            hunger_level: FULL_HUNGER,
            is_dead: false,
            pet: None,
            last_tick_at: None,
        }
    }
}

impl PetState {
    pub fn life(&self) -> LifeState {
        if self.is_dead {
            LifeState::Dead
        } else {
            LifeState::Alive
        }
    }

    pub fn band(&self) -> HungerBand {
        HungerBand::from_level(self.hunger_level)
    }

    /// Hunger level rounded for display and comparisons.
    pub fn display_level(&self) -> u8 {
        self.hunger_level.clamp(0.0, FULL_HUNGER).round() as u8
    }

    pub fn is_full(&self) -> bool {
        self.hunger_level >= FULL_HUNGER
    }

    /// Restore invariants on a state that came from outside (storage, tests).
    pub(crate) fn normalized(mut self) -> Self {
        if !self.hunger_level.is_finite() {
            self.hunger_level = if self.is_dead { 0.0 } else { FULL_HUNGER };
        }
        self.hunger_level = self.hunger_level.clamp(0.0, FULL_HUNGER);
        if self.hunger_level <= DEATH_EPSILON {
            self.hunger_level = 0.0;
            self.is_dead = true;
        }
        self
    }
}
