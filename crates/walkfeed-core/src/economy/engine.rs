//! Pet economy state machine.
//!
//! The economy has no timer and no I/O. The host calls [`PetEconomy::tick`]
//! on its own schedule (or [`PetEconomy::catch_up`] after being away) and
//! forwards step readings and user actions as they arrive.
//!
//! ## State Transitions
//!
//! ```text
//! Alive --(decay reaches 0)--> Dead --(reset)--> Alive
//! ```
//!
//! Step ingestion and feeding only have an effect while `Alive`. Decay keeps
//! being accepted while `Dead` but never re-reports the death.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::catalog::FoodItem;
use super::state::{PetState, DEATH_EPSILON, FULL_HUNGER};
use crate::pet::PetIdentity;

/// How hunger points follow the step count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointsModel {
    /// Points are re-derived from today's cumulative steps on every reading.
    /// Spent points come back with the next reading.
    #[default]
    Recompute,
    /// Each reading credits only the points earned by the new steps.
    Incremental,
}

/// Tunables for the economy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Hunger level lost per decay tick, in percentage points.
    #[serde(default = "default_decay_per_tick")]
    pub decay_per_tick: f64,
    /// Period of the decay timer.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Hunger points earned per step.
    #[serde(default = "default_points_per_step")]
    pub points_per_step: f64,
    #[serde(default)]
    pub points_model: PointsModel,
    /// Whether a reset after death also zeroes today's step count.
    #[serde(default)]
    pub reset_clears_steps: bool,
    /// Apply the decay ticks missed while no host was running. Off by default:
    /// decay only runs while a host is up.
    #[serde(default)]
    pub catch_up_offline: bool,
}

fn default_decay_per_tick() -> f64 {
    0.1
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_points_per_step() -> f64 {
    0.1
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            decay_per_tick: default_decay_per_tick(),
            tick_interval_ms: default_tick_interval_ms(),
            points_per_step: default_points_per_step(),
            points_model: PointsModel::default(),
            reset_clears_steps: false,
            catch_up_offline: false,
        }
    }
}

impl EconomyConfig {
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Points earned by `steps` cumulative steps.
    pub fn points_for(&self, steps: u64) -> u64 {
        let points = (steps as f64 * self.points_per_step).floor();
        if points.is_finite() && points > 0.0 {
            points as u64
        } else {
            0
        }
    }
}

/// Result of one decay tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayOutcome {
    pub hunger_level: f64,
    /// True only on the tick that killed the pet.
    pub just_died: bool,
}

/// Result of applying missed ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatchUp {
    pub ticks: u64,
    pub hunger_level: f64,
    pub just_died: bool,
}

/// Why a feed attempt had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FeedRejection {
    PetDead,
    InvalidItem,
    InsufficientPoints { needed: u64, available: u64 },
    AlreadyFull,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedOutcome {
    pub success: bool,
    pub hunger_points: u64,
    pub hunger_level: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<FeedRejection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetOutcome {
    /// False when the pet was alive and nothing changed.
    pub applied: bool,
    pub state: PetState,
}

/// The pet economy.
#[derive(Debug, Clone)]
pub struct PetEconomy {
    state: PetState,
    config: EconomyConfig,
}

impl PetEconomy {
    /// A fresh pet: full hunger, no points, no identity.
    pub fn new(config: EconomyConfig) -> Self {
        Self::from_state(PetState::default(), config)
    }

    /// Resume from a persisted state. Out-of-range levels are clamped.
    pub fn from_state(state: PetState, config: EconomyConfig) -> Self {
        Self {
            state: state.normalized(),
            config,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &PetState {
        &self.state
    }

    pub fn snapshot(&self) -> PetState {
        self.state.clone()
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn is_dead(&self) -> bool {
        self.state.is_dead
    }

    // ── Step ingestion ───────────────────────────────────────────────

    /// Record an absolute cumulative step count for today.
    ///
    /// Negative input counts as 0. Returns false (and changes nothing) while
    /// the pet is dead.
    pub fn ingest_steps(&mut self, cumulative: i64) -> bool {
        if self.state.is_dead {
            debug!(cumulative, "ignoring steps while dead");
            return false;
        }
        let next = cumulative.max(0) as u64;
        self.apply_steps(next);
        true
    }

    /// Add an incremental step delta to today's running total.
    pub fn ingest_step_delta(&mut self, delta: i64) -> bool {
        if self.state.is_dead {
            debug!(delta, "ignoring step delta while dead");
            return false;
        }
        let next = self
            .state
            .today_steps
            .saturating_add(delta.max(0) as u64);
        self.apply_steps(next);
        true
    }

    fn apply_steps(&mut self, next: u64) {
        let prev = self.state.today_steps;
        self.state.hunger_points = match self.config.points_model {
            PointsModel::Recompute => self.config.points_for(next),
            PointsModel::Incremental if next >= prev => {
                let earned = self
                    .config
                    .points_for(next)
                    .saturating_sub(self.config.points_for(prev));
                self.state.hunger_points.saturating_add(earned)
            }
            // Lower reading: the step source started a new day.
            PointsModel::Incremental => self.state.hunger_points,
        };
        self.state.today_steps = next;
        debug!(
            today_steps = next,
            hunger_points = self.state.hunger_points,
            "steps ingested"
        );
    }

    // ── Decay ────────────────────────────────────────────────────────

    /// Apply one decay tick of the configured size.
    pub fn tick(&mut self) -> DecayOutcome {
        self.tick_decay(self.config.decay_per_tick)
    }

    /// Apply one decay tick and stamp it with `now`.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> DecayOutcome {
        self.state.last_tick_at = Some(now);
        self.tick()
    }

    /// Lower the hunger level by `amount`, entering `Dead` when it reaches 0.
    ///
    /// Negative or non-finite amounts decay nothing.
    pub fn tick_decay(&mut self, amount: f64) -> DecayOutcome {
        if self.state.is_dead {
            return DecayOutcome {
                hunger_level: self.state.hunger_level,
                just_died: false,
            };
        }
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        let mut level = (self.state.hunger_level - amount).clamp(0.0, FULL_HUNGER);
        let mut just_died = false;
        if level <= DEATH_EPSILON {
            level = 0.0;
            self.state.is_dead = true;
            just_died = true;
            info!(today_steps = self.state.today_steps, "pet died of hunger");
        }
        self.state.hunger_level = level;
        DecayOutcome {
            hunger_level: level,
            just_died,
        }
    }

    /// Apply every whole tick that elapsed between the last recorded tick and
    /// `now`. The fractional remainder carries over to the next call.
    ///
    /// The first call on a state with no recorded tick only starts the clock.
    pub fn catch_up(&mut self, now: DateTime<Utc>, interval: std::time::Duration) -> CatchUp {
        let none = |s: &PetState| CatchUp {
            ticks: 0,
            hunger_level: s.hunger_level,
            just_died: false,
        };
        let Some(last) = self.state.last_tick_at else {
            self.state.last_tick_at = Some(now);
            return none(&self.state);
        };
        let interval_ms = (interval.as_millis() as i64).max(1);
        let elapsed_ms = (now - last).num_milliseconds();
        if elapsed_ms < interval_ms {
            return none(&self.state);
        }
        let ticks = (elapsed_ms / interval_ms) as u64;
        self.state.last_tick_at = Some(last + Duration::milliseconds(ticks as i64 * interval_ms));

        let total = ticks as f64 * self.config.decay_per_tick.max(0.0);
        let outcome = if total >= self.state.hunger_level {
            self.tick_decay(self.state.hunger_level)
        } else {
            self.tick_decay(total)
        };
        debug!(ticks, hunger_level = outcome.hunger_level, "caught up on missed decay");
        CatchUp {
            ticks,
            hunger_level: outcome.hunger_level,
            just_died: outcome.just_died,
        }
    }

    // ── Feeding ──────────────────────────────────────────────────────

    /// Spend `item.price` points to restore `item.gain` hunger.
    ///
    /// Rejected with no state change when the pet is dead, the item is
    /// malformed, the user cannot afford it, or the pet is already full.
    pub fn feed(&mut self, item: &FoodItem) -> FeedOutcome {
        if let Some(rejection) = self.feed_rejection(item) {
            debug!(item = %item.name, ?rejection, "feed rejected");
            return FeedOutcome {
                success: false,
                hunger_points: self.state.hunger_points,
                hunger_level: self.state.hunger_level,
                rejection: Some(rejection),
            };
        }
        self.state.hunger_points -= item.price;
        self.state.hunger_level = (self.state.hunger_level + item.gain as f64).min(FULL_HUNGER);
        debug!(
            item = %item.name,
            hunger_points = self.state.hunger_points,
            hunger_level = self.state.hunger_level,
            "pet fed"
        );
        FeedOutcome {
            success: true,
            hunger_points: self.state.hunger_points,
            hunger_level: self.state.hunger_level,
            rejection: None,
        }
    }

    fn feed_rejection(&self, item: &FoodItem) -> Option<FeedRejection> {
        if self.state.is_dead {
            Some(FeedRejection::PetDead)
        } else if !item.is_valid() {
            Some(FeedRejection::InvalidItem)
        } else if self.state.hunger_points < item.price {
            Some(FeedRejection::InsufficientPoints {
                needed: item.price,
                available: self.state.hunger_points,
            })
        } else if self.state.is_full() {
            Some(FeedRejection::AlreadyFull)
        } else {
            None
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Bring a dead pet back to initial values and clear its identity.
    ///
    /// A no-op while the pet is alive.
    pub fn reset(&mut self) -> ResetOutcome {
        if !self.state.is_dead {
            return ResetOutcome {
                applied: false,
                state: self.snapshot(),
            };
        }
        let today_steps = if self.config.reset_clears_steps {
            0
        } else {
            self.state.today_steps
        };
        self.state = PetState {
            today_steps,
            ..PetState::default()
        };
        info!("pet reset after death");
        ResetOutcome {
            applied: true,
            state: self.snapshot(),
        }
    }

    /// Assign the pet chosen during onboarding.
    ///
    /// Only allowed once per life: returns false if a pet is already set or
    /// the current one is dead.
    pub fn adopt(&mut self, identity: PetIdentity) -> bool {
        if self.state.is_dead || self.state.pet.is_some() {
            return false;
        }
        info!(kind = %identity.kind, name = %identity.name, "pet adopted");
        self.state.pet = Some(identity);
        true
    }
}

impl Default for PetEconomy {
    fn default() -> Self {
        Self::new(EconomyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::{PetGender, PetKind};

    fn economy_with(points: u64, level: f64) -> PetEconomy {
        PetEconomy::from_state(
            PetState {
                hunger_points: points,
                hunger_level: level,
                ..Default::default()
            },
            EconomyConfig::default(),
        )
    }

    fn mochi() -> PetIdentity {
        PetIdentity::new(PetKind::Cat, "Mochi", PetGender::Female).unwrap()
    }

    #[test]
    fn ingest_recomputes_points() {
        let mut eco = PetEconomy::default();
        assert!(eco.ingest_steps(1234));
        assert_eq!(eco.state().today_steps, 1234);
        assert_eq!(eco.state().hunger_points, 123);

        eco.ingest_step_delta(7);
        assert_eq!(eco.state().today_steps, 1241);
        assert_eq!(eco.state().hunger_points, 124);
    }

    #[test]
    fn negative_steps_count_as_zero() {
        let mut eco = PetEconomy::default();
        eco.ingest_steps(-50);
        assert_eq!(eco.state().today_steps, 0);
        eco.ingest_steps(100);
        eco.ingest_step_delta(-30);
        assert_eq!(eco.state().today_steps, 100);
        assert_eq!(eco.state().hunger_points, 10);
    }

    #[test]
    fn recompute_model_restores_spent_points() {
        let mut eco = PetEconomy::default();
        eco.ingest_steps(200);
        assert!(!eco.feed(&FoodItem::new("Apple", 5, 5)).success);
        eco.tick_decay(10.0);
        assert!(eco.feed(&FoodItem::new("Apple", 5, 5)).success);
        assert_eq!(eco.state().hunger_points, 15);
        eco.ingest_step_delta(0);
        assert_eq!(eco.state().hunger_points, 20);
    }

    #[test]
    fn incremental_model_keeps_spending() {
        let config = EconomyConfig {
            points_model: PointsModel::Incremental,
            ..Default::default()
        };
        let mut eco = PetEconomy::new(config);
        eco.ingest_steps(200);
        eco.tick_decay(10.0);
        assert!(eco.feed(&FoodItem::new("Apple", 5, 5)).success);
        assert_eq!(eco.state().hunger_points, 15);
        eco.ingest_steps(215);
        assert_eq!(eco.state().hunger_points, 16);
        // New day baseline credits nothing.
        eco.ingest_steps(40);
        assert_eq!(eco.state().hunger_points, 16);
        assert_eq!(eco.state().today_steps, 40);
    }

    #[test]
    fn decay_kills_exactly_once() {
        let mut eco = PetEconomy::default();
        let mut deaths = 0;
        for i in 1..=60 {
            let out = eco.tick_decay(2.0);
            if out.just_died {
                deaths += 1;
                assert_eq!(i, 50);
            }
        }
        assert_eq!(deaths, 1);
        assert_eq!(eco.state().hunger_level, 0.0);
        assert!(eco.is_dead());
    }

    #[test]
    fn fractional_decay_reaches_zero_despite_drift() {
        let mut eco = PetEconomy::default();
        let mut died_at = None;
        for i in 1..=1100 {
            if eco.tick_decay(0.1).just_died {
                died_at = Some(i);
            }
        }
        let died_at = died_at.expect("pet should die");
        assert!((1000..=1001).contains(&died_at));
        assert_eq!(eco.state().hunger_level, 0.0);
    }

    #[test]
    fn negative_decay_is_ignored() {
        let mut eco = economy_with(0, 50.0);
        eco.tick_decay(-5.0);
        eco.tick_decay(f64::NAN);
        assert_eq!(eco.state().hunger_level, 50.0);
    }

    #[test]
    fn dead_pet_ignores_steps_and_food() {
        let mut eco = economy_with(500, 1.0);
        assert!(eco.tick_decay(1.0).just_died);
        assert!(!eco.ingest_steps(10_000));
        assert_eq!(eco.state().hunger_points, 500);
        let out = eco.feed(&FoodItem::new("Steak", 100, 100));
        assert!(!out.success);
        assert_eq!(out.rejection, Some(FeedRejection::PetDead));
    }

    #[test]
    fn feed_applies_price_and_gain() {
        let mut eco = economy_with(15, 50.0);
        let out = eco.feed(&FoodItem::new("Snack", 10, 10));
        assert!(out.success);
        assert_eq!(out.hunger_points, 5);
        assert_eq!(out.hunger_level, 60.0);
    }

    #[test]
    fn feed_caps_level_at_full() {
        let mut eco = economy_with(100, 95.0);
        let out = eco.feed(&FoodItem::new("Steak", 100, 100));
        assert!(out.success);
        assert_eq!(out.hunger_level, 100.0);
        assert_eq!(out.hunger_points, 0);
    }

    #[test]
    fn feed_rejects_unaffordable_and_full() {
        let mut eco = economy_with(5, 50.0);
        let out = eco.feed(&FoodItem::new("Snack", 10, 10));
        assert_eq!(
            out.rejection,
            Some(FeedRejection::InsufficientPoints {
                needed: 10,
                available: 5
            })
        );
        assert_eq!(eco.state().hunger_level, 50.0);

        let mut eco = economy_with(1000, 100.0);
        let out = eco.feed(&FoodItem::new("Snack", 10, 10));
        assert_eq!(out.rejection, Some(FeedRejection::AlreadyFull));
        assert_eq!(eco.state().hunger_points, 1000);
    }

    #[test]
    fn feed_rejects_free_items() {
        let mut eco = economy_with(10, 50.0);
        let out = eco.feed(&FoodItem::new("Air", 0, 10));
        assert_eq!(out.rejection, Some(FeedRejection::InvalidItem));
    }

    #[test]
    fn reset_only_from_dead() {
        let mut eco = economy_with(40, 20.0);
        eco.adopt(mochi());
        let out = eco.reset();
        assert!(!out.applied);
        assert_eq!(out.state.hunger_points, 40);
        assert!(out.state.pet.is_some());

        eco.ingest_steps(900);
        eco.tick_decay(50.0);
        let out = eco.reset();
        assert!(out.applied);
        assert_eq!(out.state.hunger_level, 100.0);
        assert_eq!(out.state.hunger_points, 0);
        assert!(!out.state.is_dead);
        assert!(out.state.pet.is_none());
        assert_eq!(out.state.today_steps, 900);
    }

    #[test]
    fn reset_can_clear_steps() {
        let config = EconomyConfig {
            reset_clears_steps: true,
            ..Default::default()
        };
        let mut eco = PetEconomy::new(config);
        eco.ingest_steps(900);
        eco.tick_decay(100.0);
        assert_eq!(eco.reset().state.today_steps, 0);
    }

    #[test]
    fn adopt_once_per_life() {
        let mut eco = PetEconomy::default();
        assert!(eco.adopt(mochi()));
        assert!(!eco.adopt(mochi()));
        eco.tick_decay(100.0);
        eco.reset();
        assert!(eco.adopt(mochi()));
    }

    #[test]
    fn catch_up_applies_whole_ticks() {
        let mut eco = PetEconomy::default();
        let start = Utc::now();
        let interval = std::time::Duration::from_secs(1);

        let first = eco.catch_up(start, interval);
        assert_eq!(first.ticks, 0);

        let out = eco.catch_up(start + Duration::milliseconds(10_500), interval);
        assert_eq!(out.ticks, 10);
        assert!((eco.state().hunger_level - 99.0).abs() < 1e-9);
        assert_eq!(
            eco.state().last_tick_at,
            Some(start + Duration::seconds(10))
        );
    }

    #[test]
    fn catch_up_past_zero_dies_once() {
        let mut eco = economy_with(0, 1.0);
        let start = Utc::now();
        let interval = std::time::Duration::from_secs(1);
        eco.catch_up(start, interval);
        let out = eco.catch_up(start + Duration::hours(1), interval);
        assert!(out.just_died);
        let again = eco.catch_up(start + Duration::hours(2), interval);
        assert!(!again.just_died);
        assert_eq!(eco.state().hunger_level, 0.0);
    }
}
