//! The hunger economy: steps become points, points become food, and hunger
//! decays toward zero in between.

mod catalog;
mod engine;
mod state;

pub use catalog::{FoodCatalog, FoodItem};
pub use engine::{
    CatchUp, DecayOutcome, EconomyConfig, FeedOutcome, FeedRejection, PetEconomy, PointsModel,
    ResetOutcome,
};
pub use state::{HungerBand, LifeState, PetState, DEATH_EPSILON, FULL_HUNGER};
