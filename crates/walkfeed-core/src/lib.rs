//! # Walkfeed Core Library
//!
//! Core logic for Walkfeed, a step-powered virtual pet. Steps earn hunger
//! points, hunger points buy food, and the pet's hunger level decays over
//! time until it is fed or dies.
//!
//! ## Architecture
//!
//! - **Economy**: A pure state machine; the host drives decay by calling
//!   `tick()` on its own schedule
//! - **Session**: A tokio task that owns one economy, runs the decay timer and
//!   serializes all transitions
//! - **Storage**: SQLite-backed state and step history, TOML configuration
//! - **Steps**: Daily goal and weekly history helpers
//!
//! ## Key Components
//!
//! - [`PetEconomy`]: Hunger/points state machine
//! - [`PetSession`]: Async host for the economy
//! - [`Database`]: State and step-history persistence
//! - [`Config`]: Application configuration management

pub mod economy;
pub mod error;
pub mod events;
pub mod pet;
pub mod session;
pub mod steps;
pub mod storage;

pub use economy::{
    DecayOutcome, EconomyConfig, FeedOutcome, FeedRejection, FoodCatalog, FoodItem, HungerBand,
    LifeState, PetEconomy, PetState, PointsModel, ResetOutcome,
};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use pet::{PetGender, PetIdentity, PetKind};
pub use session::{PetSession, SessionHandle};
pub use storage::{Config, Database, MemoryStore, StateStore};
