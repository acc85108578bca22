use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::economy::{FeedRejection, HungerBand, PetState};
use crate::pet::PetIdentity;

/// Every effective state change in the economy produces an Event.
/// Hosts subscribe to them to drive sounds, animations and screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    StepsIngested {
        today_steps: u64,
        hunger_points: u64,
        at: DateTime<Utc>,
    },
    HungerDecayed {
        hunger_level: f64,
        at: DateTime<Utc>,
    },
    /// Fired once, on the tick that brought the level to zero.
    PetDied {
        today_steps: u64,
        at: DateTime<Utc>,
    },
    /// Successful feed; hosts play the feeding acknowledgement.
    Fed {
        item: String,
        hunger_points: u64,
        hunger_level: f64,
        at: DateTime<Utc>,
    },
    FeedRejected {
        item: String,
        rejection: FeedRejection,
        at: DateTime<Utc>,
    },
    PetAdopted {
        pet: PetIdentity,
        at: DateTime<Utc>,
    },
    /// The pet was brought back after death; onboarding starts over.
    PetReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: PetState,
        band: HungerBand,
        display_level: u8,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn snapshot(state: &PetState) -> Self {
        Event::StateSnapshot {
            state: state.clone(),
            band: state.band(),
            display_level: state.display_level(),
            at: Utc::now(),
        }
    }

    /// Decay ticks are frequent; hosts usually filter them from logs.
    pub fn is_decay(&self) -> bool {
        matches!(self, Event::HungerDecayed { .. })
    }
}
