use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::Database;
use crate::economy::PetState;
use crate::error::Result;

const PET_STATE_KEY: &str = "pet_state";

/// Where the economy's state is loaded from at startup and saved to after
/// every change.
pub trait StateStore {
    /// The last saved state, or `None` on first launch.
    fn load(&self) -> Result<Option<PetState>>;

    fn save(&self, state: &PetState) -> Result<()>;

    /// Remember today's cumulative steps for the history chart.
    fn record_daily_steps(&self, _date: NaiveDate, _steps: u64) -> Result<()> {
        Ok(())
    }
}

impl StateStore for Database {
    fn load(&self) -> Result<Option<PetState>> {
        match self.kv_get(PET_STATE_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &PetState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.kv_set(PET_STATE_KEY, &json)?;
        Ok(())
    }

    fn record_daily_steps(&self, date: NaiveDate, steps: u64) -> Result<()> {
        Database::record_daily_steps(self, date, steps)?;
        Ok(())
    }
}

/// In-process store, for tests and hosts without durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Option<PetState>>,
    days: Mutex<BTreeMap<NaiveDate, u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PetState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            days: Mutex::default(),
        }
    }

    pub fn saved(&self) -> Option<PetState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn steps_on(&self, date: NaiveDate) -> u64 {
        self.days
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&date)
            .copied()
            .unwrap_or(0)
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<PetState>> {
        Ok(self.saved())
    }

    fn save(&self, state: &PetState) -> Result<()> {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(state.clone());
        Ok(())
    }

    fn record_daily_steps(&self, date: NaiveDate, steps: u64) -> Result<()> {
        let mut days = self
            .days
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = days.entry(date).or_insert(0);
        *entry = (*entry).max(steps);
        Ok(())
    }
}

impl<S: StateStore + ?Sized> StateStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<PetState>> {
        (**self).load()
    }

    fn save(&self, state: &PetState) -> Result<()> {
        (**self).save(state)
    }

    fn record_daily_steps(&self, date: NaiveDate, steps: u64) -> Result<()> {
        (**self).record_daily_steps(date, steps)
    }
}
