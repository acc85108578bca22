pub mod config;
pub mod feed;
pub mod pet;
pub mod run;
pub mod stats;
pub mod status;
pub mod steps;

use chrono::Utc;
use serde::Serialize;
use walkfeed_core::economy::CatchUp;
use walkfeed_core::{Config, Database, PetEconomy, StateStore};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a one-shot command needs: config, storage and the economy
/// restored from the last saved state.
pub struct Context {
    pub config: Config,
    pub db: Database,
    pub economy: PetEconomy,
    pub caught_up: Option<CatchUp>,
}

impl Context {
    /// Missed decay applied here is saved right away, so read-only commands
    /// do not lose it.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let db = Database::open()?;
        let state = StateStore::load(&db)?.unwrap_or_default();
        let mut economy = PetEconomy::from_state(state, config.economy.clone());

        let caught_up = if config.economy.catch_up_offline {
            let c = economy.catch_up(Utc::now(), config.economy.tick_interval());
            if c.just_died {
                tracing::info!(ticks = c.ticks, "pet died while nobody was watching");
            }
            Some(c)
        } else {
            None
        };

        let ctx = Self {
            config,
            db,
            economy,
            caught_up,
        };
        if ctx.caught_up.is_some_and(|c| c.ticks > 0) {
            ctx.save()?;
        }
        Ok(ctx)
    }

    pub fn save(&self) -> CmdResult {
        self.db.save(self.economy.state())?;
        Ok(())
    }
}

pub fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
