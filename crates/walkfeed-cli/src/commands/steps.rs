use chrono::Local;
use clap::Subcommand;
use serde::Serialize;
use walkfeed_core::steps::parse_step_count;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum StepsAction {
    /// Record today's cumulative step count
    Set {
        /// Cumulative steps since midnight (negative or non-numeric counts as 0)
        #[arg(allow_hyphen_values = true)]
        steps: String,
    },
    /// Add steps to today's running total
    Add {
        /// Step delta (negative or non-numeric counts as 0)
        #[arg(allow_hyphen_values = true)]
        steps: String,
    },
}

#[derive(Serialize)]
struct StepsReport {
    applied: bool,
    today_steps: u64,
    hunger_points: u64,
}

pub fn run(action: StepsAction) -> CmdResult {
    let mut ctx = Context::open()?;
    let applied = match action {
        StepsAction::Set { steps } => ctx
            .economy
            .ingest_steps(parse_step_count(&steps).min(i64::MAX as u64) as i64),
        StepsAction::Add { steps } => ctx
            .economy
            .ingest_step_delta(parse_step_count(&steps).min(i64::MAX as u64) as i64),
    };
    let state = ctx.economy.state();
    if applied {
        ctx.db
            .record_daily_steps(Local::now().date_naive(), state.today_steps)?;
    }
    ctx.save()?;
    print_json(&StepsReport {
        applied,
        today_steps: state.today_steps,
        hunger_points: state.hunger_points,
    })
}
