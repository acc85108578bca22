use serde::Serialize;
use walkfeed_core::economy::CatchUp;
use walkfeed_core::steps::goal_progress_pct;
use walkfeed_core::{HungerBand, LifeState, PetState};

use super::{print_json, CmdResult, Context};

#[derive(Serialize)]
struct StatusReport {
    state: PetState,
    life: LifeState,
    band: HungerBand,
    mood: &'static str,
    display_level: u8,
    daily_goal: u64,
    goal_progress_pct: u8,
    /// Points still missing for the cheapest item in the catalog.
    points_to_next_meal: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    caught_up: Option<CatchUp>,
}

pub fn status() -> CmdResult {
    let ctx = Context::open()?;
    let state = ctx.economy.snapshot();
    let goal = ctx.config.steps.daily_goal;
    let cheapest = ctx.config.catalog.cheapest().map_or(0, |item| item.price);
    let report = StatusReport {
        life: state.life(),
        band: state.band(),
        mood: state.band().label(),
        display_level: state.display_level(),
        daily_goal: goal,
        goal_progress_pct: goal_progress_pct(state.today_steps, goal),
        points_to_next_meal: cheapest.saturating_sub(state.hunger_points),
        caught_up: ctx.caught_up.filter(|c| c.ticks > 0),
        state,
    };
    ctx.save()?;
    print_json(&report)
}

#[derive(Serialize)]
struct TickReport {
    ticks: u64,
    hunger_level: f64,
    died: bool,
    is_dead: bool,
}

pub fn tick(count: u64, amount: Option<f64>) -> CmdResult {
    let mut ctx = Context::open()?;
    let amount = amount.unwrap_or(ctx.config.economy.decay_per_tick);
    let mut died = false;
    let mut ticks = 0;
    // Non-positive amounts decay nothing, so there is nothing to repeat.
    while ticks < count && amount > 0.0 && !ctx.economy.is_dead() {
        died |= ctx.economy.tick_decay(amount).just_died;
        ticks += 1;
    }
    ctx.save()?;
    let state = ctx.economy.state();
    print_json(&TickReport {
        ticks,
        hunger_level: state.hunger_level,
        died,
        is_dead: state.is_dead,
    })
}
