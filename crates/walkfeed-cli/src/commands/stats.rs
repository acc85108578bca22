use chrono::{Local, NaiveDate};
use clap::Subcommand;
use serde::Serialize;
use walkfeed_core::steps::{goal_progress_pct, step_goal_from_body};
use walkfeed_core::Config;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Daily totals for one Monday-Sunday week
    Week {
        /// Any date inside the week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Total steps ever recorded
    Lifetime,
    /// Daily goal and progress; pass height and weight for a personal goal
    Goal {
        /// Height in inches
        #[arg(long, requires = "weight")]
        height: Option<f64>,
        /// Weight in pounds
        #[arg(long, requires = "height")]
        weight: Option<f64>,
        /// Store the computed goal in the configuration
        #[arg(long)]
        save: bool,
    },
}

#[derive(Serialize)]
struct WeekReport {
    week_start: NaiveDate,
    days: Vec<DayEntry>,
    total: u64,
}

#[derive(Serialize)]
struct DayEntry {
    day: &'static str,
    steps: u64,
}

#[derive(Serialize)]
struct GoalReport {
    goal: u64,
    personal: bool,
    today_steps: u64,
    progress_pct: u8,
}

pub fn run(action: StatsAction) -> CmdResult {
    let ctx = Context::open()?;

    match action {
        StatsAction::Week { date } => {
            let anchor = date.unwrap_or_else(|| Local::now().date_naive());
            let week = ctx.db.week_steps(anchor)?;
            print_json(&WeekReport {
                week_start: week.week_start,
                days: week
                    .labeled()
                    .map(|(day, steps)| DayEntry { day, steps })
                    .collect(),
                total: week.total(),
            })
        }
        StatsAction::Lifetime => {
            let total = ctx.db.lifetime_steps()?;
            print_json(&serde_json::json!({ "lifetime_steps": total }))
        }
        StatsAction::Goal {
            height,
            weight,
            save,
        } => {
            let personal = match (height, weight) {
                (Some(h), Some(w)) => Some(
                    step_goal_from_body(h, w)
                        .ok_or("height and weight must be positive numbers")?,
                ),
                _ => None,
            };
            let goal = personal.unwrap_or(ctx.config.steps.daily_goal);
            if save && personal.is_some() {
                let mut config: Config = ctx.config.clone();
                config.steps.daily_goal = goal;
                config.save()?;
            }
            let today_steps = ctx.economy.state().today_steps;
            print_json(&GoalReport {
                goal,
                personal: personal.is_some(),
                today_steps,
                progress_pct: goal_progress_pct(today_steps, goal),
            })
        }
    }
}
