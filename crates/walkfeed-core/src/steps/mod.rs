//! Step-count helpers around the economy: input sanitizing, daily goals and
//! weekly history.

mod goal;
mod history;

pub use goal::{goal_progress_pct, step_goal_from_body, DEFAULT_DAILY_GOAL};
pub use history::{week_start, WeekSteps, WEEKDAY_LABELS};

/// Parse a step reading from text. Anything that is not a non-negative
/// integer counts as 0.
pub fn parse_step_count(raw: &str) -> u64 {
    raw.trim().parse::<u64>().unwrap_or(0)
}
