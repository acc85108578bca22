use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Daily step totals for one Monday-to-Sunday week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSteps {
    pub week_start: NaiveDate,
    pub days: [u64; 7],
}

impl WeekSteps {
    pub fn empty(anchor: NaiveDate) -> Self {
        Self {
            week_start: week_start(anchor),
            days: [0; 7],
        }
    }

    /// Store `steps` for `date` if it falls inside this week.
    pub fn set(&mut self, date: NaiveDate, steps: u64) -> bool {
        let offset = (date - self.week_start).num_days();
        if !(0..7).contains(&offset) {
            return false;
        }
        self.days[offset as usize] = steps;
        true
    }

    pub fn total(&self) -> u64 {
        self.days.iter().sum()
    }

    pub fn labeled(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        WEEKDAY_LABELS.into_iter().zip(self.days.iter().copied())
    }
}
