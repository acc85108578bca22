/// Goal used until the user computes a personal one.
pub const DEFAULT_DAILY_GOAL: u64 = 10_000;

const METERS_PER_INCH: f64 = 0.0254;
const KG_PER_POUND: f64 = 0.453_592;
const REFERENCE_BMI: f64 = 21.0;

/// Personal daily step goal derived from height (inches) and weight (pounds).
///
/// Scales the default goal by 10% per BMI point above or below 21. Returns
/// `None` for non-positive or non-finite input.
pub fn step_goal_from_body(height_in: f64, weight_lb: f64) -> Option<u64> {
    if !(height_in.is_finite() && weight_lb.is_finite()) || height_in <= 0.0 || weight_lb <= 0.0 {
        return None;
    }
    let height_m = height_in * METERS_PER_INCH;
    let weight_kg = weight_lb * KG_PER_POUND;
    let bmi = weight_kg / (height_m * height_m);
    let goal = (DEFAULT_DAILY_GOAL as f64 * (1.0 + (bmi - REFERENCE_BMI) / 10.0)).round();
    Some(goal.max(0.0) as u64)
}

/// Percentage of the goal reached, capped at 100.
pub fn goal_progress_pct(steps: u64, goal: u64) -> u8 {
    if goal == 0 {
        return 0;
    }
    ((steps as f64 / goal as f64) * 100.0).round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_from_average_body() {
        // 67 in / 150 lb is a BMI of about 23.5.
        let goal = step_goal_from_body(67.0, 150.0).unwrap();
        assert!((12_400..=12_600).contains(&goal), "goal was {goal}");
    }

    #[test]
    fn goal_rejects_missing_input() {
        assert_eq!(step_goal_from_body(0.0, 150.0), None);
        assert_eq!(step_goal_from_body(67.0, -1.0), None);
        assert_eq!(step_goal_from_body(f64::NAN, 150.0), None);
    }

    #[test]
    fn very_low_bmi_floors_at_zero() {
        assert_eq!(step_goal_from_body(100.0, 1.0), Some(0));
    }

    #[test]
    fn progress_is_capped() {
        assert_eq!(goal_progress_pct(2_500, 10_000), 25);
        assert_eq!(goal_progress_pct(25_000, 10_000), 100);
        assert_eq!(goal_progress_pct(100, 0), 0);
    }
}
