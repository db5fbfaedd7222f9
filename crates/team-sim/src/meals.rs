//! Default cooking times within the awake period.

use chrono::NaiveTime;
use team_core::TimePeriod;

use crate::time::{add_minutes, minutes_of_day, time_within_period};

/// Minimum spacing between two default meals.
pub const MEAL_GAP_MINUTES: u32 = 360;

const LUNCH_NOT_BEFORE: (u32, u32) = (12, 0);
const DINNER_NOT_BEFORE: (u32, u32) = (18, 0);

fn minutes_until_same_day(start: NaiveTime, (h, m): (u32, u32)) -> u32 {
    (h * 60 + m).saturating_sub(minutes_of_day(start))
}

/// Meal times in minutes since wakeup.
///
/// Breakfast at wakeup, lunch at the later of wakeup + 6h and noon, dinner at
/// the later of lunch + 6h and 18:00. Meals at or after bedtime are dropped.
pub fn default_meal_times(day: &TimePeriod) -> Vec<u32> {
    let breakfast = 0;
    let lunch =
        (breakfast + MEAL_GAP_MINUTES).max(minutes_until_same_day(day.start, LUNCH_NOT_BEFORE));
    let dinner =
        (lunch + MEAL_GAP_MINUTES).max(minutes_until_same_day(day.start, DINNER_NOT_BEFORE));
    [breakfast, lunch, dinner]
        .into_iter()
        .filter(|&m| time_within_period(add_minutes(day.start, m), day))
        .collect()
}
