//! Minute-resolution time of day helpers and the fixed 5 minute tick grid.

use chrono::{NaiveTime, Timelike};
use team_core::{TeamSettings, TimePeriod};

/// Minutes in one simulated day.
pub const FULL_DAY_MINUTES: u32 = 1440;
/// Length of one tick.
pub const TICK_MINUTES: u32 = 5;
/// Ticks in one simulated day.
pub const TICKS_PER_DAY: u32 = FULL_DAY_MINUTES / TICK_MINUTES;

/// Minutes since midnight, ignoring seconds.
pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Minutes from `start` forward to `time`, wrapping past midnight.
pub fn minutes_since_start(time: NaiveTime, start: NaiveTime) -> u32 {
    (minutes_of_day(time) + FULL_DAY_MINUTES - minutes_of_day(start)) % FULL_DAY_MINUTES
}

/// Whether `time` lies in `[period.start, period.end)`, wrapping past midnight.
pub fn time_within_period(time: NaiveTime, period: &TimePeriod) -> bool {
    let (t, start, end) = (
        minutes_of_day(time),
        minutes_of_day(period.start),
        minutes_of_day(period.end),
    );
    if start <= end {
        start <= t && t < end
    } else {
        t >= start || t < end
    }
}

/// `time` moved forward by `minutes`, wrapping past midnight.
pub fn add_minutes(time: NaiveTime, minutes: u32) -> NaiveTime {
    let total = (minutes_of_day(time) + minutes) % FULL_DAY_MINUTES;
    NaiveTime::from_hms_opt(total / 60, total % 60, 0).unwrap_or(time)
}

/// Tick layout of one day, in minutes since wakeup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayClock {
    /// Minutes since wakeup at which the night phase begins.
    pub night_start: u32,
}

impl DayClock {
    pub fn new(settings: &TeamSettings) -> Self {
        Self {
            night_start: minutes_since_start(settings.bedtime, settings.wakeup),
        }
    }

    /// Tick start times of the day phase: every tick starting before bedtime.
    pub fn day_ticks(&self) -> impl Iterator<Item = u32> {
        (0..self.first_night_tick()).step_by(TICK_MINUTES as usize)
    }

    /// Tick start times of the night phase, through the end of the day.
    pub fn night_ticks(&self) -> impl Iterator<Item = u32> {
        (self.first_night_tick()..FULL_DAY_MINUTES).step_by(TICK_MINUTES as usize)
    }

    fn first_night_tick(&self) -> u32 {
        self.night_start.div_ceil(TICK_MINUTES) * TICK_MINUTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn minutes_wrap_midnight() {
        assert_eq!(minutes_since_start(time(21, 30), time(6, 0)), 930);
        assert_eq!(minutes_since_start(time(6, 0), time(21, 30)), 510);
        assert_eq!(minutes_since_start(time(6, 0), time(6, 0)), 0);
    }

    #[test]
    fn period_membership() {
        let day = TimePeriod {
            start: time(6, 0),
            end: time(21, 30),
        };
        let night = TimePeriod {
            start: time(21, 30),
            end: time(6, 0),
        };
        assert!(time_within_period(time(6, 0), &day));
        assert!(!time_within_period(time(21, 30), &day));
        assert!(time_within_period(time(23, 0), &night));
        assert!(time_within_period(time(2, 0), &night));
        assert!(!time_within_period(time(12, 0), &night));
    }

    #[test]
    fn add_minutes_wraps() {
        assert_eq!(add_minutes(time(23, 55), 10), time(0, 5));
        assert_eq!(add_minutes(time(6, 0), 5), time(6, 5));
    }

    #[test]
    fn clock_splits_at_bedtime() {
        let clock = DayClock::new(&TeamSettings {
            wakeup: time(6, 0),
            bedtime: time(21, 30),
            camp: false,
        });
        assert_eq!(clock.night_start, 930);
        assert_eq!(clock.day_ticks().count(), 186);
        assert_eq!(clock.night_ticks().next(), Some(930));
        assert_eq!(clock.night_ticks().last(), Some(1435));
    }

    proptest! {
        #[test]
        fn ticks_cover_the_whole_day(wh in 0u32..24, wm in 0u32..60, bh in 0u32..24, bm in 0u32..60) {
            let settings = TeamSettings { wakeup: time(wh, wm), bedtime: time(bh, bm), camp: false };
            let clock = DayClock::new(&settings);
            let day: Vec<u32> = clock.day_ticks().collect();
            let night: Vec<u32> = clock.night_ticks().collect();
            prop_assert_eq!((day.len() + night.len()) as u32, TICKS_PER_DAY);
            prop_assert!(day.iter().all(|&m| m < clock.night_start));
            prop_assert!(night.iter().all(|&m| m >= clock.night_start));
        }
    }
}
