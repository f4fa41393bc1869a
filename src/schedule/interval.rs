use super::ScheduleError;
use crate::activity::Activity;
use crate::calendar::{add_days, day_diff};
use crate::streak::Streak;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;

/// The habit must be exercised at least once every `days` days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Interval {
    days: u32,
}

impl Interval {
    pub const MIN_DAYS: u32 = 1;
    pub const MAX_DAYS: u32 = 7;

    pub fn new(days: u32) -> Result<Self, ScheduleError> {
        if !(Self::MIN_DAYS..=Self::MAX_DAYS).contains(&days) {
            return Err(ScheduleError::IntervalOutOfRange(days));
        }
        Ok(Self { days })
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    fn period(&self) -> i64 {
        i64::from(self.days)
    }

    /// Cadence is anchored on the first activity of each streak rather than
    /// on the calendar. `activities` must already be validated as strictly
    /// ascending.
    pub(crate) fn segment(&self, activities: &[Activity], today: NaiveDate) -> Vec<Streak> {
        let Some((first, rest)) = activities.split_first() else {
            return vec![Streak::new()];
        };

        let period = self.period();
        let mut streaks = Vec::new();
        let mut streak_start = first.date;
        let mut current = Streak::new();
        current.push(first.clone());

        for activity in rest {
            let elapsed = day_diff(streak_start, activity.date);
            // Exact multiples stay on cadence; off-cadence entries inside the
            // window are extras. Anything else overshot a whole cycle.
            if elapsed % period != 0 && elapsed > period {
                streaks.push(mem::take(&mut current));
                streak_start = activity.date;
            }
            current.push(activity.clone());
        }

        let last_logged = current.end_date();
        streaks.push(current);
        if last_logged.is_some_and(|last| day_diff(last, today) > period) {
            streaks.push(Streak::new());
        }
        streaks
    }

    pub fn next_required_day(&self, streak: &Streak, today: NaiveDate) -> NaiveDate {
        match (streak.start_date(), streak.end_date()) {
            (Some(start), Some(last)) => {
                let period = self.period();
                let elapsed = day_diff(start, last);
                add_days(last, period - elapsed.rem_euclid(period))
            }
            _ => today,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Once every {} days", self.days)
    }
}

impl TryFrom<u32> for Interval {
    type Error = ScheduleError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Interval> for u32 {
    fn from(value: Interval) -> Self {
        value.days
    }
}
