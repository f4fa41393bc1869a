use super::ScheduleError;
use crate::activity::Activity;
use crate::calendar::{ALL_WEEKDAYS, WEEKDAY_NAMES, add_days, weekday_index};
use crate::streak::Streak;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;
use std::str::FromStr;

/// Which specific days of the week the habit must be exercised, Monday first.
///
/// Serialised as seven `0`/`1` characters, e.g. `"1111100"` for weekdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DaysOfWeek {
    mask: [bool; 7],
}

impl DaysOfWeek {
    pub fn new(mask: [bool; 7]) -> Result<Self, ScheduleError> {
        if !mask.iter().any(|day| *day) {
            return Err(ScheduleError::EmptyWeekMask);
        }
        Ok(Self { mask })
    }

    pub fn from_weekdays<I>(days: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut mask = [false; 7];
        for day in days {
            mask[day.num_days_from_monday() as usize] = true;
        }
        Self::new(mask)
    }

    pub fn mask(&self) -> [bool; 7] {
        self.mask
    }

    pub fn weekdays(&self) -> Vec<Weekday> {
        ALL_WEEKDAYS
            .iter()
            .zip(self.mask)
            .filter_map(|(day, required)| required.then_some(*day))
            .collect()
    }

    pub fn is_due(&self, date: NaiveDate) -> bool {
        self.mask[weekday_index(date)]
    }

    /// Required days as two-letter names, e.g. `["Sa", "Su"]`.
    pub fn as_names(&self) -> Vec<&'static str> {
        WEEKDAY_NAMES
            .iter()
            .zip(self.mask)
            .filter_map(|(name, required)| required.then_some(*name))
            .collect()
    }

    /// `date` itself when it is due, else the soonest due day after it.
    pub fn next_due_on_or_after(&self, date: NaiveDate) -> NaiveDate {
        (0..7)
            .map(|offset| add_days(date, offset))
            .find(|candidate| self.is_due(*candidate))
            .unwrap_or(date)
    }

    pub fn due_dates_from(&self, start: NaiveDate) -> DueDates {
        DueDates {
            schedule: *self,
            next: Some(self.next_due_on_or_after(start)),
        }
    }

    pub fn next_required_day(&self, today: NaiveDate) -> NaiveDate {
        self.next_due_on_or_after(today)
    }

    /// Walks due dates and activities in lock-step. `activities` must already
    /// be validated as strictly ascending.
    pub(crate) fn segment(&self, activities: &[Activity], today: NaiveDate) -> Vec<Streak> {
        let Some(first) = activities.first() else {
            return vec![Streak::new()];
        };

        let mut due_dates = self.due_dates_from(first.date);
        let mut due = due_dates.next();
        let mut streaks = Vec::new();
        let mut current = Streak::new();

        for activity in activities {
            // every due date passed without an activity was missed
            while due.is_some_and(|date| date < activity.date) {
                if !current.is_empty() {
                    streaks.push(mem::take(&mut current));
                }
                due = due_dates.next();
            }

            current.push(activity.clone());
            if due == Some(activity.date) {
                due = due_dates.next();
            } else {
                // logged ahead of the next due date: breaks continuity
                streaks.push(mem::take(&mut current));
            }
        }

        if current.is_empty() {
            streaks.push(Streak::new());
        } else {
            streaks.push(current);
            if due.is_none_or(|date| today > date) {
                streaks.push(Streak::new());
            }
        }
        streaks
    }
}

impl fmt::Display for DaysOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_names().join("/"))
    }
}

impl FromStr for DaysOfWeek {
    type Err = ScheduleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.len() != 7 {
            return Err(ScheduleError::MalformedWeekMask(value.to_string()));
        }
        let mut mask = [false; 7];
        for (slot, ch) in mask.iter_mut().zip(value.chars()) {
            *slot = match ch {
                '1' => true,
                '0' => false,
                _ => return Err(ScheduleError::MalformedWeekMask(value.to_string())),
            };
        }
        Self::new(mask)
    }
}

impl TryFrom<String> for DaysOfWeek {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DaysOfWeek> for String {
    fn from(value: DaysOfWeek) -> Self {
        value
            .mask
            .iter()
            .map(|required| if *required { '1' } else { '0' })
            .collect()
    }
}

/// Lazily generated due dates of a [`DaysOfWeek`] schedule.
///
/// Each call to [`DaysOfWeek::due_dates_from`] returns an independent
/// generator; the sequence only ends at the edge of chrono's date range.
#[derive(Debug, Clone)]
pub struct DueDates {
    schedule: DaysOfWeek,
    next: Option<NaiveDate>,
}

impl Iterator for DueDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current
            .succ_opt()
            .map(|following| self.schedule.next_due_on_or_after(following))
            .filter(|following| *following > current);
        Some(current)
    }
}
