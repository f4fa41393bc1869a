//! Cadence rules and the streak segmentation engine.
//!
//! A [`Schedule`] is a closed set of cadence variants. Every operation matches
//! on the variant, so segmentation, due-date generation and next-due lookups
//! live next to the rule they implement.

pub mod days_of_week;
pub mod interval;

pub use days_of_week::{DaysOfWeek, DueDates};
pub use interval::Interval;

use crate::activity::Activity;
use crate::streak::Streak;
use crate::validation::{InvariantViolation, validate_activity_sequence};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    EmptyWeekMask,
    MalformedWeekMask(String),
    IntervalOutOfRange(u32),
    MalformedInterval(String),
    UnknownKind(String),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::EmptyWeekMask => {
                write!(f, "a weekly schedule needs at least one required day")
            }
            ScheduleError::MalformedWeekMask(value) => write!(
                f,
                "weekly mask must be seven 0s or 1s, Monday first (got '{value}')"
            ),
            ScheduleError::IntervalOutOfRange(days) => write!(
                f,
                "interval must be between {} and {} days (got {days})",
                Interval::MIN_DAYS,
                Interval::MAX_DAYS
            ),
            ScheduleError::MalformedInterval(value) => {
                write!(f, "interval must be a whole number of days (got '{value}')")
            }
            ScheduleError::UnknownKind(kind) => {
                write!(f, "unknown schedule kind '{kind}' (expected days or interval)")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rule", rename_all = "snake_case")]
pub enum Schedule {
    DaysOfWeek(DaysOfWeek),
    Interval(Interval),
}

impl Schedule {
    pub fn days_of_week(mask: [bool; 7]) -> Result<Self, ScheduleError> {
        DaysOfWeek::new(mask).map(Schedule::DaysOfWeek)
    }

    pub fn interval(days: u32) -> Result<Self, ScheduleError> {
        Interval::new(days).map(Schedule::Interval)
    }

    /// Build a schedule from its textual kind (`days` / `interval`) and rule
    /// (`1010100` / `3`).
    pub fn parse(kind: &str, rule: &str) -> Result<Self, ScheduleError> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "days" | "days_of_week" | "weekly" => rule.parse().map(Schedule::DaysOfWeek),
            "interval" | "every" => {
                let days = rule
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ScheduleError::MalformedInterval(rule.to_string()))?;
                Self::interval(days)
            }
            other => Err(ScheduleError::UnknownKind(other.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Schedule::DaysOfWeek(_) => "days_of_week",
            Schedule::Interval(_) => "interval",
        }
    }

    /// The rule in the same textual form [`Schedule::parse`] accepts.
    pub fn rule(&self) -> String {
        match self {
            Schedule::DaysOfWeek(days) => String::from(*days),
            Schedule::Interval(interval) => interval.days().to_string(),
        }
    }

    /// Due dates from `start` onwards. Only weekly schedules have a fixed
    /// calendar of due dates; interval cadence depends on logged history.
    pub fn due_dates_from(&self, start: NaiveDate) -> Option<DueDates> {
        match self {
            Schedule::DaysOfWeek(days) => Some(days.due_dates_from(start)),
            Schedule::Interval(_) => None,
        }
    }

    /// Partition `activities` into streaks as of `today`.
    ///
    /// The result is never empty and only its last streak (the current one)
    /// can be empty. Concatenating the streaks gives back `activities`.
    /// Fails if the activities are not strictly ascending by date.
    pub fn segment(
        &self,
        activities: &[Activity],
        today: NaiveDate,
    ) -> Result<Vec<Streak>, InvariantViolation> {
        validate_activity_sequence(activities)?;
        let streaks = match self {
            Schedule::DaysOfWeek(days) => days.segment(activities, today),
            Schedule::Interval(interval) => interval.segment(activities, today),
        };
        debug!(
            schedule = %self,
            activities = activities.len(),
            streaks = streaks.len(),
            %today,
            "segmented activity history"
        );
        trace!(?streaks, "segmentation result");
        Ok(streaks)
    }

    pub fn next_required_day(&self, streak: &Streak, today: NaiveDate) -> NaiveDate {
        match self {
            Schedule::DaysOfWeek(days) => days.next_required_day(today),
            Schedule::Interval(interval) => interval.next_required_day(streak, today),
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::DaysOfWeek(days) => fmt::Display::fmt(days, f),
            Schedule::Interval(interval) => fmt::Display::fmt(interval, f),
        }
    }
}

impl From<DaysOfWeek> for Schedule {
    fn from(value: DaysOfWeek) -> Self {
        Schedule::DaysOfWeek(value)
    }
}

impl From<Interval> for Schedule {
    fn from(value: Interval) -> Self {
        Schedule::Interval(value)
    }
}
