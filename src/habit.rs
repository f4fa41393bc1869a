use crate::activity::Activity;
use crate::calendar::day_diff;
use crate::rating::{self, Tier};
use crate::schedule::Schedule;
use crate::streak::Streak;
use crate::validation::{InvariantViolation, validate_activity_sequence};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type HabitId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitError {
    DuplicateDate { habit_id: HabitId, date: NaiveDate },
    UnknownHabit(HabitId),
    DuplicateHabit(HabitId),
    Invariant { habit_id: HabitId, source: InvariantViolation },
}

impl fmt::Display for HabitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HabitError::DuplicateDate { habit_id, date } => {
                write!(f, "habit {habit_id} already has an activity on {date}")
            }
            HabitError::UnknownHabit(id) => write!(f, "habit {id} not found"),
            HabitError::DuplicateHabit(id) => write!(f, "habit {id} already exists"),
            HabitError::Invariant { habit_id, source } => {
                write!(f, "habit {habit_id} has inconsistent history: {source}")
            }
        }
    }
}

impl std::error::Error for HabitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HabitError::Invariant { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn default_active() -> bool {
    true
}

/// The habit to establish: a task repeated on a schedule, plus everything
/// logged against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub task: String,
    pub schedule: Schedule,
    pub created: NaiveDate,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    activities: Vec<Activity>,
}

impl Habit {
    pub fn new(id: HabitId, task: impl Into<String>, schedule: Schedule, created: NaiveDate) -> Self {
        Self {
            id,
            task: task.into(),
            schedule,
            created,
            active: true,
            activities: Vec::new(),
        }
    }

    /// All logged activities, missed ones included, oldest first.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn activity_on(&self, date: NaiveDate) -> Option<&Activity> {
        self.activities
            .binary_search_by_key(&date, |a| a.date)
            .ok()
            .map(|idx| &self.activities[idx])
    }

    /// Insert `activity` in date order. Only one activity per day is allowed.
    pub fn log_activity(&mut self, activity: Activity) -> Result<(), HabitError> {
        match self
            .activities
            .binary_search_by_key(&activity.date, |a| a.date)
        {
            Ok(_) => Err(HabitError::DuplicateDate {
                habit_id: self.id,
                date: activity.date,
            }),
            Err(pos) => {
                self.activities.insert(pos, activity);
                Ok(())
            }
        }
    }

    pub fn remove_activity(&mut self, date: NaiveDate) -> Option<Activity> {
        let idx = self
            .activities
            .binary_search_by_key(&date, |a| a.date)
            .ok()?;
        Some(self.activities.remove(idx))
    }

    fn performed(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter().filter(|a| a.status.is_performed())
    }

    /// Activities that count towards streaks (everything but missed).
    pub fn performed_activities(&self) -> Vec<Activity> {
        self.performed().cloned().collect()
    }

    /// Number of completed activities.
    pub fn total_times(&self) -> usize {
        self.performed().count()
    }

    /// Days from the first logged activity to `today`, if anything is logged.
    pub fn total_days(&self, today: NaiveDate) -> Option<i64> {
        self.activities.first().map(|a| day_diff(a.date, today))
    }

    /// Check the stored history still satisfies the engine's ordering rules.
    /// Needed after deserialising, which bypasses [`Habit::log_activity`].
    pub fn validate(&self) -> Result<(), HabitError> {
        validate_activity_sequence(&self.activities).map_err(|source| self.invariant(source))
    }

    pub fn streaks(&self, today: NaiveDate) -> Result<Vec<Streak>, HabitError> {
        self.schedule
            .segment(&self.performed_activities(), today)
            .map_err(|source| self.invariant(source))
    }

    pub fn current_streak(&self, today: NaiveDate) -> Result<Streak, HabitError> {
        Ok(self.streaks(today)?.pop().unwrap_or_default())
    }

    pub fn next_required_day(&self, today: NaiveDate) -> Result<NaiveDate, HabitError> {
        let current = self.current_streak(today)?;
        Ok(self.schedule.next_required_day(&current, today))
    }

    pub fn rating(&self, today: NaiveDate) -> Result<Tier, HabitError> {
        rating::rate(
            &self.schedule,
            &self.performed_activities(),
            today,
            self.active,
        )
        .map_err(|source| self.invariant(source))
    }

    fn invariant(&self, source: InvariantViolation) -> HabitError {
        HabitError::Invariant {
            habit_id: self.id,
            source,
        }
    }
}
