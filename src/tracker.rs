use crate::activity::Activity;
use crate::cache::StreakCache;
use crate::habit::{Habit, HabitError, HabitId};
use crate::rating::{self, Tier};
use crate::streak::{Streak, StreakSummary};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitRating {
    pub habit_id: HabitId,
    pub task: String,
    pub tier: Tier,
}

/// Point-in-time overview of one habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitReport {
    pub habit_id: HabitId,
    pub task: String,
    pub schedule: String,
    pub today: NaiveDate,
    pub tier: Tier,
    pub total_times: usize,
    pub next_required_day: NaiveDate,
    pub streaks: Vec<StreakSummary>,
}

/// All habits of one user plus the memoised streaks derived from them.
#[derive(Debug, Default)]
pub struct Tracker {
    habits: BTreeMap<HabitId, Habit>,
    cache: StreakCache,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_habits<I>(habits: I) -> Result<Self, HabitError>
    where
        I: IntoIterator<Item = Habit>,
    {
        let mut tracker = Self::new();
        for habit in habits {
            tracker.add_habit(habit)?;
        }
        Ok(tracker)
    }

    pub fn habits(&self) -> impl Iterator<Item = &Habit> {
        self.habits.values()
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn habit(&self, habit_id: HabitId) -> Option<&Habit> {
        self.habits.get(&habit_id)
    }

    fn habit_mut(&mut self, habit_id: HabitId) -> Result<&mut Habit, HabitError> {
        self.habits
            .get_mut(&habit_id)
            .ok_or(HabitError::UnknownHabit(habit_id))
    }

    pub fn next_id(&self) -> HabitId {
        self.habits.keys().next_back().map_or(1, |id| id + 1)
    }

    pub fn add_habit(&mut self, habit: Habit) -> Result<(), HabitError> {
        if self.habits.contains_key(&habit.id) {
            return Err(HabitError::DuplicateHabit(habit.id));
        }
        habit.validate()?;
        debug!(habit_id = habit.id, schedule = %habit.schedule, "habit added");
        self.cache.invalidate(habit.id);
        self.habits.insert(habit.id, habit);
        Ok(())
    }

    pub fn remove_habit(&mut self, habit_id: HabitId) -> Option<Habit> {
        self.cache.invalidate(habit_id);
        let removed = self.habits.remove(&habit_id);
        if removed.is_some() {
            debug!(habit_id, "habit removed");
        }
        removed
    }

    pub fn log_activity(&mut self, habit_id: HabitId, activity: Activity) -> Result<(), HabitError> {
        let date = activity.date;
        self.habit_mut(habit_id)?.log_activity(activity)?;
        self.cache.invalidate(habit_id);
        debug!(habit_id, %date, "activity logged");
        Ok(())
    }

    pub fn remove_activity(
        &mut self,
        habit_id: HabitId,
        date: NaiveDate,
    ) -> Result<Option<Activity>, HabitError> {
        let removed = self.habit_mut(habit_id)?.remove_activity(date);
        self.cache.invalidate(habit_id);
        Ok(removed)
    }

    pub fn set_active(&mut self, habit_id: HabitId, active: bool) -> Result<(), HabitError> {
        self.habit_mut(habit_id)?.active = active;
        debug!(habit_id, active, "habit activation changed");
        Ok(())
    }

    /// Segmentation of one habit as of `today`, computed at most once per
    /// (habit, date) until the habit changes.
    pub fn streaks(&mut self, habit_id: HabitId, today: NaiveDate) -> Result<&[Streak], HabitError> {
        let habit = self
            .habits
            .get(&habit_id)
            .ok_or(HabitError::UnknownHabit(habit_id))?;
        self.cache
            .get_or_try_insert_with(habit_id, today, || habit.streaks(today))
    }

    pub fn rating(&self, habit_id: HabitId, today: NaiveDate) -> Result<Tier, HabitError> {
        self.habit(habit_id)
            .ok_or(HabitError::UnknownHabit(habit_id))?
            .rating(today)
    }

    /// Ratings for every habit, in id order. Habits are rated in parallel.
    pub fn ratings(&self, today: NaiveDate) -> Result<Vec<HabitRating>, HabitError> {
        self.habits
            .par_iter()
            .map(|(id, habit)| -> Result<HabitRating, HabitError> {
                Ok(HabitRating {
                    habit_id: *id,
                    task: habit.task.clone(),
                    tier: habit.rating(today)?,
                })
            })
            .collect()
    }

    pub fn report(&mut self, habit_id: HabitId, today: NaiveDate) -> Result<HabitReport, HabitError> {
        let streaks = self.streaks(habit_id, today)?.to_vec();
        let habit = self
            .habit(habit_id)
            .ok_or(HabitError::UnknownHabit(habit_id))?;
        let current = streaks.last().cloned().unwrap_or_default();
        Ok(HabitReport {
            habit_id,
            task: habit.task.clone(),
            schedule: habit.schedule.to_string(),
            today,
            tier: rating::tier_from_streaks(&streaks, today, habit.active),
            total_times: habit.total_times(),
            next_required_day: habit.schedule.next_required_day(&current, today),
            streaks: StreakSummary::from_streaks(&streaks, today),
        })
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
