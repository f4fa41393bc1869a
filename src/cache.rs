use crate::habit::HabitId;
use crate::streak::Streak;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::trace;

/// Memoised segmentation results, one reference date per habit.
///
/// Asking for a different date replaces the habit's entry, so the cache never
/// holds more entries than there are habits. The owner is responsible for
/// calling [`StreakCache::invalidate`] whenever a habit's schedule or history
/// changes.
#[derive(Debug, Default)]
pub struct StreakCache {
    entries: HashMap<HabitId, (NaiveDate, Vec<Streak>)>,
}

impl StreakCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, habit_id: HabitId, today: NaiveDate) -> Option<&[Streak]> {
        self.entries
            .get(&habit_id)
            .filter(|(cached_for, _)| *cached_for == today)
            .map(|(_, streaks)| streaks.as_slice())
    }

    pub fn get_or_try_insert_with<F, E>(
        &mut self,
        habit_id: HabitId,
        today: NaiveDate,
        compute: F,
    ) -> Result<&[Streak], E>
    where
        F: FnOnce() -> Result<Vec<Streak>, E>,
    {
        match self.entries.entry(habit_id) {
            Entry::Occupied(entry) if entry.get().0 == today => {
                trace!(habit_id, %today, "streak cache hit");
                Ok(entry.into_mut().1.as_slice())
            }
            Entry::Occupied(mut entry) => {
                trace!(habit_id, %today, cached_for = %entry.get().0, "streak cache stale");
                let streaks = compute()?;
                entry.insert((today, streaks));
                Ok(entry.into_mut().1.as_slice())
            }
            Entry::Vacant(entry) => {
                trace!(habit_id, %today, "streak cache miss");
                let streaks = compute()?;
                Ok(entry.insert((today, streaks)).1.as_slice())
            }
        }
    }

    pub fn invalidate(&mut self, habit_id: HabitId) {
        self.entries.remove(&habit_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
