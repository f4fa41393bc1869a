use super::{PersistenceError, PersistenceResult};
use crate::activity::{Activity, ActivityStatus};
use crate::habit::{Habit, HabitId};
use crate::schedule::Schedule;
use crate::Tracker;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct TrackerSnapshot {
    habits: Vec<Habit>,
}

impl TrackerSnapshot {
    fn from_tracker(tracker: &Tracker) -> PersistenceResult<Self> {
        super::validate_tracker(tracker)?;
        Ok(Self {
            habits: tracker.habits().cloned().collect(),
        })
    }

    fn into_tracker(self) -> PersistenceResult<Tracker> {
        Ok(Tracker::from_habits(self.habits)?)
    }
}

pub fn save_tracker_to_json<P: AsRef<Path>>(tracker: &Tracker, path: P) -> PersistenceResult<()> {
    let snapshot = TrackerSnapshot::from_tracker(tracker)?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    debug!(path = %path.as_ref().display(), habits = snapshot.habits.len(), "saved tracker json");
    Ok(())
}

pub fn load_tracker_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Tracker> {
    let file = File::open(path.as_ref())?;
    let snapshot: TrackerSnapshot = serde_json::from_reader(file)?;
    debug!(path = %path.as_ref().display(), habits = snapshot.habits.len(), "loaded tracker json");
    snapshot.into_tracker()
}

/// One row per activity. A habit with no activities still gets a single row
/// with an empty `date` so it survives the round trip.
#[derive(Default, Serialize, Deserialize)]
struct HabitCsvRecord {
    habit_id: HabitId,
    task: String,
    schedule_kind: String,
    schedule_rule: String,
    created: String,
    active: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    note: String,
}

impl HabitCsvRecord {
    fn habit_row(habit: &Habit) -> Self {
        HabitCsvRecord {
            habit_id: habit.id,
            task: habit.task.clone(),
            schedule_kind: habit.schedule.kind().to_string(),
            schedule_rule: habit.schedule.rule(),
            created: format_date(Some(habit.created)),
            active: habit.active.to_string(),
            ..HabitCsvRecord::default()
        }
    }

    fn activity_row(habit: &Habit, activity: &Activity) -> Self {
        HabitCsvRecord {
            date: format_date(Some(activity.date)),
            status: activity.status.as_str().to_string(),
            note: activity.note.clone(),
            ..Self::habit_row(habit)
        }
    }

    fn to_habit(&self) -> PersistenceResult<Habit> {
        let schedule = Schedule::parse(&self.schedule_kind, &self.schedule_rule).map_err(|err| {
            PersistenceError::InvalidData(format!("habit {}: {err}", self.habit_id))
        })?;
        let created = parse_date(&self.created)?.ok_or_else(|| {
            PersistenceError::InvalidData(format!("habit {} has no created date", self.habit_id))
        })?;
        let mut habit = Habit::new(self.habit_id, self.task.clone(), schedule, created);
        habit.active = parse_bool(&self.active)?.unwrap_or(true);
        Ok(habit)
    }

    fn to_activity(&self) -> PersistenceResult<Option<Activity>> {
        let Some(date) = parse_date(&self.date)? else {
            return Ok(None);
        };
        let status = if self.status.trim().is_empty() {
            ActivityStatus::default()
        } else {
            self.status
                .parse::<ActivityStatus>()
                .map_err(PersistenceError::InvalidData)?
        };
        Ok(Some(Activity::with_status(date, status).with_note(self.note.clone())))
    }
}

pub fn save_tracker_to_csv<P: AsRef<Path>>(tracker: &Tracker, path: P) -> PersistenceResult<()> {
    super::validate_tracker(tracker)?;
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    for habit in tracker.habits() {
        if habit.activities().is_empty() {
            writer.serialize(HabitCsvRecord::habit_row(habit))?;
        }
        for activity in habit.activities() {
            writer.serialize(HabitCsvRecord::activity_row(habit, activity))?;
        }
    }
    writer.flush()?;
    debug!(path = %path.as_ref().display(), habits = tracker.len(), "saved tracker csv");
    Ok(())
}

pub fn load_tracker_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Tracker> {
    let file = File::open(path.as_ref())?;
    let mut reader = csv::Reader::from_reader(file);
    let mut habits: BTreeMap<HabitId, Habit> = BTreeMap::new();
    for record in reader.deserialize::<HabitCsvRecord>() {
        let record = record?;
        if !habits.contains_key(&record.habit_id) {
            habits.insert(record.habit_id, record.to_habit()?);
        }
        if let (Some(activity), Some(habit)) =
            (record.to_activity()?, habits.get_mut(&record.habit_id))
        {
            habit.log_activity(activity)?;
        }
    }

    if habits.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no habits".into(),
        ));
    }
    debug!(path = %path.as_ref().display(), habits = habits.len(), "loaded tracker csv");
    Ok(Tracker::from_habits(habits.into_values())?)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_bool(input: &str) -> PersistenceResult<Option<bool>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    match input.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid boolean '{other}'"
        ))),
    }
}
