use super::{HabitStore, PersistenceError, PersistenceResult};
use crate::activity::{Activity, ActivityStatus};
use crate::habit::{Habit, HabitId};
use crate::schedule::Schedule;
use crate::Tracker;
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::debug;

pub struct SqliteHabitStore {
    connection: Mutex<Connection>,
}

impl SqliteHabitStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS habits (
                id INTEGER PRIMARY KEY,
                task TEXT NOT NULL,
                schedule_json TEXT NOT NULL,
                created TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS activities (
                habit_id INTEGER NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                status TEXT NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                UNIQUE (habit_id, date)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection mutex poisoned".into()))
    }

    fn save_habits(tx: &rusqlite::Transaction, tracker: &Tracker) -> PersistenceResult<()> {
        tx.execute("DELETE FROM activities", [])?;
        tx.execute("DELETE FROM habits", [])?;
        let mut habit_stmt = tx.prepare(
            "INSERT INTO habits (id, task, schedule_json, created, active) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut activity_stmt = tx.prepare(
            "INSERT INTO activities (habit_id, date, status, note) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for habit in tracker.habits() {
            let schedule_json = serde_json::to_string(&habit.schedule)?;
            habit_stmt.execute(params![
                habit.id,
                habit.task,
                schedule_json,
                habit.created.to_string(),
                habit.active
            ])?;
            for activity in habit.activities() {
                activity_stmt.execute(params![
                    habit.id,
                    activity.date.to_string(),
                    activity.status.as_str(),
                    activity.note
                ])?;
            }
        }
        Ok(())
    }
}

impl HabitStore for SqliteHabitStore {
    fn save_tracker(&self, tracker: &Tracker) -> PersistenceResult<()> {
        super::validate_tracker(tracker)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        Self::save_habits(&tx, tracker)?;
        tx.commit()?;
        debug!(habits = tracker.len(), "saved tracker to sqlite");
        Ok(())
    }

    fn load_tracker(&self) -> PersistenceResult<Option<Tracker>> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare("SELECT id, task, schedule_json, created, active FROM habits ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, HabitId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, bool>(4)?,
            ))
        })?;

        let mut habits = BTreeMap::new();
        for row in rows {
            let (id, task, schedule_json, created, active) = row?;
            let schedule: Schedule = serde_json::from_str(&schedule_json)?;
            let mut habit = Habit::new(id, task, schedule, parse_date(&created)?);
            habit.active = active;
            habits.insert(id, habit);
        }
        if habits.is_empty() {
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT habit_id, date, status, note FROM activities ORDER BY habit_id ASC, date ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, HabitId>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        for row in rows {
            let (habit_id, date, status, note) = row?;
            let habit = habits.get_mut(&habit_id).ok_or_else(|| {
                PersistenceError::InvalidData(format!("activity references unknown habit {habit_id}"))
            })?;
            let status = status
                .parse::<ActivityStatus>()
                .map_err(PersistenceError::InvalidData)?;
            habit.log_activity(Activity::with_status(parse_date(&date)?, status).with_note(note))?;
        }

        debug!(habits = habits.len(), "loaded tracker from sqlite");
        Ok(Some(Tracker::from_habits(habits.into_values())?))
    }
}

fn parse_date(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}
