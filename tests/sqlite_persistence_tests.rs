#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use habit_streaks::{
    Activity, ActivityStatus, Habit, HabitStore, Schedule, SqliteHabitStore, Tier, Tracker,
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tracker_with_history() -> Tracker {
    let mut tracker = Tracker::new();
    let mut run = Habit::new(1, "Run", Schedule::parse("interval", "2").unwrap(), d(2013, 5, 1));
    for day in [6, 8, 10, 15, 17, 20, 22, 24] {
        run.log_activity(Activity::new(d(2013, 5, day))).unwrap();
    }
    tracker.add_habit(run).unwrap();

    let mut meditate = Habit::new(2, "Meditate", Schedule::parse("days", "1111100").unwrap(), d(2013, 5, 1));
    meditate
        .log_activity(Activity::with_status(d(2013, 5, 6), ActivityStatus::Whole).with_note("calm"))
        .unwrap();
    tracker.add_habit(meditate).unwrap();
    tracker
}

#[test]
fn sqlite_store_round_trip_tracker() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteHabitStore::new(file.path()).unwrap();
    let tracker = tracker_with_history();

    store.save_tracker(&tracker).expect("save tracker");
    let mut loaded = store
        .load_tracker()
        .expect("load tracker")
        .expect("tracker exists");

    assert_eq!(loaded.len(), 2);
    let meditate = loaded.habit(2).unwrap();
    assert_eq!(meditate.schedule.rule(), "1111100");
    assert_eq!(meditate.activities()[0].status, ActivityStatus::Whole);
    assert_eq!(meditate.activities()[0].note, "calm");

    assert_eq!(loaded.streaks(1, d(2013, 5, 26)).unwrap().len(), 3);
    assert_eq!(loaded.rating(1, d(2013, 5, 26)).unwrap(), Tier::Bronze);
}

#[test]
fn empty_store_has_no_tracker() {
    let store = SqliteHabitStore::in_memory().unwrap();
    assert!(store.load_tracker().unwrap().is_none());
}

#[test]
fn saving_replaces_previous_contents() {
    let store = SqliteHabitStore::in_memory().unwrap();
    store.save_tracker(&tracker_with_history()).unwrap();

    let mut smaller = tracker_with_history();
    smaller.remove_habit(1);
    smaller.set_active(2, false).unwrap();
    store.save_tracker(&smaller).unwrap();

    let loaded = store.load_tracker().unwrap().unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded.habit(1).is_none());
    assert!(!loaded.habit(2).unwrap().active);
}
