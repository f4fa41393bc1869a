use chrono::NaiveDate;
use habit_streaks::{
    Activity, ActivityStatus, Habit, PersistenceError, Schedule, Tracker, load_tracker_from_csv,
    load_tracker_from_json, save_tracker_to_csv, save_tracker_to_json,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build_sample_tracker() -> Tracker {
    let mut tracker = Tracker::new();

    let mut gym = Habit::new(1, "Gym, upper body", Schedule::parse("days", "1010100").unwrap(), d(2013, 5, 1));
    gym.log_activity(Activity::new(d(2013, 5, 6))).unwrap();
    gym.log_activity(Activity::with_status(d(2013, 5, 8), ActivityStatus::Half).with_note("short session"))
        .unwrap();
    gym.log_activity(Activity::with_status(d(2013, 5, 10), ActivityStatus::Missed))
        .unwrap();
    tracker.add_habit(gym).unwrap();

    let mut journal = Habit::new(2, "Journal", Schedule::parse("interval", "2").unwrap(), d(2013, 5, 2));
    journal.active = false;
    tracker.add_habit(journal).unwrap();

    tracker
}

fn assert_same_habits(loaded: &Tracker, expected: &Tracker) {
    let loaded: Vec<&Habit> = loaded.habits().collect();
    let expected: Vec<&Habit> = expected.habits().collect();
    assert_eq!(loaded, expected);
}

#[test]
fn json_round_trip_preserves_habits() {
    let tracker = build_sample_tracker();
    let file = NamedTempFile::new().unwrap();
    save_tracker_to_json(&tracker, file.path()).unwrap();

    let loaded = load_tracker_from_json(file.path()).unwrap();
    assert_same_habits(&loaded, &tracker);

    let gym = loaded.habit(1).unwrap();
    assert_eq!(gym.activities()[1].note, "short session");
    assert_eq!(gym.total_times(), 2);
    assert!(!loaded.habit(2).unwrap().active);
}

#[test]
fn csv_round_trip_keeps_habits_without_activities() {
    let tracker = build_sample_tracker();
    let file = NamedTempFile::new().unwrap();
    save_tracker_to_csv(&tracker, file.path()).unwrap();

    let contents = std::fs::read_to_string(file.path()).unwrap();
    assert!(contents.starts_with("habit_id,task,schedule_kind,schedule_rule"));
    assert!(contents.contains("\"Gym, upper body\""));

    let loaded = load_tracker_from_csv(file.path()).unwrap();
    assert_same_habits(&loaded, &tracker);
    assert!(loaded.habit(2).unwrap().activities().is_empty());
}

#[test]
fn json_with_unordered_activities_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"habits":[{{"id":1,"task":"Read","schedule":{{"kind":"interval","rule":2}},
            "created":"2013-05-01","activities":[{{"date":"2013-05-08"}},{{"date":"2013-05-06"}}]}}]}}"#
    )
    .unwrap();
    let err = load_tracker_from_json(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)), "got {err}");
}

#[test]
fn json_with_bad_schedule_is_a_serialization_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"habits":[{{"id":1,"task":"Read","schedule":{{"kind":"interval","rule":12}},"created":"2013-05-01"}}]}}"#
    )
    .unwrap();
    let err = load_tracker_from_json(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::Serialization(_)), "got {err}");
}

#[test]
fn empty_csv_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "habit_id,task,schedule_kind,schedule_rule,created,active,date,status,note").unwrap();
    let err = load_tracker_from_csv(file.path()).unwrap_err();
    assert_eq!(err.to_string(), "invalid data: CSV file contained no habits");
}

#[test]
fn csv_with_duplicate_days_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "habit_id,task,schedule_kind,schedule_rule,created,active,date,status,note").unwrap();
    writeln!(file, "1,Read,interval,2,2013-05-01,true,2013-05-06,completed,").unwrap();
    writeln!(file, "1,Read,interval,2,2013-05-01,true,2013-05-06,half,").unwrap();
    let err = load_tracker_from_csv(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)), "got {err}");
}
