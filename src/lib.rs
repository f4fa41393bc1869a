pub mod activity;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod habit;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod rating;
pub mod schedule;
pub mod streak;
pub mod tracker;
pub(crate) mod validation;

pub use activity::{Activity, ActivityStatus};
pub use cache::StreakCache;
pub use config::{ConfigError, TrackerConfig};
pub use habit::{Habit, HabitError, HabitId};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteHabitStore;
pub use persistence::{
    HabitStore, PersistenceError, load_tracker_from_csv, load_tracker_from_json,
    save_tracker_to_csv, save_tracker_to_json, validate_tracker,
};
pub use rating::{GOLD_THRESHOLD_DAYS, SILVER_THRESHOLD_DAYS, Tier, rate, tier_from_streaks};
pub use schedule::{DaysOfWeek, DueDates, Interval, Schedule, ScheduleError};
pub use streak::{Streak, StreakSummary};
pub use tracker::{HabitRating, HabitReport, Tracker};
pub use validation::InvariantViolation;
