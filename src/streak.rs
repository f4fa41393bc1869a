use crate::activity::Activity;
use crate::calendar::day_diff;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A run of activities that satisfies a schedule's cadence.
///
/// Segmentation always yields at least one streak; the last one is the
/// current streak and is the only one allowed to be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Streak {
    activities: Vec<Activity>,
}

impl Streak {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn into_activities(self) -> Vec<Activity> {
        self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn first(&self) -> Option<&Activity> {
        self.activities.first()
    }

    pub fn last(&self) -> Option<&Activity> {
        self.activities.last()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.first().map(|a| a.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.last().map(|a| a.date)
    }

    pub(crate) fn push(&mut self, activity: Activity) {
        self.activities.push(activity);
    }

    /// Days covered by this streak, counting both ends.
    ///
    /// With `until` (an open streak) the span runs to that date, otherwise to
    /// the last activity. Never less than 1 for a non-empty streak.
    pub fn duration_days(&self, until: Option<NaiveDate>) -> i64 {
        let Some(start) = self.start_date() else {
            return 0;
        };
        let end = match until {
            Some(date) => date,
            None => self.end_date().unwrap_or(start),
        };
        (day_diff(start, end) + 1).max(1)
    }
}

impl From<Vec<Activity>> for Streak {
    fn from(activities: Vec<Activity>) -> Self {
        Self { activities }
    }
}

/// The current streak of a segmentation result.
pub fn current_streak(streaks: &[Streak]) -> Option<&Streak> {
    streaks.last()
}

/// Rejoin streaks into the activity sequence they were cut from.
pub fn flatten(streaks: &[Streak]) -> Vec<Activity> {
    streaks
        .iter()
        .flat_map(|s| s.activities.iter().cloned())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    pub entries: usize,
    pub duration_days: i64,
    pub is_current: bool,
}

impl StreakSummary {
    /// Summaries in segmentation order. The current streak is measured up to
    /// `today`, closed streaks up to their last activity.
    pub fn from_streaks(streaks: &[Streak], today: NaiveDate) -> Vec<Self> {
        let last_idx = streaks.len().saturating_sub(1);
        streaks
            .iter()
            .enumerate()
            .map(|(idx, streak)| {
                let is_current = idx == last_idx;
                let until = if is_current { Some(today) } else { None };
                Self {
                    start: streak.start_date(),
                    end: streak.end_date(),
                    entries: streak.len(),
                    duration_days: streak.duration_days(until),
                    is_current,
                }
            })
            .collect()
    }

    pub fn to_cli_line(&self) -> String {
        let span = match (self.start, self.end) {
            (Some(start), Some(end)) => format!("{start}..{end}"),
            _ => "(nothing logged yet)".to_string(),
        };
        let marker = if self.is_current { " *current*" } else { "" };
        format!(
            "{span} entries={} days={}{marker}",
            self.entries, self.duration_days
        )
    }
}
