use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Missed,
    #[default]
    Completed,
    Half,
    Whole,
}

impl ActivityStatus {
    pub fn variants() -> &'static [(&'static str, &'static str)] {
        &[
            ("missed", "Missed"),
            ("completed", "Completed"),
            ("half", "Half-hearted"),
            ("whole", "Whole-hearted"),
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Missed => "missed",
            ActivityStatus::Completed => "completed",
            ActivityStatus::Half => "half",
            ActivityStatus::Whole => "whole",
        }
    }

    /// Effort score of the status level.
    pub fn score(&self) -> u8 {
        match self {
            ActivityStatus::Missed => 0,
            ActivityStatus::Half => 5,
            ActivityStatus::Completed => 10,
            ActivityStatus::Whole => 15,
        }
    }

    pub fn is_performed(&self) -> bool {
        !matches!(self, ActivityStatus::Missed)
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "missed" | "0" => Ok(ActivityStatus::Missed),
            "completed" | "done" | "10" => Ok(ActivityStatus::Completed),
            "half" | "5" => Ok(ActivityStatus::Half),
            "whole" | "15" => Ok(ActivityStatus::Whole),
            other => Err(format!("unknown activity status '{other}'")),
        }
    }
}

/// One application of a habit on a particular day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub date: NaiveDate,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl Activity {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            status: ActivityStatus::default(),
            note: String::new(),
        }
    }

    pub fn with_status(date: NaiveDate, status: ActivityStatus) -> Self {
        Self {
            date,
            status,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}
