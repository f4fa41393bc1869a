use crate::activity::Activity;
use crate::schedule::Schedule;
use crate::streak::Streak;
use crate::validation::InvariantViolation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days a streak must exceed to count as silver-grade.
pub const SILVER_THRESHOLD_DAYS: i64 = 14;
/// Days a streak must exceed to count as gold-grade.
pub const GOLD_THRESHOLD_DAYS: i64 = 28;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Pending,
    Bronze,
    Silver,
    Gold,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Pending => "pending",
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
        }
    }

    /// Tier for a current streak of `recent_days` following a closed streak of
    /// `past_days`. A gold-grade previous streak lifts the result by one tier
    /// so a single lapse does not drop a long-standing habit straight to
    /// bronze.
    pub fn from_durations(recent_days: i64, past_days: i64) -> Self {
        let past_was_gold = past_days > GOLD_THRESHOLD_DAYS;
        if recent_days > GOLD_THRESHOLD_DAYS {
            Tier::Gold
        } else if recent_days > SILVER_THRESHOLD_DAYS {
            if past_was_gold { Tier::Gold } else { Tier::Silver }
        } else if past_was_gold {
            Tier::Silver
        } else {
            Tier::Bronze
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rate a habit as of `today`.
///
/// `performed` must already exclude missed activities. Inactive habits are
/// always [`Tier::Pending`].
pub fn rate(
    schedule: &Schedule,
    performed: &[Activity],
    today: NaiveDate,
    active: bool,
) -> Result<Tier, InvariantViolation> {
    if !active {
        return Ok(Tier::Pending);
    }
    let streaks = schedule.segment(performed, today)?;
    Ok(tier_from_streaks(&streaks, today, active))
}

/// Tier of an existing segmentation as of the same `today` it was made for.
pub fn tier_from_streaks(streaks: &[Streak], today: NaiveDate, active: bool) -> Tier {
    if !active {
        return Tier::Pending;
    }
    let Some((recent, earlier)) = streaks.split_last() else {
        return Tier::Bronze;
    };
    let recent_days = recent.duration_days(Some(today));
    let past_days = earlier.last().map_or(0, |past| past.duration_days(None));
    Tier::from_durations(recent_days, past_days)
}
