use crate::activity::Activity;
use chrono::NaiveDate;
use std::fmt;

/// Raised when an activity sequence handed to the engine breaks its ordering
/// contract. The engine never re-sorts on the caller's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    OutOfOrder { previous: NaiveDate, next: NaiveDate },
    DuplicateDate(NaiveDate),
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::OutOfOrder { previous, next } => write!(
                f,
                "activities must be sorted by date: {next} follows {previous}"
            ),
            InvariantViolation::DuplicateDate(date) => {
                write!(f, "more than one activity dated {date}")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

pub fn validate_activity_sequence(activities: &[Activity]) -> Result<(), InvariantViolation> {
    for pair in activities.windows(2) {
        let (previous, next) = (pair[0].date, pair[1].date);
        if previous == next {
            return Err(InvariantViolation::DuplicateDate(next));
        }
        if previous > next {
            return Err(InvariantViolation::OutOfOrder { previous, next });
        }
    }
    Ok(())
}
