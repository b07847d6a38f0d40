//! Scheduled course rules: status lifecycle, share codes, dates and seats.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Date;

/// Lifecycle status of a scheduled course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CourseStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl CourseStatus {
    /// Stable string stored in the `courses.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the stored column value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "scheduled" => Ok(Self::Scheduled),
            "inProgress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Invalid course status '{other}'. Must be one of: scheduled, inProgress, completed, cancelled"
            ))),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a course may move from `self` to `next`.
    pub fn can_transition_to(self, next: Self) -> bool {
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Self::Scheduled, Self::InProgress)
                | (Self::Scheduled, Self::Cancelled)
                | (Self::InProgress, Self::Completed)
                | (Self::InProgress, Self::Cancelled)
        )
    }
}

/// Check a status change, returning a conflict error when it is not allowed.
pub fn validate_transition(current: &str, next: &str) -> Result<CourseStatus, CoreError> {
    let current = CourseStatus::parse(current)?;
    let next = CourseStatus::parse(next)?;
    if !current.can_transition_to(next) {
        return Err(CoreError::Conflict(format!(
            "Course cannot move from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }
    Ok(next)
}

// ---------------------------------------------------------------------------
// Share codes
// ---------------------------------------------------------------------------

/// Length of a generated share code.
pub const SHARE_CODE_LEN: usize = 6;

/// Alphabet without look-alike characters (0/O, 1/I/L).
const SHARE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Generate a random share code students use to reach a course.
pub fn generate_share_code() -> String {
    let mut rng = rand::rng();
    (0..SHARE_CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..SHARE_CODE_ALPHABET.len());
            SHARE_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Normalize a user-typed share code (trim, uppercase) and check its shape.
pub fn normalize_share_code(code: &str) -> Result<String, CoreError> {
    let code = code.trim().to_ascii_uppercase();
    let valid = code.len() == SHARE_CODE_LEN
        && code.bytes().all(|b| SHARE_CODE_ALPHABET.contains(&b));
    if !valid {
        return Err(CoreError::Validation(format!("Invalid share code '{code}'")));
    }
    Ok(code)
}

// ---------------------------------------------------------------------------
// Dates and seats
// ---------------------------------------------------------------------------

/// A course may not end before it starts.
pub fn validate_date_range(start: Date, end: Option<Date>) -> Result<(), CoreError> {
    if let Some(end) = end {
        if end < start {
            return Err(CoreError::Validation(format!(
                "end_date {end} is before start_date {start}"
            )));
        }
    }
    Ok(())
}

/// Enrolled seats may not exceed the seat limit.
pub fn validate_seats(max_seats: Option<i32>, current_seats: Option<i32>) -> Result<(), CoreError> {
    if let (Some(max), Some(current)) = (max_seats, current_seats) {
        if current > max {
            return Err(CoreError::Validation(format!(
                "current_seats ({current}) exceeds max_seats ({max})"
            )));
        }
    }
    Ok(())
}
