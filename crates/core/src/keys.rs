//! Composite identifier strings.
//!
//! Several records are addressed by keys made of other identifiers joined
//! with `#`, e.g. a quiz attempt's responses live under
//! `userId#courseId#quizId` and each response under
//! `questionNumber#attemptNumber`.

use crate::error::CoreError;

/// Separator between the parts of a composite key.
pub const KEY_SEPARATOR: char = '#';

/// Join key parts, rejecting empty parts and parts containing the separator.
pub fn join_key(parts: &[&str]) -> Result<String, CoreError> {
    if parts.is_empty() {
        return Err(CoreError::Validation("Composite key needs at least one part".into()));
    }
    for part in parts {
        if part.is_empty() {
            return Err(CoreError::Validation("Composite key part must not be empty".into()));
        }
        if part.contains(KEY_SEPARATOR) {
            return Err(CoreError::Validation(format!(
                "Composite key part '{part}' must not contain '{KEY_SEPARATOR}'"
            )));
        }
    }
    Ok(parts.join(&KEY_SEPARATOR.to_string()))
}

/// Split a composite key into exactly `expected` parts.
pub fn split_key(key: &str, expected: usize) -> Result<Vec<&str>, CoreError> {
    let parts: Vec<&str> = key.split(KEY_SEPARATOR).collect();
    if parts.len() != expected || parts.iter().any(|p| p.is_empty()) {
        return Err(CoreError::Validation(format!(
            "Key '{key}' must have {expected} non-empty parts separated by '{KEY_SEPARATOR}'"
        )));
    }
    Ok(parts)
}

/// `userId#courseId#quizId` -- groups every response of one quiz attempt series.
pub fn attempt_key(user_id: &str, course_id: &str, quiz_id: &str) -> Result<String, CoreError> {
    join_key(&[user_id, course_id, quiz_id])
}

/// `questionNumber#attemptNumber` -- one response inside an attempt series.
pub fn response_key(question_number: &str, attempt_number: i32) -> Result<String, CoreError> {
    join_key(&[question_number, &attempt_number.to_string()])
}

/// `courseId#quizType#quizId` -- the quiz a user attempt belongs to.
pub fn course_quiz_key(course_id: &str, quiz_type: &str, quiz_id: &str) -> Result<String, CoreError> {
    join_key(&[course_id, quiz_type, quiz_id])
}

/// `randomId#courseId#surveyId` -- one anonymous respondent's survey submission.
pub fn survey_response_key(
    respondent_id: &str,
    course_id: &str,
    survey_id: &str,
) -> Result<String, CoreError> {
    join_key(&[respondent_id, course_id, survey_id])
}

/// `timeFrame#entityId` -- sort key of a dashboard metric.
pub fn metric_key(time_frame: &str, entity_id: &str) -> Result<String, CoreError> {
    join_key(&[time_frame, entity_id])
}
