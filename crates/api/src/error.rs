//! Handler error type and its JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tnc_core::error::CoreError;

use crate::services::quiz_generator::GenerationError;
use crate::services::storage::StorageError;

/// Every variant renders as `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::InternalError(format!("Quiz generation failed: {err}"))
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(key) => {
                AppError::BadRequest(format!("Invalid storage key: {key}"))
            }
            other => AppError::InternalError(format!("Storage error: {other}")),
        }
    }
}

type ErrorParts = (StatusCode, &'static str, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Database(err) => classify_sqlx_error(&err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}

fn classify_core_error(err: CoreError) -> ErrorParts {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::NotFoundByKey { entity, key } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} '{key}' not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

fn internal() -> ErrorParts {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Readable messages for the unique constraints clients commonly trip.
const UNIQUE_MESSAGES: &[(&str, &str)] = &[
    ("uq_users_username", "Username is already taken"),
    ("uq_users_email", "Email is already registered to another user"),
    ("uq_instructors_email", "An instructor with this email already exists"),
    (
        "uq_course_catalogs_aws_code_version",
        "A catalog with this code and version already exists",
    ),
    (
        "uq_catalog_modules_catalog_number",
        "Module number is already used in this catalog",
    ),
    (
        "uq_catalog_labs_catalog_number",
        "Lab number is already used in this catalog",
    ),
    (
        "uq_course_quizzes_course_type_catalog",
        "This quiz is already attached to the course with the same type",
    ),
    (
        "uq_survey_responses_response_key",
        "A response was already submitted for this survey",
    ),
    (
        "uq_event_registrations_event_user",
        "Already registered for this event",
    ),
];

fn unique_message(constraint: &str) -> String {
    UNIQUE_MESSAGES
        .iter()
        .find(|(name, _)| *name == constraint)
        .map(|(_, msg)| msg.to_string())
        .unwrap_or_else(|| format!("Duplicate value violates unique constraint: {constraint}"))
}

/// Map a sqlx error onto a status, code and client-safe message.
///
/// Constraint names follow the `uq_` / `fk_` / `ck_` convention of the
/// migrations; unnamed or unexpected failures become a sanitized 500.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    let sqlx::Error::Database(db_err) = err else {
        if matches!(err, sqlx::Error::RowNotFound) {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            );
        }
        tracing::error!(error = %err, "Database error");
        return internal();
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.code().as_deref() {
        Some("23505") if constraint.starts_with("uq_") => {
            (StatusCode::CONFLICT, "CONFLICT", unique_message(constraint))
        }
        // Either the referenced row is missing (insert/update) or it is
        // still referenced (delete).
        Some("23503") if constraint.starts_with("fk_") => (
            StatusCode::BAD_REQUEST,
            "INVALID_REFERENCE",
            format!("Referenced record does not exist or is still in use: {constraint}"),
        ),
        Some("23514") => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Value violates check constraint: {constraint}"),
        ),
        _ => {
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_unique_constraints_get_readable_messages() {
        assert_eq!(
            unique_message("uq_event_registrations_event_user"),
            "Already registered for this event"
        );
        assert_eq!(
            unique_message("uq_roles_name"),
            "Duplicate value violates unique constraint: uq_roles_name"
        );
    }

    #[test]
    fn row_not_found_is_404() {
        let (status, code, _) = classify_sqlx_error(&sqlx::Error::RowNotFound);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }
}
