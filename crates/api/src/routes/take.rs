//! Route definitions for the public `/take/{share_code}` learner endpoints.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::take;
use crate::state::AppState;

/// Routes mounted at `/take`. No authentication; the share code scopes
/// every request to one course.
///
/// ```text
/// GET  /{code}/quizzes                            -> list_quizzes
/// GET  /{code}/quizzes/{quiz_id}                  -> get_quiz
/// POST /{code}/quizzes/{quiz_id}/submit           -> submit_quiz
/// GET  /{code}/surveys/{survey_id}                -> get_survey
/// POST /{code}/surveys/{survey_id}/responses      -> submit_survey_response
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{code}/quizzes", get(take::list_quizzes))
        .route("/{code}/quizzes/{quiz_id}", get(take::get_quiz))
        .route("/{code}/quizzes/{quiz_id}/submit", post(take::submit_quiz))
        .route("/{code}/surveys/{survey_id}", get(take::get_survey))
        .route(
            "/{code}/surveys/{survey_id}/responses",
            post(take::submit_survey_response),
        )
}
