//! Route definitions for the quiz resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{course_quizzes, question_bank, quiz_catalogs};
use crate::state::AppState;

/// Routes mounted at `/question-bank`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// GET    /{id}   -> get
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete (409 while referenced)
/// ```
pub fn question_bank_router() -> Router<AppState> {
    Router::new()
        .route("/", get(question_bank::list).post(question_bank::create))
        .route(
            "/{id}",
            get(question_bank::get)
                .put(question_bank::update)
                .delete(question_bank::delete),
        )
}

/// Routes mounted at `/quiz-catalogs`.
///
/// ```text
/// GET    /                           -> list
/// POST   /                           -> create
/// POST   /generate                   -> generate (drafts only)
/// GET    /{id}                       -> get
/// PUT    /{id}                       -> update
/// DELETE /{id}                       -> delete
/// POST   /{id}/generated-questions   -> save_generated
/// ```
pub fn quiz_catalogs_router() -> Router<AppState> {
    Router::new()
        .route("/", get(quiz_catalogs::list).post(quiz_catalogs::create))
        .route("/generate", post(quiz_catalogs::generate))
        .route(
            "/{id}",
            get(quiz_catalogs::get)
                .put(quiz_catalogs::update)
                .delete(quiz_catalogs::delete),
        )
        .route(
            "/{id}/generated-questions",
            post(quiz_catalogs::save_generated),
        )
}

/// Routes mounted at `/course-quizzes`.
///
/// ```text
/// GET    /                              -> list
/// POST   /                              -> create
/// GET    /{id}                          -> get
/// PUT    /{id}                          -> update
/// DELETE /{id}                          -> delete
/// GET    /{id}/attempts                 -> list_attempts
/// GET    /{id}/attempts/{attempt_id}    -> get_attempt
/// GET    /{id}/results                  -> results
/// ```
pub fn course_quizzes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(course_quizzes::list).post(course_quizzes::create))
        .route(
            "/{id}",
            get(course_quizzes::get)
                .put(course_quizzes::update)
                .delete(course_quizzes::delete),
        )
        .route("/{id}/attempts", get(course_quizzes::list_attempts))
        .route(
            "/{id}/attempts/{attempt_id}",
            get(course_quizzes::get_attempt),
        )
        .route("/{id}/results", get(course_quizzes::results))
}
